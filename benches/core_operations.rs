use brew_stack::formula::{Bottle, CellarSpec, DependencyRef};
use brew_stack::options::dependency_options;
use brew_stack::report::Trace;
use brew_stack::{
    BottlePolicy, Catalog, Formula, InstallRequest, InstalledSet, Installer, MemoryCatalog,
    OptionSet, Result, TopLevelFlags, Walker,
};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

struct NoopInstaller;

impl Installer for NoopInstaller {
    fn run_install(&self, _formula: &str, _args: &OptionSet) -> Result<bool> {
        Ok(true)
    }
}

fn bottled(name: &str, deps: &[String]) -> Formula {
    let mut formula = Formula::new(name);
    formula.dependencies = deps.iter().map(DependencyRef::runtime).collect();
    formula.bottle = Some(Bottle {
        cellar: CellarSpec::Any,
        pour_allowed: true,
    });
    formula
}

/// `width` formulae per layer, each depending on every formula of the layer below
fn layered_catalog(layers: usize, width: usize) -> MemoryCatalog {
    let catalog = MemoryCatalog::new();
    let mut below: Vec<String> = Vec::new();
    for layer in 0..layers {
        let names: Vec<String> = (0..width).map(|i| format!("f{}-{}", layer, i)).collect();
        for name in &names {
            catalog.insert(bottled(name, &below));
        }
        below = names;
    }
    catalog.insert(bottled("top", &below));
    catalog
}

fn bench_dependency_options(c: &mut Criterion) {
    let parent: OptionSet = [
        "--dry",
        "--with-docs",
        "--HEAD",
        "--verbose",
        "--build-from-source",
        "--with-qt",
    ]
    .into_iter()
    .collect();
    let parent_build: OptionSet = ["--with-docs", "--with-qt"].into_iter().collect();
    let dependency: OptionSet = ["--with-x11"].into_iter().collect();

    c.bench_function("dependency_options", |b| {
        b.iter(|| {
            dependency_options(
                black_box(&parent),
                black_box(&parent_build),
                black_box(&dependency),
            )
        })
    });
}

fn bench_bottle_policy(c: &mut Criterion) {
    let policy = BottlePolicy::new("/opt/homebrew/Cellar");
    let flags = TopLevelFlags::default();
    let mut formula = bottled("qca", &[]);
    formula.bottle = Some(Bottle {
        cellar: CellarSpec::Path("/opt/homebrew/Cellar".into()),
        pour_allowed: true,
    });

    c.bench_function("bottle_policy evaluate", |b| {
        b.iter(|| policy.evaluate(black_box(&formula), black_box(&flags)))
    });
}

fn bench_dry_walk(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("dry_walk");

    for (layers, width) in [(4, 2), (6, 4), (8, 8)] {
        let catalog = layered_catalog(layers, width);
        group.bench_with_input(
            BenchmarkId::new("layers x width", format!("{}x{}", layers, width)),
            &catalog,
            |b, catalog| {
                b.iter(|| {
                    runtime.block_on(async {
                        let mut registry = InstalledSet::new();
                        let formula = catalog.lookup_formula("top").await.unwrap();
                        let options: OptionSet = ["--dry"].into_iter().collect();
                        let flags = TopLevelFlags::from_options(&options, true, false);
                        let request = InstallRequest::new(formula, options, flags);
                        let mut walker = Walker::new(
                            catalog,
                            &NoopInstaller,
                            BottlePolicy::new("/opt/homebrew/Cellar"),
                            &mut registry,
                        )
                        .with_trace(Trace::quiet());
                        walker.run(request).await.unwrap();
                        black_box(walker.registry().len())
                    })
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_dependency_options,
    bench_bottle_policy,
    bench_dry_walk
);
criterion_main!(benches);
