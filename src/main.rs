use brew_stack::api::BrewApi;
use brew_stack::cli::{self, Command, Invocation};
use brew_stack::colors;
use brew_stack::config::StackConfig;
use brew_stack::{
    BottlePolicy, BrewInstaller, Catalog, HomebrewCatalog, InstallRequest, InstalledSet,
    StackError, Walker,
};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    colors::init_colors();

    let invocation = match cli::parse_from(std::env::args_os()) {
        Ok(Command::Help) => {
            print!("{}", cli::USAGE);
            return ExitCode::SUCCESS;
        }
        Ok(Command::Stack(invocation)) => invocation,
        Err(StackError::Usage(message)) => {
            println!("{}\n", message);
            print!("{}", cli::USAGE);
            return ExitCode::FAILURE;
        }
        Err(e) => {
            colors::error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    match stack(invocation).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            colors::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn stack(invocation: Invocation) -> brew_stack::Result<()> {
    let config = StackConfig::from_env();
    tracing::debug!("config: {:?}", config);

    let api = BrewApi::new(&config)?;
    let catalog = HomebrewCatalog::new(api, &config)?;
    let installer = BrewInstaller::new(config.brew.clone(), config.developer_mode);
    let policy = BottlePolicy::new(config.cellar.clone());
    let mut registry = InstalledSet::new();

    let flags = invocation.flags();
    let formula = catalog.lookup_formula(&invocation.formula).await?;
    let request = InstallRequest::new(formula, invocation.options, flags);

    let mut walker = Walker::new(&catalog, &installer, policy, &mut registry);
    walker.run(request).await
}
