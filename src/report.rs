//! What the stack reports while it walks.
//!
//! Every line the walker and executor print is first recorded as an [`Event`]
//! so the sequence of `brew install` invocations can be inspected after a run.
//! With `--dry` the recorded install commands are the plan.

use crate::colors;
use crate::options::OptionSet;
use std::fmt;

/// One `brew install` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCommand {
    pub formula: String,
    pub args: OptionSet,
}

impl InstallCommand {
    pub fn is_source_build(&self) -> bool {
        self.args.contains(crate::options::BUILD_BOTTLE)
    }
}

impl fmt::Display for InstallCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "brew install {}", self.formula)
        } else {
            write!(f, "brew install {} {}", self.args, self.formula)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Build options selected for a formula, with the ones it offers
    BuildOptions {
        formula: String,
        used: OptionSet,
        available: OptionSet,
    },
    /// Dependencies about to be visited, with their required options
    Dependencies {
        formula: String,
        dependencies: Vec<String>,
    },
    AlreadyInstalled(String),
    Install(InstallCommand),
    /// A bottle pour failed and a source build follows
    BottleFailed(String),
    /// `dependency` is already being walked further up the path
    CycleSkipped { formula: String, dependency: String },
}

/// Recorded events, echoed to the terminal as they happen.
#[derive(Debug)]
pub struct Trace {
    events: Vec<Event>,
    echo: bool,
}

impl Default for Trace {
    fn default() -> Self {
        Self::new()
    }
}

impl Trace {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            echo: true,
        }
    }

    /// Record without printing.
    pub fn quiet() -> Self {
        Self {
            events: Vec::new(),
            echo: false,
        }
    }

    pub fn record(&mut self, event: Event) {
        if self.echo {
            print_event(&event);
        }
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Install commands in the order they were issued.
    pub fn installs(&self) -> impl Iterator<Item = &InstallCommand> {
        self.events.iter().filter_map(|event| match event {
            Event::Install(command) => Some(command),
            _ => None,
        })
    }
}

fn print_event(event: &Event) {
    match event {
        Event::BuildOptions {
            formula,
            used,
            available,
        } => {
            colors::heading(&format!("Build options used, {}: {}", formula, used));
            colors::heading(&format!("Available options, {}: {}", formula, available));
        }
        Event::Dependencies {
            formula,
            dependencies,
        } => {
            colors::heading(&format!("Deps for {}: {}", formula, dependencies.join(", ")));
        }
        Event::AlreadyInstalled(formula) => {
            colors::heading(&format!("{} already installed", formula));
        }
        Event::Install(command) => colors::heading(&command.to_string()),
        Event::BottleFailed(formula) => {
            colors::warning(&format!("Bottle for {} may have failed to install", formula));
            colors::heading("Attempting to build bottle from source");
        }
        Event::CycleSkipped {
            formula,
            dependency,
        } => {
            colors::warning(&format!(
                "{} depends on {}, which is already being installed; skipping",
                formula, dependency
            ));
        }
    }
}
