//! Command-line surface.
//!
//! Everything except `--dry`, `--all` and `--help` is an install option for
//! `brew install`, so arguments are collected raw and sorted afterwards:
//! dashed arguments are options (in any position), the rest are formula names.

use crate::error::{Result, StackError};
use crate::options::OptionSet;
use crate::request::TopLevelFlags;
use clap::Parser;
use std::ffi::OsString;

pub const USAGE: &str = "\
Usage: brew stack [--dry] [--all] [install-options...] formula [formula-options...]

       Same options as for `brew install`, but only for a single formula.
       Note: --interactive install option is not supported

Options: --dry  Don't install anything, just output topologically ordered list
                of install commands.
         --all  List all dependencies, including installed, on --dry run.
";

#[derive(Parser, Debug)]
#[command(name = "brew-stack", disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Install options, the formula, and formula options
    #[arg(allow_hyphen_values = true, trailing_var_arg = true, num_args = 0..)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Stack(Invocation),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub formula: String,
    /// Every option given, including `--dry` and `--all`
    pub options: OptionSet,
    pub dry: bool,
    pub all: bool,
}

impl Invocation {
    pub fn flags(&self) -> TopLevelFlags {
        TopLevelFlags::from_options(&self.options, self.dry, self.all)
    }
}

pub fn parse_from<I, T>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(|e| StackError::Usage(e.to_string()))?;
    classify(cli.args)
}

/// Sort raw arguments into a [`Command`].
pub fn classify(args: Vec<String>) -> Result<Command> {
    let mut options = OptionSet::new();
    let mut formulae = Vec::new();
    for arg in args {
        if arg == "--" {
            continue;
        } else if arg.starts_with("--") {
            options.insert(arg);
        } else if let Some(switches) = arg.strip_prefix('-') {
            for switch in switches.chars() {
                options.insert(expand_switch(switch));
            }
        } else {
            formulae.push(arg);
        }
    }

    if options.contains("--help") {
        return Ok(Command::Help);
    }
    if options.contains("--interactive") {
        return Err(StackError::Usage(
            "--interactive install option is not supported".to_string(),
        ));
    }

    let formula = match formulae.len() {
        1 => formulae.remove(0),
        0 => {
            return Err(StackError::Usage(
                "This command requires a formula argument".to_string(),
            ));
        }
        n => {
            return Err(StackError::Usage(format!(
                "This command takes exactly one formula, got {}: {}",
                n,
                formulae.join(" ")
            )));
        }
    };

    Ok(Command::Stack(Invocation {
        formula,
        dry: options.contains("--dry"),
        all: options.contains("--all"),
        options,
    }))
}

// Single-letter switches as `brew install` understands them
fn expand_switch(switch: char) -> String {
    match switch {
        'd' => "--debug".to_string(),
        'f' => "--force".to_string(),
        'g' => "--git".to_string(),
        'h' => "--help".to_string(),
        'i' => "--interactive".to_string(),
        's' => "--build-from-source".to_string(),
        'v' => "--verbose".to_string(),
        other => format!("-{}", other),
    }
}
