//! Command-line surface
//!
//! `rex_slew_scan UTC [KERNEL ...] [--OPTION ...]`

use clap::Parser;
use log::warn;
use std::path::PathBuf;

/// Command line arguments for the slew/scan attitude computation
#[derive(Parser, Debug)]
#[command(
    name = "rex_slew_scan",
    version,
    about = "Computes the REX slew/scan attitude sequence and writes it as JSON",
    long_about = None
)]
pub struct Args {
    /// UTC time, then kernel files to load in order, then --options
    #[arg(
        value_name = "UTC [KERNEL ...] [--OPTION ...]",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub inputs: Vec<String>,
}

/// Options passed as `--name`
///
/// No option is recognized yet; every one is recorded as ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub ignored: Vec<String>,
}

impl RunOptions {
    fn push(&mut self, option: &str) {
        warn!("Ignoring unrecognized option {option}");
        self.ignored.push(option.to_string());
    }
}

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub utc: String,
    pub kernels: Vec<PathBuf>,
    pub options: RunOptions,
}

impl Invocation {
    /// Split raw positional arguments; `None` when there are none
    pub fn from_inputs(inputs: &[String]) -> Option<Self> {
        let (utc, rest) = inputs.split_first()?;
        let mut kernels = Vec::new();
        let mut options = RunOptions::default();
        for arg in rest {
            if arg.starts_with("--") {
                options.push(arg);
            } else {
                kernels.push(PathBuf::from(arg));
            }
        }
        Some(Self {
            utc: utc.clone(),
            kernels,
            options,
        })
    }
}

impl Args {
    pub fn invocation(&self) -> Option<Invocation> {
        Invocation::from_inputs(&self.inputs)
    }
}
