//! Command line front end.
//!
//! Arguments are parsed into an [`Action`] which [`dispatch`] hands to a
//! [`CommandHandler`]. The binary uses [`ManifestCommands`]; tests plug in
//! their own handler.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use log::{debug, info};

use crate::build::{BuildOptions, Builder};
use crate::vfs::FileSystem;

const ABOUT: &str = "Melo bridges Go and Python.";

const LONG_ABOUT: &str = "Melo bridges Go and Python.\n\n\
By running the build command you build your project: every package marked \
with a `// melo:<bridge path>` line is inspected and its exported surface is \
written to an export manifest, ready for Python binding generation.";

#[derive(Debug, Parser)]
#[command(name = "melo", version, about = ABOUT, long_about = LONG_ABOUT, disable_help_subcommand = true)]
pub struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build your project
    Build {
        /// Root of the Go module, the folder holding go.mod
        input: PathBuf,

        /// Output folder [default: build]
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print this message
    Help,
}

/// What the command line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Build { input: PathBuf, output: Option<PathBuf> },

    /// Show usage, with the reason when the arguments were not understood
    Help { error: Option<String> },

    Version,
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub verbose: bool,
    pub action: Action,
}

/// Behaviours the command line triggers
pub trait CommandHandler {
    /// Build the module at `input`; `output` overrides the configured folder
    fn build(&mut self, input: &Path, output: Option<&Path>) -> Result<()>;

    /// Print usage, after `error` when there is one
    fn help(&mut self, error: Option<&str>) -> Result<()>;
}

/// Parse arguments, the program name included.
///
/// Anything that doesn't form a valid command turns into [`Action::Help`].
pub fn parse_arguments<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let verbose = args.iter().skip(1).any(|a| a == "-v" || a == "--verbose");

    let action = match Cli::try_parse_from(&args) {
        Ok(cli) => match cli.command {
            Some(Command::Build { input, output }) => Action::Build { input, output },
            Some(Command::Help) => Action::Help { error: None },
            None => Action::Help {
                error: Some("missing command".to_string()),
            },
        },
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                Action::Help { error: None }
            }
            ErrorKind::DisplayVersion => Action::Version,
            kind => {
                debug!("Argument error {:?}", kind);
                Action::Help {
                    error: Some(first_line(&e.to_string())),
                }
            }
        },
    };

    Invocation { verbose, action }
}

fn first_line(message: &str) -> String {
    message
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string()
}

/// Run `action` against `handler`
pub fn dispatch(action: Action, handler: &mut dyn CommandHandler) -> Result<()> {
    match action {
        Action::Build { input, output } => {
            info!(
                "Building {} to {}",
                input.display(),
                output
                    .as_deref()
                    .map(|o| o.display().to_string())
                    .unwrap_or_else(|| "the configured output folder".to_string())
            );
            handler.build(&input, output.as_deref())
        }
        Action::Help { error } => handler.help(error.as_deref()),
        Action::Version => {
            println!("melo {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Usage text
pub fn help_text() -> String {
    Cli::command().render_long_help().to_string()
}

/// Handler backed by [`Builder`]
pub struct ManifestCommands<F: FileSystem> {
    fs: F,
}

impl<F: FileSystem> ManifestCommands<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }
}

impl<F: FileSystem> CommandHandler for ManifestCommands<F> {
    fn build(&mut self, input: &Path, output: Option<&Path>) -> Result<()> {
        let mut options = BuildOptions::load_or_default(&self.fs, input)?;
        if let Some(output) = output {
            options.output_dir = output.to_path_buf();
        }

        let report = Builder::new(options).build(&self.fs, input)?;
        println!("Manifest written to {}", report.manifest_path.display());
        Ok(())
    }

    fn help(&mut self, error: Option<&str>) -> Result<()> {
        if let Some(error) = error {
            eprintln!("Error: {}", error);
        }
        println!("{}", help_text());
        Ok(())
    }
}
