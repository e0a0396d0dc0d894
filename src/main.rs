use std::process::ExitCode;

use env_logger::Env;
use log::error;

use melo_scanner::cli::{self, ManifestCommands};
use melo_scanner::OsFileSystem;

fn main() -> ExitCode {
    let invocation = cli::parse_arguments(std::env::args_os());

    let default_level = if invocation.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let mut commands = ManifestCommands::new(OsFileSystem);
    match cli::dispatch(invocation.action, &mut commands) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
