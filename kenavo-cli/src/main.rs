use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use kenavo_lib::{CoreConfig, Error};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod directory;
mod gallery;

#[derive(Parser, Debug)]
#[command(name = "kenavo")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Search and browse the alumni directory
    #[command(subcommand)]
    Directory(directory::Command),
    /// Browse gallery albums
    #[command(subcommand)]
    Gallery(gallery::Command),
    /// Print the active configuration
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Human friendly panicking in release mode
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = match CoreConfig::load() {
        Ok(cfg) => cfg.into_handle(),
        Err(err) => return fail(&err),
    };

    let result = match &cli.command {
        Command::Directory(cmd) => directory::handle(&cfg, cmd).await,
        Command::Gallery(cmd) => gallery::handle(&cfg, cmd).await,
        Command::Config => cfg.read().to_toml().map(|s| print!("{s}")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(&err),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");
}

fn fail(err: &Error) -> ExitCode {
    eprintln!("{} {err}", "error:".red().bold());
    ExitCode::from(exit_code(err))
}

fn exit_code(err: &Error) -> sysexits::ExitCode {
    use sysexits::ExitCode as Sys;

    match err {
        Error::Io(_) => Sys::IoErr,
        Error::ConfigParse(_)
        | Error::ConfigSerialize(_)
        | Error::MissingConfig(_)
        | Error::NoConfigHome => Sys::Config,
        Error::Http(_) | Error::Status { .. } | Error::PageLoad(_) => Sys::Unavailable,
        Error::Decode(_) => Sys::DataErr,
        Error::Encode(_) => Sys::Software,
        Error::UnknownFacet(_) | Error::UnknownSearchField(_) | Error::EmptyName => Sys::Usage,
    }
}
