//! keel - entry point.

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use keel::{app, pipe, Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("keel: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Check(args) => {
            let rendered = app::check(&args)
                .with_context(|| format!("invalid configuration in {}", args.config.display()))?;
            println!("{rendered}");
        }
        Command::Run(args) => {
            app::run(&args).with_context(|| format!("keel {} failed", args.environment))?;
        }
        Command::Pipe(args) => {
            let stdin = io::stdin().lock();
            let stdout = io::stdout().lock();
            pipe::pipe(&args, stdin, stdout)
                .with_context(|| format!("failed to write {}", args.log.display()))?;
        }
    }
    Ok(())
}
