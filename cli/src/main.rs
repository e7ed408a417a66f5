// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use hvm::{
    loader::load_image,
    vm::{RunOutcome, VM},
};
use log::LevelFilter;
use simple_logger::SimpleLogger;

#[derive(Parser, Debug)]
#[command(name = "hvm")]
#[command(about = "Runs a Hack program image and prints a memory snapshot", long_about = None)]
struct Args {
    /// Path to the program image
    image: PathBuf,

    /// Stop after this many cycles instead of running until the sentinel
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Do not print the snapshot
    #[arg(short, long, action = ArgAction::SetTrue)]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let store = load_image(&args.image).with_context(|| {
        format!("failed to load {}", args.image.display())
    })?;
    let mut vm = VM::new(store);
    if vm.instructions().is_empty() {
        log::warn!("{} holds no instructions", args.image.display());
    }

    let outcome = match args.max_cycles {
        Some(max_cycles) => vm.run_for(max_cycles),
        None => vm.run().map(|()| RunOutcome::Halted),
    };

    if !args.quiet {
        print!("{}", vm.snapshot());
    }

    match outcome.context("machine faulted")? {
        RunOutcome::Halted => {
            log::info!(
                "halted after {} cycles over {} loaded words",
                vm.cycles(),
                vm.instructions().len()
            )
        }
        RunOutcome::CycleLimitReached => {
            log::warn!("stopped at the cycle limit of {}", vm.cycles())
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(error) = SimpleLogger::new()
        .with_level(args.log_level())
        .env()
        .init()
    {
        eprintln!("warning: logging unavailable: {error}");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
