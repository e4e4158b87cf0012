use std::{path::PathBuf, process::ExitCode};

use chainring::{reader::TcxReader, track::Track};
use clap::Parser;

/// Print the points of the first track in an activity file, with the speed
/// between consecutive points.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to a TCX file.
    file: PathBuf,
    /// Check the document against the constraints of the format.
    #[arg(long)]
    validate: bool,
    /// Print feet and miles per hour instead of meters and kilometers per hour.
    #[arg(long)]
    imperial: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("chainring: {}: {e}", args.file.display());
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let database = TcxReader::new()
        .validating(args.validate)
        .read(&args.file)?;

    let track = Track::from_database(&database)?;

    for point in &track.points {
        if args.imperial {
            println!("{}", point.imperial());
        } else {
            println!("{point}");
        }
    }

    Ok(())
}
