//! Score the flexibility of a text trajectory.
//!
//! Prints the mean RMSD of all frames to the frame closest to the mean positions, with four
//! decimals, and nothing else.
//!
//! By Marieke Westendorp, 2024.
//! <ma3ke.cyber@gmail.com>
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read, Seek};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use flexcalc::{flexibility, Parsing, Summary, TrajReader};

const PROGRAM: &str = env!("CARGO_BIN_NAME");

/// Calculate the flexibility of a trajectory: the mean RMSD of all frames to the frame that is
/// closest to the mean atom positions.
///
/// Each frame starts with a header line beginning with `>`, followed by one `x y z` line per atom.
/// All frames must hold the same number of atoms, in the same order.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Input path (text trajectory), or `-` to read from standard input.
    input: PathBuf,

    /// Accept malformed coordinate lines, defaulting values that cannot be read to zero.
    #[arg(long)]
    lenient: bool,

    /// Report the progress of each pass to standard error.
    ///
    /// The `RUST_LOG` environment variable takes precedence over this flag.
    #[arg(short, long)]
    verbose: bool,
}

fn score<R: BufRead + Seek>(source: R, parsing: Parsing) -> flexcalc::Result<Summary> {
    let mut reader = TrajReader::new(source).with_parsing(parsing);
    flexibility(&mut reader)
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // A missing or invalid argument is not a failure. Show how to use the program.
            match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
                _ => println!("{}", Args::command().render_help()),
            }
            return ExitCode::SUCCESS;
        }
    };

    let default_filter = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let parsing = if args.lenient {
        Parsing::Lenient
    } else {
        Parsing::Strict
    };

    let summary = if args.input.as_os_str() == "-" {
        // Standard input cannot be rewound between passes, so it is held in memory instead.
        log::warn!("reading the trajectory from standard input into memory");
        let mut buf = Vec::new();
        if let Err(err) = std::io::stdin().lock().read_to_end(&mut buf) {
            eprintln!("{PROGRAM} error: unable to read standard input: {err}");
            return ExitCode::FAILURE;
        }
        score(Cursor::new(buf), parsing)
    } else {
        match File::open(&args.input) {
            Ok(file) => score(BufReader::new(file), parsing),
            Err(err) => {
                eprintln!(
                    "{PROGRAM} error: unable to open '{}': {err}",
                    args.input.display()
                );
                return ExitCode::FAILURE;
            }
        }
    };

    match summary {
        Ok(summary) => {
            log::info!(
                "{} frames of {} atoms, closest to the mean is '{}'",
                summary.nframes,
                summary.natoms,
                summary.closest_header
            );
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{PROGRAM} error: {err}");
            ExitCode::FAILURE
        }
    }
}
