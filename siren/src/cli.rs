//! Parses the command line arguments.
//!
//! Basic usage for running a scenario file with logging on:
//!
//! ```cargo run -- --scenario scenarios/hidden_terminal.ocean --log```

use chrono;
use clap::Parser;
use std::{
    fs::{create_dir_all, File, OpenOptions},
    path::Path,
    sync::Arc,
};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::{report, scenario, simulations};

/// Stores the different command line arguments.
#[derive(Parser)]
struct Args {
    ///Logging flag. Used to turn logging on or off.
    #[arg(short, long)]
    log: bool,
    ///File path to the scenario file to run as the sim
    #[arg(short, long)]
    scenario: Option<String>,
    ///Where to write the per-node results as CSV
    #[arg(short, long)]
    csv: Option<String>,
}

/// Parses command line arguments and acts on them. Without a scenario file
/// the default simulation runs.
pub fn initialize_from_arguments() {
    let cli = Args::parse();
    if cli.log {
        initialize_logging();
    }
    match cli.scenario {
        Some(path) => match Path::new(&path).try_exists() {
            Ok(true) => run_scenario_file(&path, cli.csv.as_deref()),
            Ok(false) => eprintln!("Provided file: \'{path}\' not found"),
            Err(e) => eprintln!("{e}"),
        },
        None => simulations::handshake_pair(),
    }
}

fn run_scenario_file(path: &str, csv: Option<&str>) {
    let mut scenario = match scenario::load(path) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };
    scenario.run();

    let rows = report::gather(scenario.ocean(), scenario.names());
    println!("{}", report::summary(&rows));
    if let Some(csv_path) = csv {
        let result = File::create(csv_path)
            .map_err(csv::Error::from)
            .and_then(|file| report::write_csv(file, &rows));
        if let Err(e) = result {
            eprintln!("could not write {csv_path}: {e}");
        }
    }
}

/// Initializes the event log. Only should be called once when the sim starts.
/// Allows for event! to be called and writes to a log file in ./logs.
fn initialize_logging() {
    let main_path = "./logs";
    create_dir_all(main_path).unwrap();
    let file_path = format!(
        "{}/debug-{}.log",
        main_path,
        chrono::offset::Local::now().format("%y-%m-%d_%H-%M-%S")
    );
    let file = OpenOptions::new()
        .write(true)
        .append(true)
        .create(true)
        .open(file_path)
        .unwrap();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_writer(Arc::new(file))
        .json()
        .finish();
    // set the global default so all events/logs go to the same subscriber and
    // subsequently the same file
    tracing::subscriber::set_global_default(subscriber).unwrap()
}
