use clap::Parser;
use tidydocs::cli::{RunOptions, run_cli};

fn main() {
    let options = RunOptions::parse();

    if let Err(e) = run_cli(&options) {
        eprintln!("Error: {}", e);
    }
}
