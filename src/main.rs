use clap::Parser;
use quantjournal::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
