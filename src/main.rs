use clap::Parser;
use frontier::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
