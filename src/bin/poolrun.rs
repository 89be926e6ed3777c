use std::env;
use std::process::exit;

use log::error;
use poolrun::args;
use poolrun::runner;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let (number_of_jobs, number_of_threads) = match args::parse(env::args().skip(1)) {
        Ok(parsed) => parsed,
        Err(_) => {
            // Usage goes to stdout and the process exits 0 even on bad
            // arguments; both are long-standing behaviors of this demo.
            println!("{}", args::USAGE);
            exit(0);
        }
    };

    if let Err(e) = runner::run(number_of_jobs, number_of_threads) {
        error!("{}", e);
        exit(1);
    }
}
