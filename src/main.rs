mod aggregate;
mod app;
mod cli;
mod config;
mod consolidate;
mod model;
mod observer;
mod report;
mod store;
mod taxonomy;
mod timeline;

use std::process;

use config::Config;

fn main() {
    // RUST_LOG overrides the default level.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(&config) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
