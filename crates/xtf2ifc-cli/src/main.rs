use std::{process, str::FromStr};

use clap::Parser;
use log::{debug, error, info, LevelFilter};

use xtf2ifc_cli::Args;

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'info' instead.", args.log_level);
        LevelFilter::Info
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
    debug!("{args:?}");

    match xtf2ifc_cli::run(&args) {
        Ok(batch) if batch.failed.is_empty() => {
            info!("done");
        }
        Ok(batch) => {
            error!("{} of {} files failed", batch.failed.len(), batch.files.len());
            process::exit(1);
        }
        Err(err) => {
            error!("{err:#}");
            process::exit(1);
        }
    }
}
