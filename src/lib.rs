pub mod aggregate;
pub mod bind;
pub mod clean;
pub mod cli;
pub mod coerce;
pub mod dashboard;
pub mod data;
pub mod derive;
pub mod error;
pub mod fetch;
pub mod field;
pub mod filter;
pub mod grid;
pub mod io_utils;
pub mod loader;
pub mod record;
pub mod records;
pub mod schema;
pub mod schema_cmd;
pub mod source;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

pub use error::LoadError;
pub use field::Field;
pub use loader::{LoadReport, Loader, load};
pub use record::{InventoryRecord, RecordSet};
pub use schema::Schema;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("inventory_normalizer", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Load(args) => records::execute(&args),
        Commands::Aggregate(args) => aggregate::execute(&args),
        Commands::Dashboard(args) => dashboard::execute(&args),
        Commands::Schema(args) => schema_cmd::execute(&args),
    }
}
