//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open a catalog from a connection string and list stored authors.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `catalog_cli [CONNECTION]`. Without an argument the connection is
//! read from `CATALOG_DATABASE` (default `catalog.sqlite3`). Setting
//! `CATALOG_LOG_DIR` to an absolute path enables rolling file logs.

use catalog_core::db::open_catalog;
use catalog_core::{
    init_logging, AuthorService, CatalogConfig, SqliteAuthorRepository,
};
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "CATALOG_LOG_DIR";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("catalog_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(connection) => CatalogConfig::from_connection_string(&connection)?,
        None => CatalogConfig::from_env()?,
    };

    let log_dir = std::env::var(LOG_DIR_ENV).ok();
    if let Some(log_dir) = log_dir.filter(|dir| !dir.trim().is_empty()) {
        init_logging(config.log_level, &log_dir)?;
    }

    let conn = open_catalog(&config)?;
    let service = AuthorService::new(SqliteAuthorRepository::try_new(&conn)?);

    println!("catalog_core version={}", catalog_core::core_version());
    for author in service.list()? {
        println!("{}\t{}", author.meta.id, author.name);
    }
    log::info!("event=cli_list module=cli status=ok");
    Ok(())
}
