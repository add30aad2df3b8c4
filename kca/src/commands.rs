//! CLI command implementations.

use std::io;

use stale::{report_users, resolve_now, Config, Store, ThresholdSource};
use tracing::{info, warn};

/// Log the effective settings. The password is never shown.
fn log_settings(config: &Config) {
    let db = &config.database;
    info!(
        "connection: user={} host={} port={} dbname={} schema={}",
        db.username, db.host, db.port, db.dbname, db.schema
    );

    match config.criteria.days {
        Some(days) => info!("criteria: days={}", days),
        None => info!("criteria: days=disabled"),
    }
    match config.criteria.date() {
        Some(date) => info!("criteria: date={}", date),
        None => info!("criteria: date=disabled"),
    }
}

/// Report users in the configured realm created on or before the cutoff.
///
/// The cutoff is resolved before connecting, so a bad date never reaches
/// the database. Report lines go to stdout; the summary goes to the log.
pub fn report(config: &Config) -> stale::Result<()> {
    log_settings(config);

    let threshold = resolve_now(&config.criteria)?;
    if threshold.source() == ThresholdSource::Now {
        warn!("neither days nor date set; reporting every user created up to now");
    }
    info!("maxAge: {} from {}", threshold, threshold.source());

    let store = Store::connect(&config.database)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let rows = report_users(&store, &config.realm, &threshold, &config.output, &mut out)?;

    info!(
        "dbhost={}  dbname={}  realm={}  rows={}",
        config.database.host, config.database.dbname, config.realm, rows
    );
    Ok(())
}
