//! kca: report Keycloak users created before a cutoff.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use stale::threshold::days_from_raw;
use stale::{Config, Field};
use tracing::{error, info};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "kca")]
#[command(about = "List identity-provider users in a Keycloak realm created before a cutoff")]
#[command(version)]
struct Cli {
    /// Config file (default: $KCAUDIT_CONFIG, then the user config dir)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Database username
    #[arg(short = 'U', long = "username")]
    username: Option<String>,

    /// Database password
    #[arg(short = 'W', long = "password")]
    password: Option<String>,

    /// Database name
    #[arg(short = 'd', long = "dbname")]
    dbname: Option<String>,

    /// Host name of the machine on which the database server is running
    #[arg(short = 'H', long = "host")]
    host: Option<String>,

    /// Database port
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,

    /// Database schema holding the Keycloak tables
    #[arg(long = "schema")]
    schema: Option<String>,

    /// Keycloak realm
    #[arg(short = 'r', long = "realm")]
    realm: Option<String>,

    /// Report users older than this many days (-1 disables)
    #[arg(long = "days", allow_hyphen_values = true)]
    days: Option<i64>,

    /// Report users created on or before this date (YYYY-MM-DD); overrides --days
    #[arg(long = "date", visible_alias = "deleteDate")]
    date: Option<String>,

    /// Include id in the output
    #[arg(short = '0', long = "inc-id", alias = "incId", num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    inc_id: Option<bool>,

    /// Include username in the output (on by default)
    #[arg(short = '1', long = "inc-username", alias = "incUsername", num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    inc_username: Option<bool>,

    /// Include email in the output
    #[arg(short = '2', long = "inc-email", alias = "incEmail", num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    inc_email: Option<bool>,

    /// Include first name in the output
    #[arg(short = '3', long = "inc-first-name", alias = "incFirstName", num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    inc_first_name: Option<bool>,

    /// Include last name in the output
    #[arg(short = '4', long = "inc-last-name", alias = "incLastName", num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    inc_last_name: Option<bool>,

    /// Include created timestamp in the output
    #[arg(short = '5', long = "inc-created-timestamp", alias = "incCreatedTimestamp", num_args = 0..=1, default_missing_value = "true", action = ArgAction::Set)]
    inc_created_timestamp: Option<bool>,
}

impl Cli {
    /// Apply flags given on the command line over the loaded config.
    fn apply(&self, config: &mut Config) -> stale::Result<()> {
        let db = &mut config.database;
        if let Some(username) = &self.username {
            db.username = username.clone();
        }
        if let Some(password) = &self.password {
            db.password = password.clone();
        }
        if let Some(dbname) = &self.dbname {
            db.dbname = dbname.clone();
        }
        if let Some(host) = &self.host {
            db.host = host.clone();
        }
        if let Some(port) = self.port {
            db.port = port;
        }
        if let Some(schema) = &self.schema {
            db.schema = schema.clone();
        }
        if let Some(realm) = &self.realm {
            config.realm = realm.clone();
        }

        if let Some(days) = self.days {
            config.criteria.days = days_from_raw(days)?;
        }
        if let Some(date) = &self.date {
            // An empty --date clears a date coming from the config file or env
            config.criteria.date = Some(date.clone()).filter(|d| !d.is_empty());
        }

        let flags = [
            (Field::Id, self.inc_id),
            (Field::Username, self.inc_username),
            (Field::Email, self.inc_email),
            (Field::FirstName, self.inc_first_name),
            (Field::LastName, self.inc_last_name),
            (Field::CreatedTimestamp, self.inc_created_timestamp),
        ];
        for (field, enabled) in flags {
            if let Some(enabled) = enabled {
                config.output.set(field, enabled);
            }
        }
        Ok(())
    }
}

fn load_config(cli: &Cli) -> stale::Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config)?;
    Ok(config)
}

fn main() {
    let cli = Cli::parse();
    logging::init();

    let exe_name = std::env::args()
        .next()
        .as_deref()
        .and_then(|p| std::path::Path::new(p).file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| "kca".to_string());
    info!("[START] {}", exe_name);

    let result = load_config(&cli).and_then(|config| commands::report(&config));

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
    info!("[END] {}", exe_name);
}
