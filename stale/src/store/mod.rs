//! Store - read access to the Keycloak database.
//!
//! Uses an in-memory DuckDB connection with Keycloak's PostgreSQL database
//! attached read-only through DuckDB's `postgres` extension.

mod users;

#[cfg(test)]
pub(crate) mod test_support;

use duckdb::Connection;
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::{Error, Result};

/// Catalog alias the Keycloak database is attached under.
pub const KEYCLOAK_CATALOG: &str = "keycloak";

/// Where Keycloak's tables live: `<catalog>.<schema>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub catalog: String,
    pub schema: String,
}

impl TableRef {
    pub fn new(catalog: impl Into<String>, schema: impl Into<String>) -> Self {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
        }
    }

    /// Fully qualified, quoted name of `table`.
    pub fn qualify(&self, table: &str) -> String {
        format!(
            "{}.{}.{}",
            quote_ident(&self.catalog),
            quote_ident(&self.schema),
            quote_ident(table)
        )
    }
}

/// A read-only handle on the Keycloak tables.
pub struct Store {
    conn: Connection,
    tables: TableRef,
}

impl Store {
    /// Attach the Keycloak database described by `db`.
    pub fn connect(db: &DatabaseConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        if !ensure_extension(&conn, "postgres") {
            return Err(Error::Extension(
                "Required extension 'postgres' could not be installed".to_string(),
            ));
        }

        debug!(host = %db.host, port = db.port, dbname = %db.dbname, "attaching keycloak database");
        conn.execute_batch(&format!(
            "ATTACH {} AS {} (TYPE postgres, READ_ONLY)",
            quote_literal(&db.conninfo()),
            quote_ident(KEYCLOAK_CATALOG)
        ))?;

        Ok(Self {
            conn,
            tables: TableRef::new(KEYCLOAK_CATALOG, db.schema.clone()),
        })
    }

    /// Wrap an existing connection whose Keycloak tables live at `tables`.
    pub fn from_connection(conn: Connection, tables: TableRef) -> Self {
        Self { conn, tables }
    }
}

/// Ensure a DuckDB extension is loaded, installing it if necessary.
fn ensure_extension(conn: &Connection, name: &str) -> bool {
    // Already installed/cached
    if conn.execute(&format!("LOAD {}", name), []).is_ok() {
        return true;
    }

    conn.execute(&format!("INSTALL {}", name), []).is_ok()
        && conn.execute(&format!("LOAD {}", name), []).is_ok()
}

/// Quote a SQL identifier.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a SQL string literal.
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
