//! In-memory stand-in for Keycloak's tables.

use duckdb::{params, Connection};

use super::{Store, TableRef};
use crate::schema::UserRecord;

/// A store over empty `realm` and `user_entity` tables, with realms
/// `r-master` (master) and `r-staff` (staff).
pub(crate) fn keycloak_store() -> Store {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE realm (id VARCHAR PRIMARY KEY, name VARCHAR);
        CREATE TABLE user_entity (
            id VARCHAR PRIMARY KEY,
            email VARCHAR,
            first_name VARCHAR,
            last_name VARCHAR,
            realm_id VARCHAR,
            username VARCHAR NOT NULL,
            created_timestamp BIGINT
        );
        INSERT INTO realm VALUES ('r-master', 'master'), ('r-staff', 'staff');
        "#,
    )
    .unwrap();
    Store::from_connection(conn, TableRef::new("memory", "main"))
}

pub(crate) fn insert(store: &Store, user: &UserRecord, realm_id: &str) {
    store
        .conn
        .execute(
            "INSERT INTO user_entity VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                user.id,
                user.email,
                user.first_name,
                user.last_name,
                realm_id,
                user.username,
                user.created_timestamp,
            ],
        )
        .unwrap();
}
