//! User queries.

use duckdb::params;
use tracing::debug;

use super::Store;
use crate::schema::UserRecord;
use crate::threshold::Threshold;
use crate::Result;

impl Store {
    /// Users in `realm` created at or before `threshold`.
    ///
    /// Every row is read before returning, so a failure part-way through the
    /// result set yields an error and no records.
    pub fn users_created_before(&self, realm: &str, threshold: &Threshold) -> Result<Vec<UserRecord>> {
        let sql = format!(
            r#"
            SELECT ue.id, ue.email, ue.first_name, ue.last_name,
                   r.name AS realm_name, ue.username, ue.created_timestamp
            FROM {} AS ue
            LEFT JOIN {} AS r ON (ue.realm_id = r.id)
            WHERE r.name = ? AND ue.created_timestamp <= ?
            "#,
            self.tables.qualify("user_entity"),
            self.tables.qualify("realm"),
        );
        debug!(realm, threshold = threshold.as_millis(), "querying users");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![realm, threshold.as_millis()], |row| {
            Ok(UserRecord {
                id: row.get(0)?,
                email: row.get(1)?,
                first_name: row.get(2)?,
                last_name: row.get(3)?,
                realm_name: row.get(4)?,
                username: row.get(5)?,
                created_timestamp: row.get(6)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}
