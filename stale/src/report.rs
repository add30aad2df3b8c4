//! Comma-separated rendering of user records.
//!
//! Each record becomes one line holding the enabled fields in a fixed order:
//! id, username, email, first name, last name, created timestamp. Values are
//! written as-is; embedded commas are not quoted.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::schema::UserRecord;
use crate::store::Store;
use crate::threshold::Threshold;
use crate::Result;

/// Separator between rendered fields.
pub const DELIMITER: char = ',';

/// A renderable column, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Username,
    Email,
    FirstName,
    LastName,
    CreatedTimestamp,
}

impl Field {
    /// All fields in canonical output order.
    pub const ALL: [Field; 6] = [
        Field::Id,
        Field::Username,
        Field::Email,
        Field::FirstName,
        Field::LastName,
        Field::CreatedTimestamp,
    ];

    /// Append this field's value for `record` to `line`.
    fn write_value(self, record: &UserRecord, line: &mut String) {
        match self {
            Field::Id => line.push_str(&record.id),
            Field::Username => line.push_str(&record.username),
            Field::Email => line.push_str(record.email.as_deref().unwrap_or("")),
            Field::FirstName => line.push_str(record.first_name.as_deref().unwrap_or("")),
            Field::LastName => line.push_str(record.last_name.as_deref().unwrap_or("")),
            Field::CreatedTimestamp => line.push_str(&record.created_timestamp.to_string()),
        }
    }
}

/// Which fields appear in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSelection {
    pub id: bool,
    pub username: bool,
    pub email: bool,
    pub first_name: bool,
    pub last_name: bool,
    pub created_timestamp: bool,
}

impl Default for OutputSelection {
    fn default() -> Self {
        Self {
            id: false,
            username: true,
            email: false,
            first_name: false,
            last_name: false,
            created_timestamp: false,
        }
    }
}

impl OutputSelection {
    /// A selection with every field disabled.
    pub fn none() -> Self {
        Self {
            id: false,
            username: false,
            email: false,
            first_name: false,
            last_name: false,
            created_timestamp: false,
        }
    }

    /// Build a selection enabling exactly the given fields.
    pub fn only(fields: &[Field]) -> Self {
        let mut selection = Self::none();
        for field in fields {
            selection.set(*field, true);
        }
        selection
    }

    pub fn is_enabled(&self, field: Field) -> bool {
        match field {
            Field::Id => self.id,
            Field::Username => self.username,
            Field::Email => self.email,
            Field::FirstName => self.first_name,
            Field::LastName => self.last_name,
            Field::CreatedTimestamp => self.created_timestamp,
        }
    }

    pub fn set(&mut self, field: Field, enabled: bool) {
        let flag = match field {
            Field::Id => &mut self.id,
            Field::Username => &mut self.username,
            Field::Email => &mut self.email,
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::CreatedTimestamp => &mut self.created_timestamp,
        };
        *flag = enabled;
    }

    /// Enabled fields in canonical order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL.into_iter().filter(|f| self.is_enabled(*f))
    }
}

/// Render one record. Returns an empty string when no field is enabled.
pub fn render(record: &UserRecord, selection: &OutputSelection) -> String {
    let mut line = String::new();
    for (i, field) in selection.fields().enumerate() {
        if i > 0 {
            line.push(DELIMITER);
        }
        field.write_value(record, &mut line);
    }
    line
}

/// Write one line per record to `out`, skipping empty renderings.
///
/// Returns the number of lines written.
pub fn write_report<W: Write>(
    out: &mut W,
    records: &[UserRecord],
    selection: &OutputSelection,
) -> std::io::Result<usize> {
    let mut written = 0;
    for record in records {
        let line = render(record, selection);
        if line.is_empty() {
            continue;
        }
        writeln!(out, "{}", line)?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

/// Report the users in `realm` created at or before `threshold`.
///
/// The full result set is read before the first line is written, so a query
/// failure leaves `out` untouched. Returns the number of matching users.
pub fn report_users<W: Write>(
    store: &Store,
    realm: &str,
    threshold: &Threshold,
    selection: &OutputSelection,
    out: &mut W,
) -> Result<usize> {
    let users = store.users_created_before(realm, threshold)?;
    write_report(out, &users, selection)?;
    Ok(users.len())
}
