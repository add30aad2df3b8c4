//! Row types read from the Keycloak database.

/// A user row from Keycloak's `user_entity` table, joined with its realm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Keycloak user id (UUID string).
    pub id: String,

    pub email: Option<String>,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    /// Name of the realm the user belongs to.
    pub realm_name: Option<String>,

    pub username: String,

    /// Creation time in epoch milliseconds, as Keycloak stores it.
    pub created_timestamp: i64,
}

impl UserRecord {
    /// Create a record with only the required columns set.
    pub fn new(id: impl Into<String>, username: impl Into<String>, created_timestamp: i64) -> Self {
        Self {
            id: id.into(),
            email: None,
            first_name: None,
            last_name: None,
            realm_name: None,
            username: username.into(),
            created_timestamp,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_realm(mut self, realm_name: impl Into<String>) -> Self {
        self.realm_name = Some(realm_name.into());
        self
    }
}
