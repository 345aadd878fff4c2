//! User identity model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shoplink_core::{Email, UserId};

/// A registered user.
///
/// The password hash is deliberately not part of this type: it only ever
/// travels through the repository layer and never into a response body.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_has_no_hash_field() {
        let user = User {
            id: UserId::new(1),
            email: Email::parse("a@b.com").unwrap(),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&user).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("email"));
        assert!(!object.contains_key("password_hash"));
        assert!(!object.contains_key("password"));
    }
}
