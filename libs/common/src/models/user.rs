//! User model and its JSON and row encodings

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User entity
///
/// The identifier is assigned by the caller and never changes. The password
/// is stored exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    pub password: String,
}

impl User {
    /// Create a new user value
    pub fn new(id: Uuid, login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id,
            login: login.into(),
            password: password.into(),
        }
    }

    /// Copy of this user carrying a different identifier
    pub fn with_id(self, id: Uuid) -> Self {
        Self { id, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_json_encoding() {
        let id = Uuid::parse_str("6b3e4a43-6c52-4f9c-8b5e-0e8b2f2d8d11").unwrap();
        let user = User::new(id, "alice", "x");

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "6b3e4a43-6c52-4f9c-8b5e-0e8b2f2d8d11",
                "login": "alice",
                "password": "x",
            })
        );
    }

    #[test]
    fn test_user_json_rejects_bad_id() {
        let result = serde_json::from_value::<User>(json!({
            "id": "not-a-uuid",
            "login": "alice",
            "password": "x",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_with_id_keeps_attributes() {
        let user = User::new(Uuid::new_v4(), "bob", "secret");
        let id = Uuid::new_v4();

        let moved = user.clone().with_id(id);
        assert_eq!(moved.id, id);
        assert_eq!(moved.login, user.login);
        assert_eq!(moved.password, user.password);
    }
}
