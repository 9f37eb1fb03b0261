//! API models for request payloads
//!
//! Create, read and delete use [`common::User`] directly; only the update
//! payload differs because its identifier comes from the path.

use common::User;
use serde::Deserialize;
use uuid::Uuid;

/// Request for user update
///
/// `id` may be omitted. When present it must match the path identifier,
/// since the identifier of a user never changes.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub login: String,
    pub password: String,
}

impl UpdateUserRequest {
    /// Entity for user `id`, or `None` if the body names another user
    pub fn into_user(self, id: Uuid) -> Option<User> {
        match self.id {
            Some(body_id) if body_id != id => None,
            _ => Some(User::new(id, self.login, self.password)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_without_id_takes_path_id() {
        let id = Uuid::new_v4();
        let request: UpdateUserRequest =
            serde_json::from_str(r#"{"login":"bob","password":"y"}"#).unwrap();

        assert_eq!(request.into_user(id), Some(User::new(id, "bob", "y")));
    }

    #[test]
    fn test_body_with_other_id_is_rejected() {
        let request = UpdateUserRequest {
            id: Some(Uuid::new_v4()),
            login: "bob".to_string(),
            password: "y".to_string(),
        };

        assert_eq!(request.into_user(Uuid::new_v4()), None);
    }
}
