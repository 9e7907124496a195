//! Registered users.

use serde::{Deserialize, Serialize};

use super::{Email, UserId};

/// A user as the backend returns it.
///
/// Any password field in the response is ignored; it is never held in memory
/// after submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_password_in_response_is_dropped() {
        let json = r#"{"id": 3, "name": "Ana", "email": "ana@pitii.com", "password": "hunter2"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        let back = serde_json::to_string(&user).unwrap();
        assert!(!back.contains("hunter2"));
    }
}
