/// Identity records
///
/// Users belong to the identity provider. MenuCraft only ever reads them, so
/// the shape here is the subset of the provider's user object the API and
/// the session manager need.

use serde::{Deserialize, Serialize};

/// Profile fields collected at signup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
}

/// An authenticated user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Provider-assigned id (the JWT `sub`)
    pub id: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Input for creating an account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,

    /// Plaintext; only ever handed to the provider
    pub password: String,

    pub name: Option<String>,

    pub business_name: Option<String>,
}

impl NewUser {
    /// Metadata stored alongside the account
    pub fn metadata(&self) -> UserMetadata {
        UserMetadata {
            name: self.name.clone(),
            business_name: self.business_name.clone(),
        }
    }
}

/// An issued session
///
/// `expires_at` is a unix timestamp in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,

    pub refresh_token: String,

    pub expires_at: i64,

    pub user: User,
}

impl Session {
    /// Seconds until the access token expires (negative once expired)
    pub fn expires_in(&self, now: i64) -> i64 {
        self.expires_at - now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_wire_format() {
        let user: User = serde_json::from_value(json!({
            "id": "abc",
            "userMetadata": { "name": "Ana", "businessName": "Ana's Tacos" }
        }))
        .unwrap();

        assert_eq!(user.email, "");
        assert_eq!(user.user_metadata.business_name.as_deref(), Some("Ana's Tacos"));

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["userMetadata"]["name"], json!("Ana"));
        assert!(value.get("user_metadata").is_none());
    }

    #[test]
    fn test_session_expires_in() {
        let session = Session {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: 1_000,
            user: User {
                id: "u".into(),
                email: String::new(),
                user_metadata: UserMetadata::default(),
            },
        };
        assert_eq!(session.expires_in(940), 60);
        assert_eq!(session.expires_in(1_100), -100);
    }
}
