use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::{Role, User};

// Required string fields default to "" so missing keys surface as 400
// validation errors instead of deserialization rejections.

/// Request body for user registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Request body for a partial profile update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub language: Option<String>,
}

/// Request body for a password change.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

/// Response returned after register or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

/// Response wrapping a single user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: PublicUser,
}

/// Confirmation-only response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Public projection of a user. Deliberately has no password-hash field at
/// all, so it cannot leak one.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub language: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            location: user.location.clone(),
            language: user.language.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "ann@example.com".into(),
            password_hash: "$argon2id$should-never-appear".into(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            phone: None,
            location: Some("Berlin".into()),
            language: "en".into(),
            role: Role::Provider,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn public_user_uses_camel_case_and_omits_hash() {
        let json = serde_json::to_value(PublicUser::from(&sample_user())).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("firstName"));
        assert!(obj.contains_key("createdAt"));
        assert_eq!(json["role"], "provider");
        assert!(!json.to_string().contains("should-never-appear"));
        assert!(obj.keys().all(|k| !k.to_lowercase().contains("password")));
        assert!(obj.keys().all(|k| !k.to_lowercase().contains("hash")));
    }

    #[test]
    fn user_record_never_serializes_its_hash() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(!json.to_string().contains("should-never-appear"));
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn register_request_defaults_missing_fields_to_empty() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"a@x.com"}"#).unwrap();
        assert_eq!(req.email, "a@x.com");
        assert!(req.password.is_empty());
        assert!(req.first_name.is_empty());
        assert!(req.role.is_none());
    }
}
