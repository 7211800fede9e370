//! Portal identity: roles, the cached session, and route guarding.
//!
//! Authentication itself belongs to an external identity provider reached
//! through [`IdentityProvider`]. This module only keeps the resulting user
//! record and decides where a role may go.

mod cache;
mod identity;
mod routes;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cache::{SessionCache, SESSION_FILENAME};
pub use identity::{IdentityProvider, SessionManager};
pub use routes::{guard, RouteDecision, HOME_ROUTE};

/// Portal role. Decides which dashboard a user lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Patient,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Doctor => "doctor",
            Self::Patient => "patient",
        }
    }

    pub fn dashboard_route(&self) -> &'static str {
        match self {
            Self::Doctor => "/doctor/dashboard",
            Self::Patient => "/patient/dashboard",
        }
    }

    pub fn auth_route(&self) -> &'static str {
        match self {
            Self::Doctor => "/doctor/auth",
            Self::Patient => "/patient/auth",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "doctor" => Ok(Self::Doctor),
            "patient" => Ok(Self::Patient),
            other => Err(SessionError::UnknownRole(other.to_string())),
        }
    }
}

/// Profile of a signed-in user, as stored by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Email with the local part masked, for logs.
    pub fn masked_email(&self) -> String {
        mask_email(&self.email)
    }
}

/// Sign-up form contents.
#[derive(Debug, Clone)]
pub struct RegistrationProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub role: Role,
}

impl RegistrationProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// Errors from the identity collaborator or the session cache.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User data not found for {0}")]
    ProfileNotFound(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Session cache error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Mask a patient identifier for logging (`jo****@example.com`).
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let visible: String = local.chars().take(2).collect();
            format!("{}****@{}", visible, domain)
        }
        None => "****".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_routes() {
        assert_eq!(Role::Doctor.dashboard_route(), "/doctor/dashboard");
        assert_eq!(Role::Patient.dashboard_route(), "/patient/dashboard");
        assert_eq!(Role::Patient.auth_route(), "/patient/auth");
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("doctor".parse::<Role>().unwrap(), Role::Doctor);
        assert_eq!(" Patient ".parse::<Role>().unwrap(), Role::Patient);
        assert!(matches!(
            "nurse".parse::<Role>(),
            Err(SessionError::UnknownRole(r)) if r == "nurse"
        ));
    }

    #[test]
    fn test_user_record_json_shape() {
        let json = r#"{
            "fullName": "Ada Lovelace",
            "email": "ada@example.com",
            "phone": "555-0100",
            "role": "doctor",
            "createdAt": "2025-03-01T10:00:00Z"
        }"#;
        let user: UserRecord = serde_json::from_str(json).unwrap();
        assert_eq!(user.full_name, "Ada Lovelace");
        assert_eq!(user.role, Role::Doctor);

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["fullName"], "Ada Lovelace");
        assert_eq!(back["role"], "doctor");
    }

    #[test]
    fn test_registration_full_name() {
        let profile = RegistrationProfile {
            first_name: " Grace ".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@example.com".to_string(),
            phone: None,
            password: "hunter22".to_string(),
            role: Role::Patient,
        };
        assert_eq!(profile.full_name(), "Grace Hopper");
    }

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("john.doe@example.com"), "jo****@example.com");
        assert_eq!(mask_email("a@b.c"), "a****@b.c");
        assert_eq!(mask_email("not-an-email"), "****");
    }
}
