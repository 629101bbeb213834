//! Authentication and authorization plumbing
//!
//! Tokens come from the external identity collaborator; this module
//! validates them and turns claims into a [`CurrentUser`] the handlers and
//! the state machine guard can trust.

mod extractor;
pub mod jwt;
mod middleware;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};
pub use middleware::{require_auth, require_staff};

use crate::utils::AppError;

/// Caller role as asserted by the identity collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Staff,
}

impl Role {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "client" => Some(Self::Client),
            // Administrators manage requests the same way case managers do
            "staff" | "admin" => Some(Self::Staff),
            _ => None,
        }
    }
}

/// Current user context (parsed from JWT claims)
///
/// Injected by the auth middleware; available to handlers via extension
/// or extractor.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub display_name: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }
}

impl TryFrom<Claims> for CurrentUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::invalid_token(format!("Non-numeric subject: {}", claims.sub)))?;
        let role = Role::parse(&claims.role)
            .ok_or_else(|| AppError::invalid_token(format!("Unknown role: {}", claims.role)))?;
        Ok(Self {
            id,
            display_name: claims.name,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, role: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            name: "Test".to_string(),
            role: role.to_string(),
            exp: 0,
            iat: 0,
            iss: "portal-identity".to_string(),
            aud: "portal-clients".to_string(),
        }
    }

    #[test]
    fn admin_claims_map_to_staff() {
        let user = CurrentUser::try_from(claims("7", "admin")).unwrap();
        assert!(user.is_staff());
        assert_eq!(user.id, 7);
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(CurrentUser::try_from(claims("7", "superuser")).is_err());
    }

    #[test]
    fn non_numeric_subject_is_rejected() {
        assert!(CurrentUser::try_from(claims("abc", "client")).is_err());
    }
}
