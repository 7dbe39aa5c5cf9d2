// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and the authenticated principal derived from them.

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use super::error::AuthError;
use super::roles::Authority;

/// Claims read from a Clerk session token.
///
/// Only the fields the gate acts on are modelled. `sub`, `exp` and `iss` are
/// optional here so that their absence surfaces at the step that checks them
/// rather than as a decode failure.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    #[serde(default)]
    pub sub: Option<String>,

    /// Issuer
    #[serde(default)]
    pub iss: Option<String>,

    /// Expiration timestamp (Unix seconds, fraction dropped)
    #[serde(default, deserialize_with = "numeric_date")]
    pub exp: Option<i64>,

    /// Role claim, a single value or a list
    #[serde(default)]
    pub role: RoleClaim,
}

/// Shape of the `role` claim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RoleClaim {
    /// Claim missing, null, or of an unsupported JSON type.
    #[default]
    Absent,
    Single(String),
    Multiple(Vec<String>),
}

/// NumericDate: integer or fractional seconds, floored to whole seconds.
fn numeric_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|secs| secs.floor() as i64))
            .map(Some)
            .ok_or_else(|| D::Error::custom("NumericDate out of range")),
        Some(other) => Err(D::Error::custom(format!(
            "expected NumericDate, found {other}"
        ))),
    }
}

impl<'de> Deserialize<'de> for RoleClaim {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(role) => RoleClaim::Single(role),
            Value::Array(items) => RoleClaim::Multiple(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(role) => role,
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            _ => RoleClaim::Absent,
        })
    }
}

impl RoleClaim {
    /// Authorities in claim order. Duplicates are kept.
    pub fn authorities(&self) -> Vec<Authority> {
        match self {
            RoleClaim::Absent => Vec::new(),
            RoleClaim::Single(role) => vec![Authority::from_role(role)],
            RoleClaim::Multiple(roles) => roles.iter().map(|r| Authority::from_role(r)).collect(),
        }
    }
}

/// Identity attached to a request after its token has been verified.
///
/// Handlers read it from the request extensions through the extractors in
/// [`super::extractor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    /// Canonical user ID (Clerk `sub` claim)
    pub subject: String,

    /// `ROLE_*` authorities in claim order
    pub authorities: Vec<Authority>,
}

impl Principal {
    /// Build from claims whose signature, expiry and issuer were checked.
    ///
    /// A token without a subject names no one and is rejected as malformed.
    pub fn from_verified_claims(claims: TokenClaims) -> Result<Self, AuthError> {
        let Some(subject) = claims.sub else {
            warn!(target: "people.auth.gate", "Verified token carries no subject");
            return Err(AuthError::MalformedToken);
        };

        if claims.role == RoleClaim::Absent {
            warn!(
                target: "people.auth.gate",
                subject = %subject,
                "Verified token carries no role claim; principal has no authorities"
            );
        }

        Ok(Self {
            authorities: claims.role.authorities(),
            subject,
        })
    }

    pub fn has_authority(&self, authority: &Authority) -> bool {
        self.authorities.contains(authority)
    }

    /// Check for the authority derived from a raw role value.
    pub fn has_role(&self, role: &str) -> bool {
        self.has_authority(&Authority::from_role(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims_with(role: Value) -> TokenClaims {
        serde_json::from_value(json!({
            "sub": "user_123",
            "iss": "https://clerk.example.com",
            "exp": 1700003600,
            "role": role,
        }))
        .unwrap()
    }

    fn authority_names(claims: &TokenClaims) -> Vec<String> {
        claims
            .role
            .authorities()
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn single_role_becomes_one_authority() {
        let claims = claims_with(json!("admin"));
        assert_eq!(claims.role, RoleClaim::Single("admin".to_string()));
        assert_eq!(authority_names(&claims), vec!["ROLE_ADMIN"]);
    }

    #[test]
    fn role_list_keeps_order_and_duplicates() {
        let claims = claims_with(json!(["reviewer", "admin", "reviewer"]));
        assert_eq!(
            authority_names(&claims),
            vec!["ROLE_REVIEWER", "ROLE_ADMIN", "ROLE_REVIEWER"]
        );
    }

    #[test]
    fn non_string_list_items_use_json_text() {
        let claims = claims_with(json!(["admin", 7, true]));
        assert_eq!(
            authority_names(&claims),
            vec!["ROLE_ADMIN", "ROLE_7", "ROLE_TRUE"]
        );
    }

    #[test]
    fn missing_null_and_object_roles_are_absent() {
        let missing: TokenClaims =
            serde_json::from_value(json!({"sub": "user_123", "exp": 1})).unwrap();
        assert_eq!(missing.role, RoleClaim::Absent);
        assert_eq!(claims_with(Value::Null).role, RoleClaim::Absent);
        assert_eq!(claims_with(json!({"name": "admin"})).role, RoleClaim::Absent);
        assert!(RoleClaim::Absent.authorities().is_empty());
    }

    #[test]
    fn missing_exp_and_iss_still_decode() {
        let claims: TokenClaims = serde_json::from_value(json!({"sub": "user_123"})).unwrap();
        assert!(claims.exp.is_none());
        assert!(claims.iss.is_none());
    }

    #[test]
    fn missing_subject_decodes_but_builds_no_principal() {
        let claims: TokenClaims =
            serde_json::from_value(json!({"exp": 1, "iss": "x", "role": "admin"})).unwrap();
        assert!(claims.sub.is_none());
        assert_eq!(
            Principal::from_verified_claims(claims),
            Err(AuthError::MalformedToken)
        );
    }

    #[test]
    fn fractional_exp_is_floored() {
        let claims: TokenClaims =
            serde_json::from_value(json!({"sub": "u", "exp": 1700003600.75})).unwrap();
        assert_eq!(claims.exp, Some(1700003600));

        let claims: TokenClaims =
            serde_json::from_value(json!({"sub": "u", "exp": null})).unwrap();
        assert_eq!(claims.exp, None);
    }

    #[test]
    fn non_numeric_exp_fails_to_decode() {
        let result = serde_json::from_value::<TokenClaims>(json!({"sub": "u", "exp": "soon"}));
        assert!(result.is_err());
    }

    #[test]
    fn principal_from_claims() {
        let principal =
            Principal::from_verified_claims(claims_with(json!(["admin", "reviewer"]))).unwrap();
        assert_eq!(principal.subject, "user_123");
        assert!(principal.has_role("admin"));
        assert!(principal.has_role("REVIEWER"));
        assert!(!principal.has_role("auditor"));
    }

    #[test]
    fn principal_without_role_has_no_authorities() {
        let principal = Principal::from_verified_claims(claims_with(Value::Null)).unwrap();
        assert!(principal.authorities.is_empty());
    }
}
