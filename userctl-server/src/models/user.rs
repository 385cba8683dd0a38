//! User record and its validated inputs
//!
//! `UserCandidate` is the raw shape accepted at the HTTP boundary.
//! `NewUser` is what the store is allowed to see: both fields non-blank
//! and bounded, kept exactly as submitted.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Maximum length for names and emails (default VARCHAR width)
pub const MAX_FIELD_LEN: usize = 255;

/// Optional minus sign followed by ASCII digits, nothing else
static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+$").expect("invalid id regex"));

/// Persisted user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Unvalidated create request.
///
/// Fields are optional so that a missing key surfaces as a validation
/// error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserCandidate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserCandidate {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
        }
    }

    /// Validate both fields, name first.
    pub fn validate(&self) -> Result<NewUser, ValidationError> {
        let name = UserName::new(self.name.as_deref().unwrap_or_default())?;
        let email = Email::new(self.email.as_deref().unwrap_or_default())?;
        Ok(NewUser { name, email })
    }
}

/// Validated insert payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: UserName,
    pub email: Email,
}

/// Validated display name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserName(String);

impl UserName {
    /// Create a user name. Whitespace-only input counts as empty, but
    /// the stored value is the input unchanged.
    ///
    /// # Example
    /// ```
    /// use userctl_server::models::UserName;
    ///
    /// assert_eq!(UserName::new("  Ann ").unwrap().as_str(), "  Ann ");
    /// assert!(UserName::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded("name", s)?;
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated email address.
///
/// Stored as given. Uniqueness is decided on [`Email::key`], so
/// `Ann@X.com` and ` ann@x.com` are the same address. Case folding is
/// ASCII-only; `lower(... COLLATE "C")` in the unique index folds the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded("email", s)?;
        let trimmed = trim_ascii_whitespace(s);

        if trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must not contain whitespace",
            });
        }

        let mut parts = trimmed.split('@');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
        );
        if !well_formed {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must be of the form local@domain",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Folded form used for uniqueness.
    pub fn key(&self) -> String {
        email_key(&self.0)
    }
}

/// Uniqueness key for a stored email: surrounding ASCII whitespace
/// dropped, ASCII letters lowercased. Mirrors the `user_email_ci_key` index.
pub fn email_key(email: &str) -> String {
    trim_ascii_whitespace(email).to_ascii_lowercase()
}

fn trim_ascii_whitespace(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace())
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Positive user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Result<Self, ValidationError> {
        if id <= 0 {
            return Err(ValidationError::NotPositive {
                field: "id",
                value: id,
            });
        }
        Ok(Self(id))
    }

    /// Parse a path segment. Only `-?[0-9]+` that fits an `i64` gets as
    /// far as the positivity check; `+1`, ` 1` and `1.0` do not.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let not_integer = ValidationError::InvalidFormat {
            field: "id",
            reason: "must be an integer",
        };

        if !ID_RE.is_match(raw) {
            return Err(not_integer);
        }
        let id = raw.parse::<i64>().map_err(|_| not_integer)?;
        Self::new(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

/// Blank check on the trimmed value, length check on the stored one.
fn bounded(field: &'static str, s: &str) -> Result<(), ValidationError> {
    if s.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }

    if s.chars().count() > MAX_FIELD_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_FIELD_LEN,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_keeps_input_verbatim() {
        let new_user = UserCandidate::new(" Ann ", " ann@x.com").validate().unwrap();
        assert_eq!(new_user.name.as_str(), " Ann ");
        assert_eq!(new_user.email.as_str(), " ann@x.com");
    }

    #[test]
    fn missing_fields_are_empty() {
        let err = UserCandidate::default().validate().unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "name" });

        let err = UserCandidate {
            name: Some("Ann".into()),
            email: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "email" });
    }

    #[test]
    fn rejects_blank_name() {
        let err = UserName::new(" \t").unwrap_err();
        assert!(matches!(err, ValidationError::Empty { field: "name" }));
    }

    #[test]
    fn max_length() {
        let name_255 = "a".repeat(255);
        assert!(UserName::new(&name_255).is_ok());

        let name_256 = "a".repeat(256);
        let err = UserName::new(&name_256).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 255, .. }));

        // Surrounding whitespace is stored, so it counts
        let padded = format!(" {}", "a".repeat(255));
        assert!(UserName::new(&padded).is_err());
    }

    #[test]
    fn email_format() {
        assert!(Email::new("ann@x.com").is_ok());
        assert!(Email::new("a@b").is_ok());
        assert_eq!(Email::new("ann@x.com ").unwrap().as_str(), "ann@x.com ");

        for bad in ["ann", "@x.com", "ann@", "a@b@c", "an n@x.com", "\u{a0}ann@x.com"] {
            let err = Email::new(bad).unwrap_err();
            assert!(
                matches!(err, ValidationError::InvalidFormat { field: "email", .. }),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn email_key_is_case_folded() {
        let email = Email::new("Ann@X.com").unwrap();
        assert_eq!(email.as_str(), "Ann@X.com");
        assert_eq!(email.key(), "ann@x.com");

        assert_eq!(Email::new(" ann@x.com\t").unwrap().key(), "ann@x.com");
    }

    #[test]
    fn email_key_folds_ascii_only() {
        let email = Email::new("ÄNN@X.com").unwrap();
        assert_eq!(email.key(), "Änn@x.com");
    }

    #[test]
    fn user_id_parsing() {
        assert_eq!(UserId::parse("1").unwrap().get(), 1);
        assert!(matches!(
            UserId::parse("abc").unwrap_err(),
            ValidationError::InvalidFormat { field: "id", .. }
        ));
        assert!(matches!(
            UserId::parse("1.5").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
        assert!(matches!(
            UserId::parse("99999999999999999999").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
        for bad in ["+1", " 1", "1 ", "", "-", "١"] {
            assert!(
                matches!(
                    UserId::parse(bad).unwrap_err(),
                    ValidationError::InvalidFormat { field: "id", .. }
                ),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(
            UserId::parse("0").unwrap_err(),
            ValidationError::NotPositive { field: "id", value: 0 }
        );
        assert_eq!(
            UserId::parse("-4").unwrap_err(),
            ValidationError::NotPositive { field: "id", value: -4 }
        );
    }

    #[test]
    fn user_serializes_camel_case() {
        let user = User {
            id: 1,
            name: "Ann".into(),
            email: "ann@x.com".into(),
            created_at: DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["createdAt"], "2024-01-02T03:04:05Z");
        assert!(json.get("created_at").is_none());
    }
}
