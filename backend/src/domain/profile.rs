//! User identity and profile data model.
//!
//! A profile row exists for every authenticated user. The email address is
//! server-side only: it feeds the notification dispatcher and is never
//! rendered to other users' clients beyond the display name.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the identity constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileValidationError {
    /// The user id was empty or not a UUID.
    InvalidUserId,
    /// The display name was shorter than [`DISPLAY_NAME_MIN`] characters.
    DisplayNameTooShort,
    /// The display name was longer than [`DISPLAY_NAME_MAX`] characters.
    DisplayNameTooLong,
    /// The email address was empty or structurally invalid.
    InvalidEmail,
}

impl fmt::Display for ProfileValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUserId => write!(f, "user id must be a valid UUID"),
            Self::DisplayNameTooShort => {
                write!(f, "display name must be at least {DISPLAY_NAME_MIN} characters")
            }
            Self::DisplayNameTooLong => {
                write!(f, "display name must be at most {DISPLAY_NAME_MAX} characters")
            }
            Self::InvalidEmail => write!(f, "email address is not valid"),
        }
    }
}

impl std::error::Error for ProfileValidationError {}

/// Stable user identifier stored as a UUID.
///
/// The raw string form is retained so session cookies round-trip without
/// re-formatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ProfileValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Construct a [`UserId`] from an already-parsed UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id, id.to_string())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    fn from_owned(id: String) -> Result<Self, ProfileValidationError> {
        if id.is_empty() || id.trim() != id {
            return Err(ProfileValidationError::InvalidUserId);
        }
        let parsed = Uuid::parse_str(&id).map_err(|_| ProfileValidationError::InvalidUserId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = ProfileValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Minimum allowed length for a display name.
pub const DISPLAY_NAME_MIN: usize = 2;
/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 80;

/// Human readable display name shown next to a user's automations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a display name, trimming surrounding space.
    pub fn new(name: impl AsRef<str>) -> Result<Self, ProfileValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.chars().count() < DISPLAY_NAME_MIN {
            return Err(ProfileValidationError::DisplayNameTooShort);
        }
        if trimmed.chars().count() > DISPLAY_NAME_MAX {
            return Err(ProfileValidationError::DisplayNameTooLong);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Parse an optional form value: blank input clears the name.
    pub fn from_form_value(value: &str) -> Result<Option<Self>, ProfileValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Self::new(trimmed).map(Some)
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = ProfileValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Email address used exclusively for server-side dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an email address.
    ///
    /// Structural validation only: the authentication provider has already
    /// verified ownership, so a local part, an `@`, and a domain suffice.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ProfileValidationError> {
        let trimmed = value.as_ref().trim();
        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(ProfileValidationError::InvalidEmail);
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(ProfileValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = ProfileValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Stored profile row for an authenticated user.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Stable user identifier shared with the authentication provider.
    pub id: UserId,
    /// Optional display name shown next to the user's automations.
    pub name: Option<DisplayName>,
    /// Optional avatar image reference.
    pub avatar_url: Option<String>,
    /// Dispatch-only email address.
    pub email: EmailAddress,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Identity fields provided by the external authentication provider when a
/// session is established. Upserted into the profiles table on sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionIdentity {
    /// Stable user identifier.
    pub user_id: UserId,
    /// Verified email address.
    pub email: EmailAddress,
    /// Display name supplied by the provider, if any.
    pub name: Option<DisplayName>,
    /// Avatar reference supplied by the provider, if any.
    pub avatar_url: Option<String>,
}
