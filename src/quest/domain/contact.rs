//! Contact identity and the recipient capability shared by guild members.

use super::GuildDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform and handle pair identifying a member on a messaging platform.
///
/// The pair is unique across all registered members. Platform names are
/// normalised to lowercase; handles are kept verbatim apart from trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactHandle {
    platform: String,
    handle: String,
}

impl ContactHandle {
    /// Creates a validated contact handle.
    ///
    /// # Errors
    ///
    /// Returns [`GuildDomainError::EmptyPlatform`] or
    /// [`GuildDomainError::EmptyHandle`] when either part is blank.
    pub fn new(
        platform: impl Into<String>,
        handle: impl Into<String>,
    ) -> Result<Self, GuildDomainError> {
        let raw_platform = platform.into();
        let raw_handle = handle.into();
        let normalized_platform = raw_platform.trim().to_ascii_lowercase();
        let normalized_handle = raw_handle.trim();

        if normalized_platform.is_empty() {
            return Err(GuildDomainError::EmptyPlatform);
        }
        if normalized_handle.is_empty() {
            return Err(GuildDomainError::EmptyHandle);
        }

        Ok(Self {
            platform: normalized_platform,
            handle: normalized_handle.to_owned(),
        })
    }

    /// Returns the platform name.
    #[must_use]
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Returns the platform-specific handle.
    #[must_use]
    pub fn handle(&self) -> &str {
        &self.handle
    }
}

impl fmt::Display for ContactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.platform, self.handle)
    }
}

/// Non-empty human-readable member name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    /// Creates a validated display name.
    ///
    /// # Errors
    ///
    /// Returns [`GuildDomainError::EmptyDisplayName`] when the name is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, GuildDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GuildDomainError::EmptyDisplayName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anything that can receive an out-of-band notification.
///
/// Both fulfillers and requesters implement this; the notification gateway
/// turns the contact handle into a platform-specific address.
pub trait Recipient {
    /// Returns the member's contact handle.
    fn contact(&self) -> &ContactHandle;

    /// Returns the member's display name.
    fn display_name(&self) -> &DisplayName;

    /// Captures the recipient as an owned notification target.
    fn notification_target(&self) -> NotificationTarget {
        NotificationTarget {
            contact: self.contact().clone(),
            display_name: self.display_name().clone(),
        }
    }
}

/// Owned recipient snapshot handed to the notification gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationTarget {
    /// Where to deliver.
    pub contact: ContactHandle,
    /// Who is being addressed.
    pub display_name: DisplayName,
}

impl Recipient for NotificationTarget {
    fn contact(&self) -> &ContactHandle {
        &self.contact
    }

    fn display_name(&self) -> &DisplayName {
        &self.display_name
    }
}
