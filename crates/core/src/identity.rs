//! Authenticated identity consumed by the household core.
//!
//! The identity provider itself lives outside this crate; resolution only
//! ever sees this value.

use serde::{Deserialize, Serialize};

/// The signed-in identity for the current session.
///
/// Immutable for the lifetime of a session; replaced wholesale on
/// sign-in/sign-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Stable unique id assigned by the identity provider.
    pub uid: String,
    pub email: String,
    pub display_name: String,
}

impl Identity {
    pub fn new(
        uid: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            display_name: display_name.into(),
        }
    }

    /// Normalized email used for invite matching.
    pub fn email_lower(&self) -> String {
        self.email.trim().to_lowercase()
    }

    /// Human-readable label: display name when set, otherwise the email.
    pub fn label(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.email
        } else {
            &self.display_name
        }
    }
}
