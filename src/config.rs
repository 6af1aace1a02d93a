//! Configuration for the membership and invitation library.
//!
//! # Example
//!
//! ```rust
//! use anteroom::config::AnteroomConfig;
//!
//! // Use defaults (base URL http://localhost:3000, no member cap)
//! let config = AnteroomConfig::default();
//!
//! // Or customize
//! let config = AnteroomConfig {
//!     app_base_url: "https://app.example.com".to_owned(),
//!     max_members_per_workspace: Some(5),
//!     ..Default::default()
//! };
//! ```

use chrono::Duration;

use crate::token::DEFAULT_TOKEN_BYTES;
use crate::types::InviteRole;

/// `/invite/accept?token=` percent-encoded for embedding in a query value.
/// Token characters are URL-safe base64 and need no further encoding.
const ENCODED_ACCEPT_PATH: &str = "%2Finvite%2Faccept%3Ftoken%3D";

/// Configuration shared by invitation and membership operations.
#[derive(Debug, Clone)]
pub struct AnteroomConfig {
    /// Base URL of the host application, used to build acceptance links.
    ///
    /// Default: `http://localhost:3000`
    pub app_base_url: String,

    /// Random bytes behind each generated invite token.
    ///
    /// Default: 18 (~144 bits of entropy; do not go below it).
    pub token_bytes: usize,

    /// How long invites remain valid.
    ///
    /// Default: ~100 years. Invites are effectively permanent capabilities
    /// until cancelled; acceptance never rejects on expiry. This mirrors
    /// the product decision the library was extracted from; shorten it only
    /// together with an enforcement policy of your own.
    pub invite_expiry: Duration,

    /// Role granted by shareable links when the caller does not pick one.
    ///
    /// Default: [`InviteRole::Editor`]
    pub default_link_role: InviteRole,

    /// Member cap per workspace, counting accepted members and, at invite
    /// creation, pending invites. `None` disables the check.
    ///
    /// Default: `None`
    pub max_members_per_workspace: Option<u32>,

    /// Display name used when the directory cannot resolve one.
    ///
    /// Default: `"Member"`
    pub placeholder_display_name: String,
}

impl Default for AnteroomConfig {
    fn default() -> Self {
        Self {
            app_base_url: "http://localhost:3000".to_owned(),
            token_bytes: DEFAULT_TOKEN_BYTES,
            invite_expiry: Duration::days(36_500),
            default_link_role: InviteRole::Editor,
            max_members_per_workspace: None,
            placeholder_display_name: "Member".to_owned(),
        }
    }
}

impl AnteroomConfig {
    /// Creates a configuration with the given application base URL.
    pub fn new(app_base_url: impl Into<String>) -> Self {
        Self {
            app_base_url: app_base_url.into(),
            ..Self::default()
        }
    }

    /// Creates a configuration with a per-workspace member cap.
    pub fn capped(app_base_url: impl Into<String>, max_members: u32) -> Self {
        Self {
            app_base_url: app_base_url.into(),
            max_members_per_workspace: Some(max_members),
            ..Self::default()
        }
    }

    fn base(&self) -> &str {
        self.app_base_url.trim_end_matches('/')
    }

    /// The short acceptance URL distributed in emails and links:
    /// `{app_base_url}/i/{token}`.
    pub fn invite_url(&self, token: &str) -> String {
        format!("{}/i/{token}", self.base())
    }

    /// The acceptance page URL: `{app_base_url}/invite/accept?token=...`.
    pub fn accept_page_url(&self, token: &str) -> String {
        format!("{}/invite/accept?token={token}", self.base())
    }

    /// Login URL that round-trips the token through sign-in, so an
    /// unauthenticated invitee can re-enter acceptance with a session.
    pub fn login_redirect_url(&self, token: &str) -> String {
        format!("{}/login?redirect={ENCODED_ACCEPT_PATH}{token}", self.base())
    }
}
