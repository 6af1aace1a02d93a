//! Invite token generation and the shareable-link marker encoding.
//!
//! Possession of a token is the sole proof of authorization to accept an
//! invite, so tokens are minted from OS randomness with no caller-derived
//! input: nothing about the workspace, inviter, or clock is mixed in.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::types::InviteTarget;

/// Random bytes behind a generated invite token (~144 bits of entropy).
pub const DEFAULT_TOKEN_BYTES: usize = 18;

/// Prefix marking a stored shareable-link invite.
pub(crate) const LINK_MARKER_PREFIX: &str = "link::";
/// Separator between the guest name and the random suffix of a marker.
const LINK_MARKER_SEPARATOR: &str = "::";
/// Random bytes behind a marker suffix (hex-encoded on storage).
const LINK_MARKER_SUFFIX_BYTES: usize = 6;

/// An opaque invite token.
///
/// `Debug` and `Display` are redacted, and invite records skip the field
/// when serialized, so a token reaches the outside world only through the
/// acceptance URL built for it. Use [`InviteToken::expose_secret`] for
/// storage binds and URL construction.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct InviteToken(String);

impl InviteToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw token value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// A short prefix for log lines; never log the full token.
    pub fn fragment(&self) -> String {
        token_fragment(&self.0)
    }
}

impl std::fmt::Debug for InviteToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InviteToken(\"[REDACTED]\")")
    }
}

impl std::fmt::Display for InviteToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Serialize for InviteToken {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl From<String> for InviteToken {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for InviteToken {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

/// First characters of a token followed by an ellipsis, for log lines.
pub fn token_fragment(token: &str) -> String {
    let prefix: String = token.chars().take(6).collect();
    format!("{prefix}...")
}

/// Mints a URL-safe invite token from [`DEFAULT_TOKEN_BYTES`] of OS randomness.
pub fn generate_invite_token() -> InviteToken {
    generate_invite_token_with(DEFAULT_TOKEN_BYTES)
}

/// Mints a URL-safe invite token from `byte_len` random bytes.
///
/// The output is unpadded base64url, safe to embed in a path segment.
pub fn generate_invite_token_with(byte_len: usize) -> InviteToken {
    let mut bytes = vec![0u8; byte_len];
    OsRng.fill_bytes(&mut bytes);
    InviteToken::new(URL_SAFE_NO_PAD.encode(bytes))
}

/// Strips the marker delimiter from a guest name and collapses whitespace.
pub(crate) fn sanitize_guest_name(name: &str) -> String {
    let stripped = name.replace(':', "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Encodes an invite target into the single stored `email` column.
///
/// Email targets are stored verbatim. Link targets become
/// `link::<guest-name>::<random-suffix>`; the fresh suffix keeps repeated
/// links for the same guest name from colliding on the (workspace, email)
/// uniqueness constraint.
pub fn encode_target(target: &InviteTarget) -> String {
    match target {
        InviteTarget::Email { address } => address.clone(),
        InviteTarget::ShareableLink { guest_name } => {
            let name = sanitize_guest_name(guest_name);
            let mut suffix = [0u8; LINK_MARKER_SUFFIX_BYTES];
            OsRng.fill_bytes(&mut suffix);
            format!(
                "{LINK_MARKER_PREFIX}{name}{LINK_MARKER_SEPARATOR}{}",
                hex::encode(suffix)
            )
        }
    }
}

/// Decodes a stored `email` column back into an invite target.
///
/// Anything carrying the link marker prefix is a shareable link; the random
/// suffix exists only for storage uniqueness and is dropped here.
pub fn decode_target(stored: &str) -> InviteTarget {
    match stored.strip_prefix(LINK_MARKER_PREFIX) {
        Some(rest) => {
            let guest_name = rest
                .rsplit_once(LINK_MARKER_SEPARATOR)
                .map_or(rest, |(name, _suffix)| name);
            InviteTarget::ShareableLink {
                guest_name: guest_name.to_owned(),
            }
        }
        None => InviteTarget::Email {
            address: stored.to_owned(),
        },
    }
}

/// Computes an invite expiry `validity` from now.
///
/// The default validity is roughly a century: invites behave as permanent
/// capabilities until explicitly cancelled, and acceptance never checks this
/// timestamp. The column is kept for record-shape interoperability.
pub fn compute_expiry(validity: Duration) -> DateTime<Utc> {
    Utc::now() + validity
}
