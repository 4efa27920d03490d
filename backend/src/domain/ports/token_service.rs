//! Port for issuing and validating bearer tokens.

use crate::domain::Identity;

/// Why a presented token was not accepted.
///
/// Expired and invalid are deliberately distinct: clients treat expiry as
/// "log in again" while an invalid token points at a malformed or tampered
/// credential worth logging differently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Structurally valid and correctly signed, but past its expiry.
    #[error("token expired")]
    Expired,
    /// Malformed, tampered with, or signed with the wrong key.
    #[error("invalid token")]
    Invalid,
}

/// Mint and verify the signed identity snapshots clients hold.
///
/// Implementations are synchronous: signing and verification are pure CPU
/// work with no I/O.
pub trait TokenService: Send + Sync {
    /// Issue a token embedding the identity with a renewed validity window.
    fn issue(&self, identity: &Identity) -> Result<String, crate::domain::Error>;

    /// Verify a token and recover the embedded identity snapshot.
    fn validate(&self, token: &str) -> Result<Identity, TokenError>;
}
