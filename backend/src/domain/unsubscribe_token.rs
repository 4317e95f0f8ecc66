//! Keyed tokens for one-click email unsubscribe links.
//!
//! Each unsubscribe link embeds an HMAC-SHA256 over
//! `"{subscription_id}:{category}"`, hex-encoded, so the endpoint can
//! authorise the request without a signed-in session. Tokens carry no
//! expiry: unsubscribing is idempotent and low-stakes, so a stale link
//! deactivating an already-inactive subscription is harmless.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::subscription::{SubscriptionCategory, SubscriptionId};

type HmacSha256 = Hmac<Sha256>;

/// Server-held signing secret, zeroised on drop.
pub struct SigningSecret(Zeroizing<Vec<u8>>);

impl SigningSecret {
    /// Wrap raw secret bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret(..)")
    }
}

/// Errors raised when minting unsubscribe tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnsubscribeTokenError {
    /// No signing secret is configured.
    #[error("unsubscribe signing secret is not configured")]
    Unconfigured,
    /// The configured secret was rejected as an HMAC key.
    #[error("unsubscribe signing secret rejected: {message}")]
    InvalidKey {
        /// Underlying rejection message.
        message: String,
    },
}

/// Mints and verifies unsubscribe tokens.
///
/// Verification fails closed: an unconfigured secret, malformed hex, or a
/// length mismatch all yield `false` rather than an error escaping to the
/// caller.
pub struct UnsubscribeTokenService {
    secret: Option<SigningSecret>,
}

impl UnsubscribeTokenService {
    /// Create a service with the given secret, or an unconfigured one.
    pub fn new(secret: Option<SigningSecret>) -> Self {
        Self { secret }
    }

    /// Deterministically derive the hex token for one subscription link.
    ///
    /// # Errors
    ///
    /// Returns [`UnsubscribeTokenError::Unconfigured`] when no secret is
    /// present.
    pub fn create_token(
        &self,
        subscription_id: &SubscriptionId,
        category: SubscriptionCategory,
    ) -> Result<String, UnsubscribeTokenError> {
        let secret = self
            .secret
            .as_ref()
            .ok_or(UnsubscribeTokenError::Unconfigured)?;
        mac_bytes(secret, subscription_id, category).map(hex::encode)
    }

    /// Verify a presented token against the expected MAC.
    ///
    /// Comparison happens over the decoded bytes in constant time. Any
    /// malformed input or missing configuration verifies as `false`.
    pub fn verify_token(
        &self,
        subscription_id: &SubscriptionId,
        category: SubscriptionCategory,
        token: &str,
    ) -> bool {
        let Some(secret) = self.secret.as_ref() else {
            return false;
        };
        if token.is_empty() {
            return false;
        }
        let Ok(presented) = hex::decode(token) else {
            return false;
        };
        let Ok(expected) = mac_bytes(secret, subscription_id, category) else {
            return false;
        };
        presented.len() == expected.len() && bool::from(presented.ct_eq(&expected))
    }
}

fn mac_bytes(
    secret: &SigningSecret,
    subscription_id: &SubscriptionId,
    category: SubscriptionCategory,
) -> Result<Vec<u8>, UnsubscribeTokenError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|err| {
        UnsubscribeTokenError::InvalidKey {
            message: err.to_string(),
        }
    })?;
    mac.update(format!("{subscription_id}:{category}").as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}
