//! Request signature computation and verification.
//!
//! A client signs `base64(photo) || timestamp || secret` with SHA-256 and
//! sends the lowercase hex digest. Deployments that do not sign timestamps
//! use `base64(photo) || secret` and skip the freshness check.

use crate::config::AuthConfig;
use crate::error::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use sha2::{Digest, Sha256};

/// What a signature covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureMode {
    /// Photo and timestamp are signed; the timestamp must be within
    /// `tolerance_secs` of the server clock.
    WithTimestamp {
        /// Allowed clock skew in seconds.
        tolerance_secs: u64,
    },
    /// Only the photo is signed.
    PhotoOnly,
}

impl SignatureMode {
    /// Whether requests in this mode must carry a timestamp.
    pub const fn requires_timestamp(self) -> bool {
        matches!(self, Self::WithTimestamp { .. })
    }
}

/// Validates request authenticity and freshness against a shared secret.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    secret: String,
    mode: SignatureMode,
}

impl SignatureVerifier {
    /// Create a verifier for `secret` in the given mode.
    pub fn new(secret: impl Into<String>, mode: SignatureMode) -> Self {
        Self {
            secret: secret.into(),
            mode,
        }
    }

    /// Build a verifier from configuration.
    ///
    /// Returns `None` when authentication is disabled.
    pub fn from_config(auth: &AuthConfig) -> Result<Option<Self>> {
        if !auth.enabled {
            return Ok(None);
        }

        let secret = auth
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::ConfigValidation {
                message: "auth.secret is required when auth.enabled is true".to_string(),
            })?;

        let mode = if auth.with_timestamp {
            SignatureMode::WithTimestamp {
                tolerance_secs: auth.tolerance_secs,
            }
        } else {
            SignatureMode::PhotoOnly
        };

        Ok(Some(Self::new(secret, mode)))
    }

    /// Signing mode.
    pub const fn mode(&self) -> SignatureMode {
        self.mode
    }

    /// Signature a client must send for `photo` (and `timestamp` in
    /// timestamp mode).
    pub fn sign(&self, photo: &[u8], timestamp: Option<i64>) -> String {
        let timestamp = match self.mode {
            SignatureMode::WithTimestamp { .. } => timestamp,
            SignatureMode::PhotoOnly => None,
        };
        compute_signature(photo, timestamp, &self.secret)
    }

    /// Check a request against the signature and, in timestamp mode, the
    /// tolerance window around `now` (unix seconds).
    pub fn check(
        &self,
        photo: &[u8],
        timestamp: Option<i64>,
        signature: &str,
        now: i64,
    ) -> Result<()> {
        match self.mode {
            SignatureMode::WithTimestamp { tolerance_secs } => {
                let timestamp = timestamp.ok_or_else(|| Error::AuthenticationFailure {
                    reason: "missing timestamp".to_string(),
                })?;
                let expected = compute_signature(photo, Some(timestamp), &self.secret);
                if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
                    return Err(Error::AuthenticationFailure {
                        reason: "signature mismatch".to_string(),
                    });
                }
                let skew = timestamp.abs_diff(now);
                if skew > tolerance_secs {
                    return Err(Error::AuthenticationFailure {
                        reason: format!(
                            "timestamp {timestamp} is {skew}s from server time (tolerance {tolerance_secs}s)"
                        ),
                    });
                }
                Ok(())
            }
            SignatureMode::PhotoOnly => {
                let expected = compute_signature(photo, None, &self.secret);
                if constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
                    Ok(())
                } else {
                    Err(Error::AuthenticationFailure {
                        reason: "signature mismatch".to_string(),
                    })
                }
            }
        }
    }

    /// Boolean form of [`SignatureVerifier::check`].
    pub fn verify(&self, photo: &[u8], timestamp: Option<i64>, signature: &str, now: i64) -> bool {
        self.check(photo, timestamp, signature, now).is_ok()
    }
}

/// Lowercase hex SHA-256 of `base64(photo) || timestamp || secret`, with the
/// timestamp segment omitted when `timestamp` is `None`.
pub fn compute_signature(photo: &[u8], timestamp: Option<i64>, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(BASE64.encode(photo).as_bytes());
    if let Some(ts) = timestamp {
        hasher.update(ts.to_string().as_bytes());
    }
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Verify a timestamped signature against the current clock.
pub fn verify(
    photo: &[u8],
    timestamp: i64,
    signature: &str,
    secret: &str,
    tolerance_secs: u64,
) -> bool {
    SignatureVerifier::new(secret, SignatureMode::WithTimestamp { tolerance_secs }).verify(
        photo,
        Some(timestamp),
        signature,
        chrono::Utc::now().timestamp(),
    )
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
