//! Slack request signature verification (`v0` scheme).
//!
//! Every Events API delivery carries `X-Slack-Request-Timestamp` and
//! `X-Slack-Signature: v0=<hex>`, where the digest is
//! `HMAC-SHA256(signing_secret, "v0:{timestamp}:{body}")`. Deliveries older
//! than the configured tolerance are rejected to block replays.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{AppError, Result};

/// Header carrying the request timestamp (unix seconds).
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
/// Header carrying the `v0=` signature.
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

const VERSION: &str = "v0";

type HmacSha256 = Hmac<Sha256>;

/// Verifies inbound request signatures against the app's signing secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
    tolerance_seconds: u64,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("tolerance_seconds", &self.tolerance_seconds)
            .finish_non_exhaustive()
    }
}

impl SignatureVerifier {
    /// Create a verifier accepting requests at most `tolerance_seconds` old.
    #[must_use]
    pub fn new(secret: impl Into<String>, tolerance_seconds: u64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_seconds,
        }
    }

    /// Compute the `v0=<hex>` signature for `body` sent at `timestamp`.
    #[must_use]
    pub fn sign(&self, timestamp: i64, body: &[u8]) -> String {
        let mac = self.digest(&timestamp.to_string(), body);
        format!("{VERSION}={}", hex::encode(mac.finalize().into_bytes()))
    }

    /// Check the timestamp and signature headers of a request.
    ///
    /// `now` is the current unix time in seconds.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` if either header is missing or
    /// malformed, the timestamp is outside the tolerance window, or the
    /// signature does not match.
    pub fn verify(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &[u8],
        now: i64,
    ) -> Result<()> {
        let timestamp = timestamp
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("missing request timestamp".into()))?;
        let signature = signature
            .map(str::trim)
            .ok_or_else(|| AppError::Unauthorized("missing request signature".into()))?;

        let sent_at: i64 = timestamp
            .parse()
            .map_err(|_| AppError::Unauthorized(format!("invalid request timestamp {timestamp}")))?;
        if sent_at.abs_diff(now) > self.tolerance_seconds {
            return Err(AppError::Unauthorized(format!(
                "request timestamp {sent_at} outside tolerance window"
            )));
        }

        let digest_hex = signature
            .strip_prefix("v0=")
            .ok_or_else(|| AppError::Unauthorized("signature must use v0=<hex> format".into()))?;
        let expected = hex::decode(digest_hex)
            .map_err(|err| AppError::Unauthorized(format!("signature is not hex: {err}")))?;

        self.digest(timestamp, body)
            .verify_slice(&expected)
            .map_err(|_| AppError::Unauthorized("signature mismatch".into()))
    }

    fn digest(&self, timestamp: &str, body: &[u8]) -> HmacSha256 {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.secret.as_bytes())
            .unwrap_or_else(|_| unreachable!("hmac accepts keys of any length"));
        mac.update(VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body);
        mac
    }
}
