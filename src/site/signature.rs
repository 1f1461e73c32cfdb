//! HMAC-SHA256 signing of site submissions.
//!
//! The signed message binds every field the site stores, including the
//! digests of both uploaded files:
//!
//! ```text
//! timestamp \n title \n video_url \n audio_url \n tags \n sha256(audio) \n sha256(image)
//! ```
//!
//! Signatures travel as `sha256=<hex>`.

use crate::error::SubmissionError;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Fields covered by a submission signature.
#[derive(Debug, Clone, Copy)]
pub struct SignedFields<'a> {
    pub timestamp: &'a str,
    pub title: &'a str,
    pub video_url: &'a str,
    pub audio_url: &'a str,
    /// Raw tag string; empty when the request had none.
    pub tags: &'a str,
    pub audio: &'a [u8],
    pub image: &'a [u8],
}

impl SignedFields<'_> {
    fn message(&self) -> String {
        let audio_digest = hex::encode(Sha256::digest(self.audio));
        let image_digest = hex::encode(Sha256::digest(self.image));
        [
            self.timestamp,
            self.title,
            self.video_url,
            self.audio_url,
            self.tags,
            audio_digest.as_str(),
            image_digest.as_str(),
        ]
        .join("\n")
    }
}

/// Sign `fields` with `secret`, producing a `sha256=<hex>` header value.
pub fn sign_submission(secret: &str, fields: &SignedFields<'_>) -> Result<String, SubmissionError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SubmissionError::InvalidKey)?;
    mac.update(fields.message().as_bytes());
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// Verify a submission signature
pub fn verify_signature(secret: &str, fields: &SignedFields<'_>, signature: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };

    mac.update(fields.message().as_bytes());

    // Signature format: sha256=<hex>
    let expected_sig = signature.strip_prefix("sha256=").unwrap_or(signature);

    let expected_bytes = match hex::decode(expected_sig) {
        Ok(b) => b,
        Err(_) => return false,
    };

    mac.verify_slice(&expected_bytes).is_ok()
}

/// Generate a random signing secret
pub fn generate_secret() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}
