//! Signed identity tokens.
//!
//! The identity provider signs `user_id || valid_until (rfc3339)` with its
//! Ed25519 key; the API verifies the signature against the issuer's public
//! key before trusting the user id carried in a bearer credential.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityToken {
    pub user_id: String,
    pub valid_until: DateTime<Utc>,
    /// Hex-encoded Ed25519 signature.
    pub signature: String,
}

impl IdentityToken {
    pub fn issue(user_id: &str, valid_until: DateTime<Utc>, issuer: &SigningKey) -> Self {
        let signature = issuer.sign(&signing_payload(user_id, &valid_until));
        Self {
            user_id: user_id.to_string(),
            valid_until,
            signature: hex::encode(signature.to_bytes()),
        }
    }

    /// Encode as the opaque string carried after `Bearer `.
    pub fn to_bearer(&self) -> String {
        // Serializing a struct of strings cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    pub fn from_bearer(raw: &str) -> Result<Self, TokenError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(raw.trim())
            .map_err(|_| TokenError::Malformed)?;
        serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
    }

    /// Check expiry and signature. Returns the verified user id.
    pub fn verify(&self, issuer_pubkey: &[u8; 32]) -> Result<&str, TokenError> {
        if Utc::now() > self.valid_until {
            return Err(TokenError::Expired);
        }

        let verifying_key =
            VerifyingKey::from_bytes(issuer_pubkey).map_err(|_| TokenError::InvalidIssuerKey)?;

        let sig_bytes = hex::decode(&self.signature).map_err(|_| TokenError::Malformed)?;
        let signature = Signature::from_slice(&sig_bytes).map_err(|_| TokenError::Malformed)?;

        verifying_key
            .verify(&signing_payload(&self.user_id, &self.valid_until), &signature)
            .map_err(|_| TokenError::BadSignature)?;

        Ok(&self.user_id)
    }
}

// payload = user_id || valid_until (rfc3339)
fn signing_payload(user_id: &str, valid_until: &DateTime<Utc>) -> Vec<u8> {
    let mut payload = Vec::with_capacity(user_id.len() + 32);
    payload.extend_from_slice(user_id.as_bytes());
    payload.extend_from_slice(valid_until.to_rfc3339().as_bytes());
    payload
}
