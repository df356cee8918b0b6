//! Caller identity from the `Authorization: Bearer` header.
//!
//! With an issuer key configured the bearer value must be a signed
//! [`IdentityToken`] and every identity-checked route needs one. Without a
//! key the value is taken as the user id as-is, which is only suitable
//! behind a trusted gateway.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use sociate_shared::identity::IdentityToken;

use crate::api::AppState;
use crate::error::ApiError;

/// Resolves bearer values to user ids.
#[derive(Debug, Clone)]
pub struct IdentityVerifier {
    issuer_pubkey: Option<[u8; 32]>,
    require_auth: bool,
}

impl IdentityVerifier {
    pub fn new(issuer_pubkey: Option<[u8; 32]>, require_auth: bool) -> Self {
        Self {
            issuer_pubkey,
            require_auth,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.issuer_pubkey.is_some()
    }

    /// Anonymous callers are turned away in verified mode as well as when
    /// `REQUIRE_AUTH` is set.
    pub fn identity_required(&self) -> bool {
        self.require_auth || self.is_verified()
    }

    /// Turn a bearer value into the caller's user id.
    pub fn resolve(&self, bearer: &str) -> Result<String, ApiError> {
        let bearer = bearer.trim();
        if bearer.is_empty() {
            return Err(ApiError::Unauthorized("Empty bearer token".into()));
        }

        let Some(issuer) = self.issuer_pubkey else {
            return Ok(bearer.to_string());
        };

        let token = IdentityToken::from_bearer(bearer)
            .map_err(|e| ApiError::Unauthorized(e.to_string()))?;
        match token.verify(&issuer) {
            Ok(user_id) => Ok(user_id.to_string()),
            Err(e) => {
                tracing::warn!(user = %token.user_id, error = %e, "rejected identity token");
                Err(ApiError::Unauthorized(e.to_string()))
            }
        }
    }
}

/// The authenticated caller, if the request carried a bearer credential.
#[derive(Debug, Clone)]
pub struct Caller {
    user_id: Option<String>,
    required: bool,
}

impl Caller {
    /// Check that the caller may act as `acting_id`.
    pub fn authorize(&self, acting_id: &str) -> Result<(), ApiError> {
        self.authorize_any(&[acting_id])
    }

    /// Check that the caller is one of `candidates` (e.g. either participant
    /// of a conversation).
    pub fn authorize_any(&self, candidates: &[&str]) -> Result<(), ApiError> {
        match &self.user_id {
            Some(id) if candidates.contains(&id.as_str()) => Ok(()),
            Some(_) => Err(ApiError::Forbidden(
                "Cannot act on behalf of another user".into(),
            )),
            None if self.required => Err(ApiError::Unauthorized("Authentication required".into())),
            None => Ok(()),
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let required = state.identity.identity_required();

        let Some(value) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Caller {
                user_id: None,
                required,
            });
        };

        let raw = value
            .to_str()
            .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".into()))?;
        let bearer = raw
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Expected a Bearer credential".into()))?;

        let user_id = state.identity.resolve(bearer)?;
        Ok(Caller {
            user_id: Some(user_id),
            required,
        })
    }
}
