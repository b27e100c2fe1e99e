//! HMAC-signed bearer tokens
//!
//! A token is `base64url(claims json) "." hex(hmac_sha256(secret, payload))`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::config::Settings;
use crate::{RecapError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Decoded token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Email of the account the token was issued for
    pub email: String,

    /// Expiry as Unix seconds
    pub exp: i64,
}

/// Issues and verifies bearer tokens with a shared secret
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_secs: u64) -> Result<Self> {
        if secret.trim().is_empty() {
            return Err(RecapError::Config(format!(
                "Token secret is missing. Set auth.token_secret in config or {}.",
                crate::config::TOKEN_SECRET_ENV
            )));
        }

        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| RecapError::Config("auth.token_ttl_secs is too large".to_string()))?;

        Ok(Self {
            secret: secret.as_bytes().to_vec(),
            ttl,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.auth.token_secret, settings.auth.token_ttl_secs)
    }

    /// Issue a token for `email` valid for the configured lifetime
    pub fn issue(&self, email: &str) -> Result<String> {
        let expires = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| RecapError::Auth("Token expiry is out of range".to_string()))?;
        let claims = Claims {
            email: email.trim().to_lowercase(),
            exp: expires.timestamp(),
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims
    pub fn sign(&self, claims: &Claims) -> Result<String> {
        let json = serde_json::to_vec(claims)
            .map_err(|e| RecapError::Auth(format!("Failed to encode claims: {}", e)))?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = hex::encode(self.mac(payload.as_bytes())?.finalize().into_bytes());

        Ok(format!("{}.{}", payload, signature))
    }

    /// Verify a token's signature and expiry, returning its claims
    pub fn verify(&self, token: &str) -> Option<Claims> {
        self.verify_at(token, Utc::now().timestamp())
    }

    fn verify_at(&self, token: &str, now: i64) -> Option<Claims> {
        let (payload, signature) = token.trim().split_once('.')?;
        let signature = hex::decode(signature).ok()?;

        self.mac(payload.as_bytes())
            .ok()?
            .verify_slice(&signature)
            .ok()?;

        let json = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let claims: Claims = serde_json::from_slice(&json).ok()?;

        if claims.exp <= now || claims.email.is_empty() {
            return None;
        }

        Some(claims)
    }

    fn mac(&self, payload: &[u8]) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| RecapError::Auth(format!("Invalid token secret: {}", e)))?;
        mac.update(payload);
        Ok(mac)
    }
}
