// SPDX-License-Identifier: MIT

//! Google OAuth client for the federated login handshake.
//!
//! Handles:
//! - Building the authorization redirect with an HMAC-signed state parameter
//! - Exchanging the authorization code for tokens
//! - Fetching and normalizing the userinfo profile

use crate::error::AppError;
use crate::models::FederatedProfile;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    token_url: String,
    userinfo_url: String,
    client_id: String,
    client_secret: String,
}

impl GoogleOAuthClient {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url: TOKEN_ENDPOINT.to_string(),
            userinfo_url: USERINFO_ENDPOINT.to_string(),
            client_id,
            client_secret,
        }
    }

    /// Build the provider authorization URL that starts the handshake.
    pub fn authorize_url(&self, callback_url: &str, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            AUTH_ENDPOINT,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(callback_url),
            urlencoding::encode("openid email profile"),
            state
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        callback_url: &str,
    ) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", callback_url),
            ])
            .send()
            .await
            .map_err(|e| AppError::Handshake(format!("token exchange request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Handshake(format!(
                "token exchange HTTP {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Handshake(format!("token response parse error: {}", e)))
    }

    /// Fetch the userinfo profile and normalize it into a federated identity.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<FederatedProfile, AppError> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Handshake(format!("userinfo request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Handshake(format!(
                "userinfo HTTP {}",
                response.status()
            )));
        }

        let raw: UserInfo = response
            .json()
            .await
            .map_err(|e| AppError::Handshake(format!("userinfo parse error: {}", e)))?;

        Ok(FederatedProfile {
            subject_id: raw.sub,
            display_name: raw.name.unwrap_or_else(|| "Google user".to_string()),
            email: raw.email,
        })
    }
}

/// Token response from the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Raw userinfo payload.
#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Create an HMAC-signed state parameter carrying the issue timestamp.
///
/// Format before encoding: `timestamp_hex|signature_hex`, base64url-encoded
/// as a whole for transport in the URL.
pub fn sign_state(secret: &[u8]) -> anyhow::Result<String> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("system time error: {}", e))?
        .as_millis();

    let payload = format!("{:x}", timestamp);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| anyhow::anyhow!("HMAC init failed: {}", e))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify the HMAC signature on a state parameter returned by the provider.
pub fn verify_state(state: &str, secret: &[u8]) -> bool {
    let Some(decoded) = URL_SAFE_NO_PAD
        .decode(state)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
    else {
        return false;
    };

    let parts: Vec<&str> = decoded.splitn(2, '|').collect();
    if parts.len() != 2 {
        return false;
    }
    let (payload, signature_hex) = (parts[0], parts[1]);

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    if signature_hex != expected {
        tracing::error!("OAuth state signature mismatch, possible tampering");
        return false;
    }
    true
}
