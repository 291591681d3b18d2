// SPDX-License-Identifier: MIT

//! Credential issuance and verification.
//!
//! Locally issued credentials are HS256 JWTs carrying the account's subject
//! id, username, and role, valid for exactly 24 hours. Verification is pure:
//! it touches no store and any failure means "unauthenticated", never a
//! partial identity.

use crate::models::{Account, LocalIdentity, Role};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Credential lifetime. The `exp = iat + 24h` invariant is checked again at
/// verification time, so a token with a forged longer lifetime is rejected
/// even if its signature is valid.
pub const CREDENTIAL_TTL_SECS: u64 = 24 * 60 * 60;

/// Claims carried by a signed credential.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account id)
    pub sub: String,
    pub username: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Why a credential failed verification. Both outcomes are treated as
/// "unauthenticated" by callers; the distinction exists for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationError {
    Expired,
    Malformed,
}

impl std::fmt::Display for VerificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationError::Expired => f.write_str("credential expired"),
            VerificationError::Malformed => f.write_str("credential malformed"),
        }
    }
}

/// Issue a signed credential for a verified account.
pub fn issue_credential(account: &Account, signing_key: &[u8]) -> anyhow::Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    let claims = Claims {
        sub: account.subject_id.clone(),
        username: account.username.clone(),
        role: account.role,
        iat: now,
        exp: now + CREDENTIAL_TTL_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Verify a credential and extract the identity it carries.
pub fn verify_credential(
    token: &str,
    signing_key: &[u8],
) -> Result<LocalIdentity, VerificationError> {
    // Expiry dominates: a token past its `exp` is reported as expired no
    // matter what else is wrong with it, signature included. The unverified
    // peek is only ever used to fail the token, never to admit it.
    if let Some(exp) = peek_exp_unverified(token) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        if now > exp {
            return Err(VerificationError::Expired);
        }
    }

    let key = DecodingKey::from_secret(signing_key);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => VerificationError::Expired,
            _ => VerificationError::Malformed,
        }
    })?;

    let claims = token_data.claims;

    // Lifetime invariant: reject tokens claiming more than the fixed TTL.
    if claims.exp.saturating_sub(claims.iat) > CREDENTIAL_TTL_SECS {
        return Err(VerificationError::Malformed);
    }

    Ok(LocalIdentity {
        subject_id: claims.sub,
        username: claims.username,
        role: claims.role,
    })
}

/// Read `exp` out of the payload without checking the signature. Returns
/// `None` if the token does not even have a decodable payload; those fall
/// through to the full decode and fail as malformed there.
fn peek_exp_unverified(token: &str) -> Option<u64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    value.get("exp")?.as_u64()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_account(role: Role) -> Account {
        Account {
            subject_id: "admin".to_string(),
            username: "admin".to_string(),
            password_hash: String::new(),
            role,
        }
    }

    fn sign(claims: &Claims, key: &[u8]) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(key),
        )
        .unwrap()
    }

    fn now_secs() -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
    }

    const KEY: &[u8] = b"test_jwt_key_32_bytes_minimum!!";

    #[test]
    fn test_issue_verify_round_trip() {
        let account = test_account(Role::Admin);
        let token = issue_credential(&account, KEY).unwrap();

        let identity = verify_credential(&token, KEY).unwrap();
        assert_eq!(identity.subject_id, account.subject_id);
        assert_eq!(identity.username, account.username);
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn test_expired_token_rejected_even_with_valid_signature() {
        let now = now_secs();
        let claims = Claims {
            sub: "admin".to_string(),
            username: "admin".to_string(),
            role: Role::Admin,
            iat: now - CREDENTIAL_TTL_SECS - 100,
            exp: now - 100,
        };

        let token = sign(&claims, KEY);
        assert_eq!(
            verify_credential(&token, KEY),
            Err(VerificationError::Expired)
        );
    }

    #[test]
    fn test_expired_token_with_wrong_key_still_reports_expired() {
        let now = now_secs();
        let claims = Claims {
            sub: "admin".to_string(),
            username: "admin".to_string(),
            role: Role::Admin,
            iat: now - CREDENTIAL_TTL_SECS - 100,
            exp: now - 100,
        };

        // Signed with a key we never issued. Expiry still wins over the
        // signature failure.
        let token = sign(&claims, b"attacker_key");
        assert_eq!(
            verify_credential(&token, KEY),
            Err(VerificationError::Expired)
        );
    }

    #[test]
    fn test_wrong_key_is_malformed() {
        let token = issue_credential(&test_account(Role::Worker), KEY).unwrap();
        assert_eq!(
            verify_credential(&token, b"some_other_key"),
            Err(VerificationError::Malformed)
        );
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        assert_eq!(
            verify_credential("not.a.jwt", KEY),
            Err(VerificationError::Malformed)
        );
        assert_eq!(verify_credential("", KEY), Err(VerificationError::Malformed));
    }

    #[test]
    fn test_overlong_lifetime_rejected_at_verification() {
        let now = now_secs();
        let claims = Claims {
            sub: "admin".to_string(),
            username: "admin".to_string(),
            role: Role::Admin,
            iat: now,
            exp: now + 30 * 24 * 60 * 60, // 30 days, violates the 24h policy
        };

        let token = sign(&claims, KEY);
        assert_eq!(
            verify_credential(&token, KEY),
            Err(VerificationError::Malformed)
        );
    }
}
