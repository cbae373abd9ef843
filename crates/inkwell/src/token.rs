//! Identity tokens: HS256 JWTs carrying the user's email.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use inkwell_core::Email;

use crate::error::{BlogError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    email: String,
    iat: u64,
    exp: u64,
}

/// Issues and validates identity tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer signing with `secret`; tokens live for `ttl`.
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Issue a token for `email`, valid from now.
    pub fn issue(&self, email: &Email) -> Result<String> {
        self.issue_at(email, Utc::now())
    }

    fn issue_at(&self, email: &Email, issued_at: DateTime<Utc>) -> Result<String> {
        let iat = issued_at.timestamp().max(0) as u64;
        let claims = Claims {
            email: email.to_string(),
            iat,
            exp: iat.saturating_add(self.ttl.as_secs()),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| BlogError::Token(e.to_string()))
    }

    /// Validate a token and return the email it was issued for.
    pub fn validate(&self, token: &str) -> Result<Email> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => BlogError::ExpiredToken,
            _ => BlogError::InvalidToken,
        })?;

        Ok(Email::new(data.claims.email))
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
