use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

/// Issues and verifies the signed session tokens carried by browsers and API clients.
#[derive(Clone)]
pub struct SessionTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    expiry: Duration,
}

impl SessionTokenService {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            encoding: EncodingKey::from_secret(config.session_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.session_secret.as_bytes()),
            issuer: config.session_issuer.clone(),
            audience: config.session_audience.clone(),
            expiry: Duration::minutes(config.session_expiry_minutes),
        })
    }

    pub fn expiry_seconds(&self) -> i64 {
        self.expiry.num_seconds()
    }

    pub fn issue(&self, user_id: &str, email: &str, role: &str) -> Result<String> {
        let now = Utc::now();
        let exp = now + self.expiry;
        let claims = SessionClaims {
            sub: user_id.to_owned(),
            email: email.to_owned(),
            role: role.to_owned(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.set_audience(&[self.audience.clone()]);
        validation.set_issuer(&[self.issuer.clone()]);
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    /// Decodes a token, treating any verification failure as an absent session.
    pub fn decode_lenient(&self, token: Option<&str>) -> Option<SessionClaims> {
        let token = token?;
        match self.verify(token) {
            Ok(claims) => Some(claims),
            Err(err) => {
                tracing::debug!(error = %err, "discarding invalid session token");
                None
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iss: String,
    pub aud: String,
    pub iat: usize,
    pub exp: usize,
}
