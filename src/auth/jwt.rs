use std::{sync::Arc, time::Duration};

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{auth::claims::Claims, auth::repo::TokenStore, config::JwtConfig, state::AppState};

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl From<&JwtConfig> for JwtKeys {
    fn from(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes.max(1) as u64) * 60),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn sign(&self, user_id: Uuid, token_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            jti: token_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, token_id = %token_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, token_id = %data.claims.jti, "jwt verified");
        Ok(data.claims)
    }
}

/// Issues bearer tokens and resolves them back to a user id.
#[derive(Clone)]
pub struct Sessions {
    keys: JwtKeys,
    tokens: Arc<dyn TokenStore>,
}

impl FromRef<AppState> for Sessions {
    fn from_ref(state: &AppState) -> Self {
        Sessions::new(JwtKeys::from_ref(state), state.tokens.clone())
    }
}

impl Sessions {
    pub fn new(keys: JwtKeys, tokens: Arc<dyn TokenStore>) -> Self {
        Self { keys, tokens }
    }

    /// Every call mints and records a fresh token; earlier ones stay valid.
    pub async fn issue(&self, user_id: Uuid) -> anyhow::Result<String> {
        let token_id = Uuid::new_v4();
        self.tokens.insert(token_id, user_id).await?;
        self.keys.sign(user_id, token_id)
    }

    /// `None` for tokens that are malformed, expired, foreign or never recorded.
    pub async fn resolve(&self, token: &str) -> anyhow::Result<Option<Uuid>> {
        let claims = match self.keys.verify(token) {
            Ok(c) => c,
            Err(e) => {
                debug!(error = %e, "token rejected");
                return Ok(None);
            }
        };
        let owner = self.tokens.owner_of(claims.jti).await?;
        Ok(owner.filter(|id| *id == claims.sub))
    }
}
