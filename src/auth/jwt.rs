use std::time::Duration;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    auth::claims::{Claims, TokenKind},
    state::AppState,
};

/// HS256 signing material plus the claim values every issued token carries.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let jwt = &state.config.jwt;
        Self {
            encoding: EncodingKey::from_secret(jwt.secret.as_bytes()),
            decoding: DecodingKey::from_secret(jwt.secret.as_bytes()),
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
            access_ttl: Duration::from_secs(jwt.ttl_minutes.max(0) as u64 * 60),
            refresh_ttl: Duration::from_secs(jwt.refresh_ttl_minutes.max(0) as u64 * 60),
        }
    }
}

impl JwtKeys {
    fn sign(&self, user_id: Uuid, kind: TokenKind) -> anyhow::Result<String> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims::new(user_id, kind, ttl, &self.issuer, &self.audience);
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, kind = ?kind, "token signed");
        Ok(token)
    }

    pub fn sign_access(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign(user_id, TokenKind::Access)
    }

    pub fn sign_refresh(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign(user_id, TokenKind::Refresh)
    }

    /// Checks signature, expiry, issuer and audience. Kind checks are the
    /// callers' business.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        let claims = decode::<Claims>(token, &self.decoding, &validation)?.claims;
        debug!(user_id = %claims.sub, kind = ?claims.kind, "token verified");
        Ok(claims)
    }

    pub fn verify_refresh(&self, token: &str) -> anyhow::Result<Claims> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::Refresh {
            anyhow::bail!("not a refresh token");
        }
        Ok(claims)
    }
}

/// Bearer-token extractor: resolves to the authenticated user's id, rejecting
/// missing headers, invalid tokens and refresh tokens with 401.
pub struct AuthUser(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| unauthorized("Missing bearer token"))?;

        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "token rejected");
            unauthorized("Invalid or expired token")
        })?;
        if claims.kind != TokenKind::Access {
            return Err(unauthorized("Access token required"));
        }

        Ok(AuthUser(claims.sub))
    }
}

fn unauthorized(msg: &str) -> (StatusCode, String) {
    (StatusCode::UNAUTHORIZED, msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> JwtKeys {
        JwtKeys::from_ref(&AppState::fake())
    }

    #[tokio::test]
    async fn access_token_roundtrip() {
        let keys = keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign_access(user_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.kind, TokenKind::Access);
    }

    #[tokio::test]
    async fn refresh_token_passes_the_refresh_gate() {
        let keys = keys();
        let user_id = Uuid::new_v4();
        let token = keys.sign_refresh(user_id).expect("sign");
        let claims = keys.verify_refresh(&token).expect("verify refresh");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.kind, TokenKind::Refresh);
    }

    #[tokio::test]
    async fn access_token_fails_the_refresh_gate() {
        let keys = keys();
        let token = keys.sign_access(Uuid::new_v4()).expect("sign");
        assert!(keys.verify_refresh(&token).is_err());
    }

    #[tokio::test]
    async fn foreign_issuer_fails_verification() {
        let mut keys = keys();
        let token = keys.sign_access(Uuid::new_v4()).expect("sign");
        keys.issuer = "someone-else".into();
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn extractor_resolves_an_access_token() {
        let state = AppState::fake();
        let user_id = Uuid::new_v4();
        let token = JwtKeys::from_ref(&state)
            .sign_access(user_id)
            .expect("sign");
        let request = axum::http::Request::builder()
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(())
            .expect("request");
        let (mut parts, ()) = request.into_parts();
        let AuthUser(resolved) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extractor accepts access tokens");
        assert_eq!(resolved, user_id);
    }

    #[tokio::test]
    async fn extractor_rejects_a_refresh_token() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state)
            .sign_refresh(Uuid::new_v4())
            .expect("sign");
        let request = axum::http::Request::builder()
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(())
            .expect("request");
        let (mut parts, ()) = request.into_parts();
        let (status, _) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .err()
            .expect("extractor rejects refresh tokens");
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
