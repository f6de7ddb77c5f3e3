use std::time::Duration;

use jsonwebtoken::get_current_timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Distinguishes the two tokens of a pair. A refresh token is only good for
/// `POST /auth/refresh`; every other route wants an access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Registered plus private JWT claims carried by both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: u64,
    pub exp: u64,
    pub iss: String,
    pub aud: String,
    pub kind: TokenKind,
}

impl Claims {
    pub fn new(sub: Uuid, kind: TokenKind, ttl: Duration, issuer: &str, audience: &str) -> Self {
        let iat = get_current_timestamp();
        Self {
            sub,
            iat,
            exp: iat + ttl.as_secs(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TokenKind::Access).unwrap(),
            r#""access""#
        );
        assert_eq!(
            serde_json::to_string(&TokenKind::Refresh).unwrap(),
            r#""refresh""#
        );
    }

    #[test]
    fn expiry_is_issue_time_plus_ttl() {
        let claims = Claims::new(
            Uuid::new_v4(),
            TokenKind::Access,
            Duration::from_secs(300),
            "iss",
            "aud",
        );
        assert_eq!(claims.exp, claims.iat + 300);
    }
}
