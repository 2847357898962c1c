//! JWT authentication for the admin API, plus best-effort identity
//! extraction for usage attribution.

use crate::error::AppError;
use crate::server::Server;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Database user id.
    pub sub: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

impl AccessClaims {
    pub fn new(user_id: &str, role: &str, expires_in_seconds: u64) -> Self {
        let now = Utc::now().timestamp() as usize;
        Self {
            sub: user_id.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now + expires_in_seconds as usize,
        }
    }
}

/// JWT service trait for token operations
pub trait JwtService: Send + Sync {
    fn create_token(&self, claims: &AccessClaims) -> Result<String, AppError>;
    fn validate_token(&self, token: &str) -> Result<AccessClaims, AppError>;
}

/// HS256 JWT service backed by a shared secret.
pub struct JwtServiceImpl {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtServiceImpl {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

impl JwtService for JwtServiceImpl {
    fn create_token(&self, claims: &AccessClaims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn validate_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        let data = decode::<AccessClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;
        Ok(data.claims)
    }
}

/// Pull a user id out of a bearer token if one is present and valid.
/// Used for usage attribution only, so failures fall back to anonymous.
pub fn bearer_identity(headers: &HeaderMap, jwt: &dyn JwtService) -> Option<String> {
    let auth = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = auth.strip_prefix("Bearer ")?;
    match jwt.validate_token(token) {
        Ok(claims) => Some(claims.sub),
        Err(_) => {
            trace!("Ignoring invalid bearer token for usage attribution");
            None
        }
    }
}

/// Admin-only guard for the management API. Validates the bearer token,
/// loads the user, and requires the admin role.
pub async fn admin_middleware(
    State(server): State<Server>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing authentication credentials".to_string()))?;

    let claims = server.jwt_service.validate_token(token)?;

    let user = server
        .database
        .users()
        .find_by_id(&claims.sub)
        .await
        .map_err(|e| AppError::Internal(format!("Database error: {}", e)))?
        .ok_or_else(|| AppError::Unauthorized("Unknown user".to_string()))?;

    if !user.is_admin() {
        warn!(user_id = %user.id, "Rejected non-admin access to management API");
        return Err(AppError::Unauthorized("Admin role required".to_string()));
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn round_trips_claims() {
        let service = JwtServiceImpl::new("test-secret");
        let claims = AccessClaims::new("user-1", "admin", 3600);
        let token = service.create_token(&claims).unwrap();
        let decoded = service.validate_token(&token).unwrap();
        assert_eq!(decoded.sub, "user-1");
        assert_eq!(decoded.role, "admin");
    }

    #[test]
    fn rejects_expired_token() {
        let service = JwtServiceImpl::new("test-secret");
        let mut claims = AccessClaims::new("user-1", "admin", 3600);
        claims.exp = claims.iat.saturating_sub(600);
        let token = service.create_token(&claims).unwrap();
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn rejects_wrong_secret() {
        let service = JwtServiceImpl::new("test-secret");
        let other = JwtServiceImpl::new("other-secret");
        let token = service
            .create_token(&AccessClaims::new("user-1", "user", 3600))
            .unwrap();
        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn bearer_identity_ignores_garbage() {
        let service = JwtServiceImpl::new("test-secret");
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_identity(&headers, &service), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer nonsense"));
        assert_eq!(bearer_identity(&headers, &service), None);

        let token = service
            .create_token(&AccessClaims::new("user-2", "user", 3600))
            .unwrap();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        assert_eq!(bearer_identity(&headers, &service), Some("user-2".to_string()));
    }
}
