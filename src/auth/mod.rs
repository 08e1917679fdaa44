//! Authentication and authorization.
//!
//! JWT-based sessions: `POST /auth/register` creates the tenant account
//! (seeding its trial subscription and default payment methods) and
//! `POST /auth/login` verifies credentials. `auth_middleware` validates the
//! bearer token on every tenant route and stores an [`AuthUser`] in the
//! request extensions; the tenant `uid` scoping every query comes from it.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::entities::{medio_pago, suscripcion, usuario};

const TOKEN_ISSUER: &str = "tienda360-api";
const TOKEN_AUDIENCE: &str = "tienda360";

/// Payment methods every new tenant starts with.
const DEFAULT_MEDIOS_PAGO: [&str; 3] = ["Efectivo", "Tarjeta", "Transferencia"];

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (tenant uid)
    pub email: String,
    pub nombre: Option<String>,
    pub jti: String, // JWT ID
    pub iat: i64,    // Issued at
    pub exp: i64,    // Expiration
    pub iss: String, // Issuer
    pub aud: String, // Audience
}

/// Authenticated tenant extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    pub nombre: Option<String>,
    pub token_id: String,
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_expiration: Duration,
    /// Length of the trial seeded on registration
    pub trial_days: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid credentials")]
    WrongCredentials,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal auth error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::MissingAuth
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::WrongCredentials => StatusCode::UNAUTHORIZED,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            AuthError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = crate::errors::ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

/// Issued token pair returned by register/login
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1))]
    pub nombre: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authentication service: token issuing/validation and credential checks.
pub struct AuthService {
    config: AuthConfig,
    db: Arc<DatabaseConnection>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        Self {
            config,
            db,
            encoding_key,
            decoding_key,
        }
    }

    /// Registers a new tenant. Seeds the trial subscription and default
    /// payment methods in the same transaction as the account row.
    pub async fn register(&self, input: RegisterRequest) -> Result<TokenResponse, AuthError> {
        input
            .validate()
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;

        let email = input.email.trim().to_ascii_lowercase();

        let existing = usuario::Entity::find()
            .filter(usuario::Column::Email.eq(email.clone()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&input.password)?;
        let user_id = Uuid::new_v4();
        let uid = user_id.to_string();
        let now = Utc::now();

        let txn = self.db.begin().await?;

        usuario::ActiveModel {
            id: Set(user_id),
            email: Set(email.clone()),
            password_hash: Set(password_hash),
            nombre: Set(input.nombre.clone()),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        suscripcion::ActiveModel {
            id: Set(Uuid::new_v4()),
            uid: Set(uid.clone()),
            estado: Set(suscripcion::EstadoSuscripcion::Trial),
            trial_inicio: Set(now),
            trial_fin: Set(now + ChronoDuration::days(self.config.trial_days)),
            payment_id: Set(None),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for nombre in DEFAULT_MEDIOS_PAGO {
            medio_pago::ActiveModel {
                id: Set(Uuid::new_v4()),
                uid: Set(uid.clone()),
                nombre: Set(nombre.to_string()),
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        info!(uid = %uid, "New tenant registered with trial subscription");

        self.issue_token(&uid, &email, Some(input.nombre))
    }

    /// Verifies credentials and returns a fresh token.
    pub async fn login(&self, input: LoginRequest) -> Result<TokenResponse, AuthError> {
        let email = input.email.trim().to_ascii_lowercase();

        let user = usuario::Entity::find()
            .filter(usuario::Column::Email.eq(email.clone()))
            .one(&*self.db)
            .await?
            .ok_or(AuthError::WrongCredentials)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AuthError::WrongCredentials);
        }

        self.issue_token(&user.id.to_string(), &user.email, Some(user.nombre))
    }

    fn issue_token(
        &self,
        uid: &str,
        email: &str,
        nombre: Option<String>,
    ) -> Result<TokenResponse, AuthError> {
        let now = Utc::now();
        let expires_in = self.config.access_token_expiration.as_secs();
        let claims = Claims {
            sub: uid.to_string(),
            email: email.to_string(),
            nombre,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + expires_in as i64,
            iss: TOKEN_ISSUER.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            uid: uid.to_string(),
            email: email.to_string(),
        })
    }

    /// Validates a JWT and returns its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_audience(&[TOKEN_AUDIENCE]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!("Token validation failed: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            }
        })?;

        Ok(data.claims)
    }
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Internal(format!("password hashing failed: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| AuthError::Internal(format!("bad hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Authentication middleware that extracts and validates bearer tokens.
/// On success the [`AuthUser`] is inserted into the request extensions.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let headers = request.headers().clone();

    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    match extract_auth_from_headers(&headers, &auth_service) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingAuth)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MissingAuth)?
        .trim();

    let claims = auth_service.validate_token(token)?;

    Ok(AuthUser {
        uid: claims.sub,
        email: claims.email,
        nombre: claims.nombre,
        token_id: claims.jti,
    })
}

/// Restricts a route tree to the configured admin email allow-list.
pub async fn admin_guard_middleware(
    State(admin_emails): State<Arc<Vec<String>>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AuthError::MissingAuth)?;

    let email = user.email.to_ascii_lowercase();
    if !admin_emails.iter().any(|e| *e == email) {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Authentication routes (public)
pub fn auth_routes() -> axum::Router<Arc<AuthService>> {
    axum::Router::new()
        .route("/register", axum::routing::post(register_handler))
        .route("/login", axum::routing::post(login_handler))
}

async fn register_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(input): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let token = auth_service.register(input).await?;
    Ok(Json(token))
}

async fn login_handler(
    State(auth_service): State<Arc<AuthService>>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let token = auth_service.login(input).await?;
    Ok(Json(token))
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }
}
