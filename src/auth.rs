// src/auth.rs
use crate::store::Caller;
use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Audience and role carried by access tokens of signed-in users.
pub const TOKEN_AUDIENCE: &str = "authenticated";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    #[serde(default)]
    pub email: Option<String>,
    pub aud: String,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
}

/// Secret shared with the hosted backend for HS256 access tokens.
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
        }
    }

    pub fn verify(&self, token: &str) -> Result<AdminUser> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[TOKEN_AUDIENCE]);

        let key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let token_data = decode::<Claims>(token, &key, &validation)?;
        let claims = token_data.claims;

        Ok(AdminUser {
            user_id: claims.sub,
            email: claims.email.unwrap_or_default(),
            token: token.to_string(),
        })
    }
}

/// Sign an access token the way the hosted backend does.
pub fn issue_access_token(
    secret: &str,
    user_id: &str,
    email: &str,
    ttl: Duration,
) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: Some(email.to_string()),
        aud: TOKEN_AUDIENCE.to_string(),
        role: Some(TOKEN_AUDIENCE.to_string()),
        exp: (now + ttl).timestamp().max(0) as usize,
        iat: now.timestamp().max(0) as usize,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// Signed-in administrator, extracted from the bearer token.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user_id: String,
    pub email: String,
    pub token: String,
}

impl AdminUser {
    /// Store writes on behalf of this admin use their own token.
    pub fn caller(&self) -> Caller<'_> {
        Caller::Token(&self.token)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth_config = match req.guard::<&State<AuthConfig>>().await {
            Outcome::Success(config) => config,
            Outcome::Error((status, _)) => {
                error!("Auth configuration is not managed");
                return Outcome::Error((status, AuthError::Misconfigured));
            }
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let token = match req.headers().get_one("Authorization") {
            Some(header) => match header.strip_prefix("Bearer ") {
                Some(token) => token.trim(),
                None => {
                    warn!("Invalid Authorization header format");
                    return Outcome::Error((Status::Unauthorized, AuthError::InvalidToken));
                }
            },
            None => {
                warn!("Missing Authorization header");
                return Outcome::Error((Status::Unauthorized, AuthError::MissingToken));
            }
        };

        match auth_config.verify(token) {
            Ok(user) => {
                info!("Admin {} authenticated", user.email);
                Outcome::Success(user)
            }
            Err(e) => {
                warn!("Token verification failed: {}", e);
                Outcome::Error((Status::Unauthorized, AuthError::TokenVerificationFailed))
            }
        }
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenVerificationFailed,
    Misconfigured,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authorization token required",
            AuthError::InvalidToken => "Invalid authorization token format",
            AuthError::TokenVerificationFailed => "Token verification failed",
            AuthError::Misconfigured => "Authentication is not configured",
        }
    }
}

// Optional auth guard that doesn't fail if no auth is provided
pub struct OptionalAdmin {
    pub user: Option<AdminUser>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OptionalAdmin {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match AdminUser::from_request(req).await {
            Outcome::Success(user) => Outcome::Success(OptionalAdmin { user: Some(user) }),
            _ => Outcome::Success(OptionalAdmin { user: None }),
        }
    }
}
