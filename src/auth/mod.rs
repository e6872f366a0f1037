//! Credential verification and bearer-token lifecycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use validator::Validate;

use crate::error::{AppError, AppResult, AuthError};
use crate::models::user::normalize_email;
use crate::models::{new_id, Role, User, UserProfile};
use crate::repo::{Repository, Users};

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenSigner};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token plus the public view of the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Clone)]
pub struct AuthService {
    users: Repository<Users>,
    tokens: Arc<TokenSigner>,
}

impl AuthService {
    pub fn new(users: Repository<Users>, secret: &str, token_ttl: Duration) -> Self {
        Self {
            users,
            tokens: Arc::new(TokenSigner::new(secret.as_bytes(), token_ttl)),
        }
    }

    pub fn issue_token(&self, user: &UserProfile) -> AppResult<String> {
        self.tokens.issue(user)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.verify(token)
    }

    /// Create an account and sign the new user in.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, mut request: RegisterRequest) -> AppResult<Session> {
        request.email = normalize_email(&request.email);
        request.validate()?;

        // Cheap early exit; the insert below re-checks under the lock.
        if self.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::conflict("Email already exists"));
        }

        let user = User {
            id: new_id(),
            email: request.email,
            password_hash: hash_password(&request.password).await?,
            name: request.name,
            role: request.role,
            created_at: Utc::now(),
        };
        let user = self.users.insert(user).await?;

        info!(user_id = %user.id, "user registered");
        self.session_for(&user)
    }

    /// Check credentials and issue a token. Unknown email and wrong
    /// password fail identically.
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: LoginRequest) -> AppResult<Session> {
        let email = normalize_email(&request.email);

        let Some(user) = self.find_by_email(&email).await? else {
            let _ = verify_password(&request.password, password::DECOY_HASH).await;
            return Err(AuthError::InvalidCredentials.into());
        };

        match verify_password(&request.password, &user.password_hash).await {
            Ok(true) => {
                info!(user_id = %user.id, "user logged in");
                self.session_for(&user)
            }
            Ok(false) => Err(AuthError::InvalidCredentials.into()),
            Err(AppError::Auth(AuthError::Malformed(reason))) => {
                error!(user_id = %user.id, %reason, "stored password hash is malformed");
                Err(AuthError::InvalidCredentials.into())
            }
            Err(other) => Err(other),
        }
    }

    /// Profile of the user a verified token belongs to.
    pub async fn me(&self, claims: &Claims) -> AppResult<UserProfile> {
        let user = self.users.find_by_id(&claims.id).await?;
        Ok(UserProfile::from(&user))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.users.find_one(|user| normalize_email(&user.email) == email).await
    }

    fn session_for(&self, user: &User) -> AppResult<Session> {
        let profile = UserProfile::from(user);
        let token = self.tokens.issue(&profile)?;
        Ok(Session { token, user: profile })
    }
}
