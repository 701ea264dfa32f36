use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use tokio::sync::RwLock;
use uuid::Uuid;

use account_lib::entities::AppUser;
use account_lib::provider::{IdentityError, IdentityProviderTrait, IdentitySubject};
use account_lib::result::ProviderError;

use super::config::IdentityConfig;
use super::models::{
    AssignRolesRequest, CreateIdentityUserRequest, IdentityCredential, IdentityUserRep,
    RejectionBody, TokenResponse, UpdateIdentityUserRequest,
};

/// Token with expiration tracking
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn new(token: String, expires_in: u64) -> Self {
        // Subtract 30 seconds buffer to refresh before actual expiration
        let buffer = 30;
        let expires_in = if expires_in > buffer {
            expires_in - buffer
        } else {
            expires_in
        };
        Self {
            access_token: token,
            expires_at: Instant::now() + Duration::from_secs(expires_in),
        }
    }

    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Identity provider client speaking the admin REST API over OIDC
/// client-credentials. Policy rejections come back as structured
/// `ProviderError` lists; everything else is a transport fault.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    config: IdentityConfig,
    http: Client,
    token: Arc<RwLock<Option<CachedToken>>>,
}

impl HttpIdentityProvider {
    pub fn new(config: IdentityConfig) -> Result<Self, IdentityError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        Ok(Self {
            config,
            http,
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Get a valid access token, refreshing if necessary
    async fn get_token(&self) -> Result<String, IdentityError> {
        {
            let token_guard = self.token.read().await;
            if let Some(ref cached) = *token_guard {
                if cached.is_valid() {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let new_token = self.fetch_token().await?;
        let token_string = new_token.access_token.clone();

        {
            let mut token_guard = self.token.write().await;
            *token_guard = Some(CachedToken::new(new_token.access_token, new_token.expires_in));
        }

        Ok(token_string)
    }

    async fn fetch_token(&self) -> Result<TokenResponse, IdentityError> {
        let response = self
            .http
            .post(self.config.token_url())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", &self.config.client_id),
                ("client_secret", self.config.client_secret.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Unavailable(format!(
                "token request failed with status {}: {}",
                status, body
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| IdentityError::InvalidResponse(e.to_string()))
    }

    /// Decode a rejection body into provider errors, falling back to a
    /// single status-derived error when the body is not structured.
    async fn rejection(response: Response, fallback_code: &str) -> IdentityError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if let Ok(parsed) = serde_json::from_str::<RejectionBody>(&body) {
            if !parsed.errors.is_empty() {
                let errors = parsed
                    .errors
                    .into_iter()
                    .map(|e| ProviderError {
                        code: e.code,
                        description: e.description,
                    })
                    .collect();
                return IdentityError::Rejected(errors);
            }
        }

        IdentityError::Rejected(vec![ProviderError {
            code: fallback_code.to_string(),
            description: format!("provider refused with status {}: {}", status, body),
        }])
    }
}

#[async_trait]
impl IdentityProviderTrait for HttpIdentityProvider {
    async fn create_user(
        &self,
        user: &AppUser,
        password: &Secret<String>,
    ) -> Result<(), IdentityError> {
        let token = self.get_token().await?;

        let request = CreateIdentityUserRequest {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            security_stamp: user.security_stamp.clone(),
            enabled: true,
            credentials: vec![IdentityCredential {
                credential_type: "password".to_string(),
                value: password.expose_secret().clone(),
                temporary: false,
            }],
        };

        let response = self
            .http
            .post(self.config.admin_users_url())
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::CREATED => Ok(()),
            StatusCode::CONFLICT => Err(IdentityError::Rejected(vec![ProviderError {
                code: "duplicate_email".to_string(),
                description: format!("email '{}' is already in use", user.email),
            }])),
            StatusCode::BAD_REQUEST => Err(Self::rejection(response, "policy_violation").await),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(IdentityError::Unavailable(format!(
                    "create user failed with status {}: {}",
                    status, body
                )))
            }
        }
    }

    async fn update_user(&self, user: &AppUser) -> Result<(), IdentityError> {
        let token = self.get_token().await?;

        let request = UpdateIdentityUserRequest {
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            security_stamp: user.security_stamp.clone(),
            image_id: user.image_id.map(|id| id.to_string()),
        };

        let response = self
            .http
            .put(self.config.admin_user_url(&user.id.to_string()))
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => Err(IdentityError::NotFound),
            StatusCode::CONFLICT => Err(IdentityError::Rejected(vec![ProviderError {
                code: "duplicate_email".to_string(),
                description: format!("email '{}' is already in use", user.email),
            }])),
            StatusCode::BAD_REQUEST => Err(Self::rejection(response, "policy_violation").await),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(IdentityError::Unavailable(format!(
                    "update user failed with status {}: {}",
                    status, body
                )))
            }
        }
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<(), IdentityError> {
        let token = self.get_token().await?;

        let response = self
            .http
            .delete(self.config.admin_user_url(&user_id.to_string()))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => Err(IdentityError::NotFound),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(IdentityError::Unavailable(format!(
                    "delete user failed with status {}: {}",
                    status, body
                )))
            }
        }
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<IdentitySubject>, IdentityError> {
        let token = self.get_token().await?;

        let response = self
            .http
            .get(self.config.admin_user_url(&user_id.to_string()))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let rep = response
                    .json::<IdentityUserRep>()
                    .await
                    .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;
                let id = Uuid::parse_str(&rep.id)
                    .map_err(|e| IdentityError::InvalidResponse(e.to_string()))?;
                Ok(Some(IdentitySubject {
                    id,
                    username: rep.username,
                    email: rep.email,
                }))
            }
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(IdentityError::Unavailable(format!(
                    "find user failed with status {}: {}",
                    status, body
                )))
            }
        }
    }

    async fn assign_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> Result<(), IdentityError> {
        let token = self.get_token().await?;

        let request = AssignRolesRequest {
            role_ids: role_ids.iter().map(Uuid::to_string).collect(),
        };

        let response = self
            .http
            .put(self.config.admin_user_roles_url(&user_id.to_string()))
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => Err(IdentityError::NotFound),
            StatusCode::BAD_REQUEST => Err(Self::rejection(response, "unknown_role").await),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(IdentityError::Unavailable(format!(
                    "assign roles failed with status {}: {}",
                    status, body
                )))
            }
        }
    }
}
