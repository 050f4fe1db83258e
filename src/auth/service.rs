use super::forms::{validate_email, ChangePasswordForm, RegisterForm, ResetPasswordForm};
use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult, ValidationError};
use crate::session::{Role, UserIdentity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    role: String,
}

#[derive(Debug, Default, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
}

impl MessageResponse {
    fn or(self, fallback: &str) -> String {
        self.message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Reply to `POST /forgot_password`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForgotPasswordResponse {
    #[serde(default)]
    pub message: String,
    /// Returned directly by backends that do not deliver email yet.
    #[serde(default)]
    pub reset_token: Option<String>,
}

/// Account operations. Shares the session through its `ApiClient`.
#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Authenticate and, on success only, replace the current session.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<UserIdentity> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ValidationError::Required("Username").into());
        }
        if password.trim().is_empty() {
            return Err(ValidationError::Required("Password").into());
        }

        let response: LoginResponse = self
            .api
            .post("/login", &LoginRequest { username, password })
            .await?;

        if response.access_token.trim().is_empty() {
            return Err(ClientError::Decode(
                "login response is missing access_token".to_string(),
            ));
        }

        let user = UserIdentity::new(username, Role::from_str_lossy(&response.role));
        self.api.session().login(user.clone(), response.access_token)?;
        Ok(user)
    }

    pub fn logout(&self) {
        self.api.session().logout();
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, form: &RegisterForm) -> ClientResult<String> {
        form.validate()?;
        let response: Option<MessageResponse> = self.api.post("/register", &form.payload()).await?;
        tracing::info!(username = %form.username.trim(), "Registered account");
        Ok(response.unwrap_or_default().or("Registration successful"))
    }

    pub async fn forgot_password(&self, email: &str) -> ClientResult<ForgotPasswordResponse> {
        validate_email(email)?;
        self.api
            .post("/forgot_password", &serde_json::json!({ "email": email.trim() }))
            .await
    }

    pub async fn reset_password(&self, form: &ResetPasswordForm) -> ClientResult<String> {
        form.validate()?;
        let response: Option<MessageResponse> =
            self.api.post("/reset_password", &form.payload()).await?;
        Ok(response.unwrap_or_default().or("Password reset successful"))
    }

    /// Change the password of the logged-in account.
    pub async fn change_password(&self, form: &ChangePasswordForm) -> ClientResult<String> {
        if !self.api.session().is_authenticated() {
            return Err(ClientError::NotAuthenticated);
        }
        form.validate()?;
        let response: Option<MessageResponse> =
            self.api.post("/change_password", &form.payload()).await?;
        Ok(response.unwrap_or_default().or("Password changed successfully"))
    }
}
