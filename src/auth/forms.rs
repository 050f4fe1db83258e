//! Form payloads and their pre-flight validation.

use crate::error::ValidationError;
use serde::Serialize;

fn required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

fn passwords_match(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password == confirm {
        Ok(())
    } else {
        Err(ValidationError::PasswordMismatch)
    }
}

/// Loose shape check: something on both sides of a single `@`, and a dot
/// in the domain. The backend owns real validation.
pub(crate) fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    required(email, "Email")?;

    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.') =>
        {
            Ok(())
        }
        _ => Err(ValidationError::InvalidEmail),
    }
}

// ── Register ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required(&self.username, "Username")?;
        validate_email(&self.email)?;
        required(&self.password, "Password")?;
        passwords_match(&self.password, &self.confirm_password)
    }

    pub(crate) fn payload(&self) -> RegisterRequest<'_> {
        RegisterRequest {
            username: self.username.trim(),
            email: self.email.trim(),
            password: &self.password,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

// ── Reset password ──────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ResetPasswordForm {
    /// Token issued by `POST /forgot_password`.
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ResetPasswordForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required(&self.token, "Reset token")?;
        required(&self.new_password, "New password")?;
        passwords_match(&self.new_password, &self.confirm_password)
    }

    pub(crate) fn payload(&self) -> ResetPasswordRequest<'_> {
        ResetPasswordRequest {
            token: self.token.trim(),
            new_password: &self.new_password,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ResetPasswordRequest<'a> {
    pub token: &'a str,
    pub new_password: &'a str,
}

// ── Change password ─────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl ChangePasswordForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required(&self.current_password, "Current password")?;
        required(&self.new_password, "New password")?;
        passwords_match(&self.new_password, &self.confirm_password)
    }

    pub(crate) fn payload(&self) -> ChangePasswordRequest<'_> {
        ChangePasswordRequest {
            current_password: &self.current_password,
            new_password: &self.new_password,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChangePasswordRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_form() -> RegisterForm {
        RegisterForm {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "s3cret!".into(),
            confirm_password: "s3cret!".into(),
        }
    }

    #[test]
    fn register_form_valid() {
        register_form().validate().unwrap();
    }

    #[test]
    fn register_form_required_fields() {
        let mut form = register_form();
        form.username = " ".into();
        assert_eq!(form.validate(), Err(ValidationError::Required("Username")));

        let mut form = register_form();
        form.email.clear();
        assert_eq!(form.validate(), Err(ValidationError::Required("Email")));

        let mut form = register_form();
        form.password.clear();
        form.confirm_password.clear();
        assert_eq!(form.validate(), Err(ValidationError::Required("Password")));
    }

    #[test]
    fn register_form_password_mismatch() {
        let mut form = register_form();
        form.confirm_password = "different".into();
        assert_eq!(form.validate(), Err(ValidationError::PasswordMismatch));
    }

    #[test]
    fn email_shape() {
        for ok in ["a@b.co", " admin@example.com "] {
            assert_eq!(validate_email(ok), Ok(()), "{ok}");
        }
        for bad in ["alice", "@example.com", "a@b", "a@b@c.com", "a@.com", "a@com."] {
            assert_eq!(validate_email(bad), Err(ValidationError::InvalidEmail), "{bad}");
        }
    }

    #[test]
    fn register_payload_trims_identity_not_password() {
        let form = RegisterForm {
            username: " alice ".into(),
            email: " alice@example.com ".into(),
            password: " pw ".into(),
            confirm_password: " pw ".into(),
        };
        let payload = serde_json::to_value(form.payload()).unwrap();
        assert_eq!(
            payload,
            serde_json::json!({ "username": "alice", "email": "alice@example.com", "password": " pw " })
        );
    }

    #[test]
    fn reset_form_validation() {
        let form = ResetPasswordForm {
            token: "abc".into(),
            new_password: "new".into(),
            confirm_password: "new".into(),
        };
        form.validate().unwrap();

        let missing_token = ResetPasswordForm {
            token: String::new(),
            ..form.clone()
        };
        assert_eq!(
            missing_token.validate(),
            Err(ValidationError::Required("Reset token"))
        );

        let mismatch = ResetPasswordForm {
            confirm_password: "nope".into(),
            ..form
        };
        assert_eq!(mismatch.validate(), Err(ValidationError::PasswordMismatch));
    }

    #[test]
    fn change_form_validation() {
        let form = ChangePasswordForm {
            current_password: String::new(),
            new_password: "n".into(),
            confirm_password: "n".into(),
        };
        assert_eq!(
            form.validate(),
            Err(ValidationError::Required("Current password"))
        );
    }
}
