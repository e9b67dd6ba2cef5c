//! Request DTOs.
//!
//! All bodies are `application/x-www-form-urlencoded`. Fields are optional so
//! that handlers can answer a missing field with their own status code.

use serde::Deserialize;

/// Email and password, for registration and login.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsForm {
    /// Login email.
    #[serde(default)]
    pub email: Option<String>,
    /// Plain-text password.
    #[serde(default)]
    pub password: Option<String>,
}

impl CredentialsForm {
    /// Email, if present and non-empty.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|s| !s.is_empty())
    }

    /// Password, if present and non-empty.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|s| !s.is_empty())
    }
}

/// Request for a password-reset token.
#[derive(Debug, Default, Deserialize)]
pub struct ResetRequestForm {
    /// Account email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Redemption of a password-reset token.
#[derive(Debug, Default, Deserialize)]
pub struct ResetPasswordForm {
    /// Account email, echoed back in the response.
    #[serde(default)]
    pub email: Option<String>,
    /// Token issued by `POST /reset_password`.
    #[serde(default)]
    pub reset_token: Option<String>,
    /// Replacement password.
    #[serde(default)]
    pub new_password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_accessors_skip_empty() {
        let form = CredentialsForm {
            email: Some(String::new()),
            password: Some("pw".to_string()),
        };
        assert_eq!(form.email(), None);
        assert_eq!(form.password(), Some("pw"));
        assert_eq!(CredentialsForm::default().password(), None);
    }
}
