//! Login and signup forms: client-side validation and submission.

use std::fmt;
use tracing::{info, warn};

use crate::models::SignupRequest;
use crate::services::backend::{ApiError, DashboardApi, GENERIC_API_ERROR};

pub const LOGIN_FALLBACK_ERROR: &str = "Invalid credentials";
pub const LOGIN_TRANSPORT_ERROR: &str = "Failed to connect to server";
pub const SIGNUP_FALLBACK_ERROR: &str = "Signup failed.";
pub const SIGNUP_TRANSPORT_ERROR: &str = "Server error. Please try again.";
pub const SIGNUP_NOTICE: &str = "Account created successfully! Redirecting to login...";

/// Validation failures caught before any request is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    MissingCredentials,
    MissingFields,
    InvalidEmail,
    PasswordMismatch,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            FormError::MissingCredentials => "Please enter both username and password.",
            FormError::MissingFields => "Please fill out all fields.",
            FormError::InvalidEmail => "Invalid email format.",
            FormError::PasswordMismatch => "Passwords do not match.",
        };
        f.write_str(message)
    }
}

impl std::error::Error for FormError {}

/// Minimal shape check: an `@` and a `.` somewhere
pub fn is_plausible_email(email: &str) -> bool {
    email.contains('@') && email.contains('.')
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(FormError::MissingCredentials);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// Checks run in order: presence, email shape, password confirmation
    pub fn validate(&self) -> Result<(), FormError> {
        if self.username.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(FormError::MissingFields);
        }
        if !is_plausible_email(&self.email) {
            return Err(FormError::InvalidEmail);
        }
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        Ok(())
    }

    pub fn to_request(&self) -> SignupRequest {
        SignupRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
        }
    }
}

/// Display state of a form page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
}

fn server_message(err: &ApiError, fallback: &str, transport: &str) -> String {
    match err {
        ApiError::Transport(_) => transport.to_string(),
        ApiError::Decode(_) => fallback.to_string(),
        ApiError::Status { message, .. } | ApiError::Application(message) => {
            if message.is_empty() || message == GENERIC_API_ERROR {
                fallback.to_string()
            } else {
                message.clone()
            }
        }
    }
}

pub fn login_error_message(err: &ApiError) -> String {
    server_message(err, LOGIN_FALLBACK_ERROR, LOGIN_TRANSPORT_ERROR)
}

pub fn signup_error_message(err: &ApiError) -> String {
    server_message(err, SIGNUP_FALLBACK_ERROR, SIGNUP_TRANSPORT_ERROR)
}

/// Validate and submit a login; yields the signed-in username
pub async fn submit_login(api: &dyn DashboardApi, form: &LoginForm) -> Result<String, String> {
    form.validate().map_err(|e| e.to_string())?;

    let username = form.username.trim();
    match api.login(username, &form.password).await {
        Ok(_) => {
            info!(username = %username, "Login succeeded");
            Ok(username.to_string())
        }
        Err(e) => {
            warn!(username = %username, error = %e, "Login failed");
            Err(login_error_message(&e))
        }
    }
}

/// Validate and submit a signup; yields the success notice
pub async fn submit_signup(api: &dyn DashboardApi, form: &SignupForm) -> Result<&'static str, String> {
    form.validate().map_err(|e| e.to_string())?;

    let request = form.to_request();
    match api.signup(&request).await {
        Ok(_) => {
            info!(username = %request.username, "Signup succeeded");
            Ok(SIGNUP_NOTICE)
        }
        Err(e) => {
            warn!(username = %request.username, error = %e, "Signup failed");
            Err(signup_error_message(&e))
        }
    }
}
