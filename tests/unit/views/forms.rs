//! Unit tests for login/signup validation and error mapping

use stocksignal::services::ApiError;
use stocksignal::views::forms::{
    is_plausible_email, login_error_message, signup_error_message, submit_login, submit_signup,
    FormError, LoginForm, SignupForm, LOGIN_FALLBACK_ERROR, LOGIN_TRANSPORT_ERROR,
    SIGNUP_FALLBACK_ERROR, SIGNUP_TRANSPORT_ERROR,
};

use crate::fake_api::{transport_error, FakeApi};

#[test]
fn test_login_requires_both_fields() {
    assert_eq!(
        LoginForm::new("", "pw").validate(),
        Err(FormError::MissingCredentials)
    );
    assert_eq!(
        LoginForm::new("alice", "").validate(),
        Err(FormError::MissingCredentials)
    );
    assert!(LoginForm::new("alice", "pw").validate().is_ok());
    assert_eq!(
        FormError::MissingCredentials.to_string(),
        "Please enter both username and password."
    );
}

#[test]
fn test_signup_validation_order() {
    let missing = SignupForm::new("bob", "", "pw", "pw");
    assert_eq!(missing.validate(), Err(FormError::MissingFields));

    // Email shape is checked before the password confirmation.
    let bad_email = SignupForm::new("bob", "bob-at-example", "one", "two");
    assert_eq!(bad_email.validate(), Err(FormError::InvalidEmail));

    let mismatch = SignupForm::new("bob", "bob@example.com", "one", "two");
    assert_eq!(mismatch.validate(), Err(FormError::PasswordMismatch));
    assert_eq!(
        FormError::PasswordMismatch.to_string(),
        "Passwords do not match."
    );

    assert!(SignupForm::new("bob", "bob@example.com", "pw", "pw")
        .validate()
        .is_ok());
}

#[test]
fn test_email_shape() {
    assert!(is_plausible_email("a@b.c"));
    assert!(!is_plausible_email("a@b"));
    assert!(!is_plausible_email("a.b"));
}

#[test]
fn test_signup_request_uses_wire_names() {
    let request = SignupForm::new(" bob ", "bob@example.com", "pw", "pw").to_request();
    assert_eq!(request.username, "bob");
    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(body["confirmPassword"], "pw");
}

#[test]
fn test_error_messages_prefer_server_text() {
    let server = ApiError::Status {
        status: 400,
        message: "Username or email already exists".to_string(),
    };
    assert_eq!(signup_error_message(&server), "Username or email already exists");

    let generic = ApiError::Status {
        status: 500,
        message: "API Error".to_string(),
    };
    assert_eq!(login_error_message(&generic), LOGIN_FALLBACK_ERROR);
    assert_eq!(signup_error_message(&generic), SIGNUP_FALLBACK_ERROR);

    assert_eq!(login_error_message(&transport_error()), LOGIN_TRANSPORT_ERROR);
    assert_eq!(signup_error_message(&transport_error()), SIGNUP_TRANSPORT_ERROR);

    let app = ApiError::Application("Account locked".to_string());
    assert_eq!(login_error_message(&app), "Account locked");
}

#[tokio::test]
async fn test_submit_login_validates_before_sending() {
    let api = FakeApi::new();
    let result = submit_login(&api, &LoginForm::new("alice", "")).await;
    assert_eq!(
        result,
        Err("Please enter both username and password.".to_string())
    );
    assert!(api.calls().is_empty());

    let result = submit_login(&api, &LoginForm::new(" alice ", "pw")).await;
    assert_eq!(result, Ok("alice".to_string()));
    assert_eq!(api.calls(), vec!["login/alice".to_string()]);
}

#[tokio::test]
async fn test_submit_signup_maps_failures() {
    let api = FakeApi::new();
    api.push_signup(Err(transport_error()));
    let form = SignupForm::new("bob", "bob@example.com", "pw", "pw");

    let result = submit_signup(&api, &form).await;
    assert_eq!(result, Err(SIGNUP_TRANSPORT_ERROR.to_string()));
    assert_eq!(api.count("signup/bob"), 1);
}
