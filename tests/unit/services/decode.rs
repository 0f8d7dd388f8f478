//! Unit tests for response normalization

use serde_json::json;
use stocksignal::models::{PriceQuote, Session};
use stocksignal::services::client::decode_body;
use stocksignal::services::{ApiError, ErrorBody};
use tokio_test::{assert_err, assert_ok};

#[test]
fn test_success_body_is_decoded() {
    let body = json!([{ "symbol": "AAPL", "price": 1.5 }]).to_string();
    let quotes: Vec<PriceQuote> = assert_ok!(decode_body(200, body.as_bytes()));
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].price, Some(1.5));
}

#[test]
fn test_error_status_uses_error_field() {
    let body = json!({ "error": "Invalid username or password" }).to_string();
    let err = assert_err!(decode_body::<Session>(401, body.as_bytes()));
    assert_eq!(
        err,
        ApiError::Status {
            status: 401,
            message: "Invalid username or password".to_string(),
        }
    );
    assert!(err.is_unauthorized());
}

#[test]
fn test_error_status_without_body_is_generic() {
    let err = decode_body::<Session>(500, b"<html>oops</html>").unwrap_err();
    assert_eq!(err.message(), "API Error");
    assert_eq!(err.status(), Some(500));

    let err = decode_body::<Session>(401, json!({ "logged_in": false }).to_string().as_bytes())
        .unwrap_err();
    assert_eq!(err.message(), "API Error");
}

#[test]
fn test_success_with_error_field_is_application_error() {
    let body = json!({ "error": "No data available or rate limit exceeded." }).to_string();
    let err = assert_err!(decode_body::<Vec<PriceQuote>>(200, body.as_bytes()));
    assert_eq!(
        err,
        ApiError::Application("No data available or rate limit exceeded.".to_string())
    );
}

#[test]
fn test_unexpected_shape_is_decode_error() {
    let err = decode_body::<Vec<PriceQuote>>(200, b"{\"symbol\": 3}").unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
    assert!(!err.is_transport());
}

#[test]
fn test_every_error_has_uniform_body() {
    let errors = [
        ApiError::Transport("connection refused".to_string()),
        ApiError::Status {
            status: 404,
            message: "Historical data for ZZZ not found".to_string(),
        },
        ApiError::Application("nope".to_string()),
    ];
    for err in &errors {
        let body = ErrorBody::from(err);
        assert_eq!(body.error, err.message());
        let wire = serde_json::to_value(&body).unwrap();
        assert!(wire["error"].is_string());
    }
}
