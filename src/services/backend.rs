//! Backend API interface consumed by the dashboard views.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{
    AuthMessage, Candle, Metrics, PriceQuote, Session, Signal, SignupRequest, Timeframe,
    UserIdentity,
};

/// Message used when a failed response carries no `error` field
pub const GENERIC_API_ERROR: &str = "API Error";

pub type ApiResult<T> = Result<T, ApiError>;

/// Every way a backend call can fail, normalized so callers need one code path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response
    Transport(String),
    /// Non-2xx answer; `message` is the body's `error` field when present
    Status { status: u16, message: String },
    /// 2xx answer whose body carries an `error` field
    Application(String),
    /// 2xx answer that does not match the expected shape
    Decode(String),
}

impl ApiError {
    /// Text shown next to the control that triggered the request
    pub fn message(&self) -> &str {
        match self {
            ApiError::Transport(message)
            | ApiError::Status { message, .. }
            | ApiError::Application(message)
            | ApiError::Decode(message) => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(message) => write!(f, "request failed: {}", message),
            ApiError::Status { status, message } => write!(f, "HTTP {}: {}", status, message),
            ApiError::Application(message) => write!(f, "backend error: {}", message),
            ApiError::Decode(message) => write!(f, "unexpected response: {}", message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Uniform `{ "error": "..." }` shape used by the backend for failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&ApiError> for ErrorBody {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.message().to_string(),
        }
    }
}

impl From<ApiError> for ErrorBody {
    fn from(err: ApiError) -> Self {
        Self::from(&err)
    }
}

/// Operations the dashboard needs from the backend.
///
/// Implementations issue one request per call and never panic.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> ApiResult<AuthMessage>;

    async fn signup(&self, request: &SignupRequest) -> ApiResult<AuthMessage>;

    async fn logout(&self) -> ApiResult<AuthMessage>;

    async fn check_login(&self) -> ApiResult<Session>;

    async fn get_user_id(&self) -> ApiResult<UserIdentity>;

    /// Raw session introspection, shape defined by the backend
    async fn debug_session(&self) -> ApiResult<serde_json::Value>;

    async fn live_prices(&self) -> ApiResult<Vec<PriceQuote>>;

    async fn signal(&self, ticker: &str) -> ApiResult<Signal>;

    async fn metrics(&self, ticker: &str) -> ApiResult<Metrics>;

    async fn candlestick(&self, symbol: &str, timeframe: &Timeframe) -> ApiResult<Vec<Candle>>;
}
