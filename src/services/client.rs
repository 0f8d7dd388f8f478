//! reqwest-backed implementation of [`DashboardApi`].

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use super::backend::{ApiError, ApiResult, DashboardApi, GENERIC_API_ERROR};
use crate::models::{
    AuthMessage, Candle, LoginRequest, Metrics, PriceQuote, Session, Signal, SignupRequest,
    Timeframe, UserIdentity,
};

/// HTTP client for the dashboard backend.
///
/// The inner client keeps a cookie store, so the session cookie set by
/// `/login` is sent with every later request.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: Url) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self::with_client(base_url, http))
    }

    /// Use a preconfigured client (tests, custom TLS, proxies)
    pub fn with_client(base_url: Url, http: reqwest::Client) -> Self {
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> ApiResult<T> {
        debug!(method = %method, url = %url, "API request");

        let mut builder = self
            .http
            .request(method, url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await.map_err(|e| {
            error!(url = %url, error = %e, "API fetch failed");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| {
            error!(url = %url, error = %e, "API fetch failed while reading body");
            ApiError::Transport(e.to_string())
        })?;

        let result = decode_body(status, &bytes);
        if let Err(ApiError::Status { status, message }) = &result {
            error!(url = %url, status = status, error = %message, "API error response");
        }
        result
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        let url = self.endpoint(segments)?;
        self.request(Method::GET, url, None).await
    }

    async fn post<T: DeserializeOwned>(&self, segments: &[&str], body: Option<Value>) -> ApiResult<T> {
        let url = self.endpoint(segments)?;
        self.request(Method::POST, url, body).await
    }
}

/// Turn a raw response into the expected type or a normalized [`ApiError`]
pub fn decode_body<T: DeserializeOwned>(status: u16, body: &[u8]) -> ApiResult<T> {
    let parsed: Result<Value, _> = serde_json::from_slice(body);

    if !(200..300).contains(&status) {
        let message = parsed
            .ok()
            .as_ref()
            .and_then(error_field)
            .unwrap_or_else(|| GENERIC_API_ERROR.to_string());
        return Err(ApiError::Status { status, message });
    }

    let value = parsed.map_err(|e| ApiError::Decode(e.to_string()))?;
    if let Some(message) = error_field(&value) {
        return Err(ApiError::Application(message));
    }
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

fn error_field(value: &Value) -> Option<String> {
    value
        .get("error")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

fn to_body<T: serde::Serialize>(payload: &T) -> ApiResult<Value> {
    serde_json::to_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn login(&self, username: &str, password: &str) -> ApiResult<AuthMessage> {
        let body = to_body(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        self.post(&["login"], Some(body)).await
    }

    async fn signup(&self, request: &SignupRequest) -> ApiResult<AuthMessage> {
        let body = to_body(request)?;
        self.post(&["signup"], Some(body)).await
    }

    async fn logout(&self) -> ApiResult<AuthMessage> {
        self.post(&["logout"], None).await
    }

    async fn check_login(&self) -> ApiResult<Session> {
        self.get(&["check_login"]).await
    }

    async fn get_user_id(&self) -> ApiResult<UserIdentity> {
        self.get(&["get_user_id"]).await
    }

    async fn debug_session(&self) -> ApiResult<Value> {
        self.get(&["debug_session"]).await
    }

    async fn live_prices(&self) -> ApiResult<Vec<PriceQuote>> {
        self.get(&["live_prices"]).await
    }

    async fn signal(&self, ticker: &str) -> ApiResult<Signal> {
        self.get(&["signal", ticker]).await
    }

    async fn metrics(&self, ticker: &str) -> ApiResult<Metrics> {
        self.get(&["metrics", ticker]).await
    }

    async fn candlestick(&self, symbol: &str, timeframe: &Timeframe) -> ApiResult<Vec<Candle>> {
        let mut url = self.endpoint(&["candlestick", symbol])?;
        url.query_pairs_mut()
            .append_pair("timeframe", timeframe.as_str());
        self.request(Method::GET, url, None).await
    }
}
