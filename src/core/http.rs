//! Development backend using Axum.
//!
//! Serves every endpoint the dashboard consumes from in-memory accounts and
//! the deterministic synthetic market, so the client runs without the real
//! backend.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use rand::Rng;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, info, warn, Level};

use crate::models::{
    Candle, LoginRequest, Metrics, PriceQuote, Session, Signal, SignupRequest, Timeframe,
    UserIdentity,
};
use crate::services::backend::ErrorBody;
use crate::services::synthetic::SyntheticMarket;
use crate::signals::{run_backtest, SignalEngine, INITIAL_CASH};
use crate::views::forms::SignupForm;

pub const SESSION_COOKIE: &str = "session";
/// Random bytes per session token
pub const TOKEN_BYTES: usize = 32;
/// Daily closes fed to the signal engine and the backtest
pub const HISTORY_DAYS: usize = 250;

type HandlerResult<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

fn reject(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

/// In-memory account, kept for the lifetime of the process.
///
/// The password is kept as submitted and compared verbatim. This backend is a
/// local development stand-in only; never expose it or reuse real passwords
/// with it.
#[derive(Clone)]
struct Account {
    id: i64,
    username: String,
    email: String,
    password: String,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
struct SessionEntry {
    user_id: i64,
    username: String,
}

#[derive(Default)]
pub struct Accounts {
    users: Vec<Account>,
    sessions: HashMap<String, SessionEntry>,
    next_id: i64,
}

impl Accounts {
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[derive(Clone)]
pub struct BackendState {
    pub accounts: Arc<RwLock<Accounts>>,
    pub market: Arc<SyntheticMarket>,
    pub start_time: Arc<Instant>,
}

impl BackendState {
    pub fn new(market: SyntheticMarket) -> Self {
        Self {
            accounts: Arc::new(RwLock::new(Accounts::default())),
            market: Arc::new(market),
            start_time: Arc::new(Instant::now()),
        }
    }

    async fn session(&self, headers: &HeaderMap) -> Option<SessionEntry> {
        let token = session_token(headers)?;
        self.accounts.read().await.sessions.get(&token).cloned()
    }
}

impl Default for BackendState {
    fn default() -> Self {
        Self::new(SyntheticMarket::default())
    }
}

/// Fresh session token: [`TOKEN_BYTES`] bytes from the thread-local CSPRNG, hex encoded
pub fn issue_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Value of the `session` cookie, if the request carries one
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

fn expired_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE)
}

fn with_cookie(body: Value, cookie: String) -> Response {
    let mut response = Json(body).into_response();
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        Err(e) => warn!(error = %e, "Dev backend: invalid cookie header"),
    }
    response
}

pub async fn health_check(State(state): State<BackendState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "service": "stocksignal-dev-backend"
    }))
}

async fn signup(
    State(state): State<BackendState>,
    Json(request): Json<SignupRequest>,
) -> HandlerResult<(StatusCode, Json<Value>)> {
    let form = SignupForm::new(
        request.username.clone(),
        request.email.clone(),
        request.password.clone(),
        request.confirm_password.clone(),
    );
    form.validate()
        .map_err(|e| reject(StatusCode::BAD_REQUEST, e.to_string()))?;

    let request = form.to_request();
    let mut accounts = state.accounts.write().await;
    let taken = accounts.users.iter().any(|user| {
        user.username == request.username || user.email.eq_ignore_ascii_case(&request.email)
    });
    if taken {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "Username or email already exists",
        ));
    }

    accounts.next_id += 1;
    let id = accounts.next_id;
    accounts.users.push(Account {
        id,
        username: request.username.clone(),
        email: request.email,
        password: request.password,
    });
    info!(user_id = id, username = %request.username, "Dev backend: user created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully" })),
    ))
}

async fn login(
    State(state): State<BackendState>,
    Json(request): Json<LoginRequest>,
) -> HandlerResult<Response> {
    let mut accounts = state.accounts.write().await;
    let account = accounts
        .users
        .iter()
        .find(|user| user.username == request.username && user.password == request.password)
        .cloned()
        .ok_or_else(|| {
            debug!(username = %request.username, "Dev backend: rejected login");
            reject(StatusCode::UNAUTHORIZED, "Invalid username or password")
        })?;

    // One live session per user; logging in again replaces the old one.
    accounts
        .sessions
        .retain(|_, entry| entry.user_id != account.id);
    let token = issue_token();
    accounts.sessions.insert(
        token.clone(),
        SessionEntry {
            user_id: account.id,
            username: account.username.clone(),
        },
    );
    info!(user_id = account.id, "Dev backend: login");

    Ok(with_cookie(
        json!({ "message": "Login successful" }),
        session_cookie(&token),
    ))
}

async fn logout(State(state): State<BackendState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.accounts.write().await.sessions.remove(&token);
    }
    with_cookie(json!({ "message": "Logged out" }), expired_cookie())
}

async fn check_login(
    State(state): State<BackendState>,
    headers: HeaderMap,
) -> (StatusCode, Json<Session>) {
    match state.session(&headers).await {
        Some(entry) => (
            StatusCode::OK,
            Json(Session {
                logged_in: true,
                username: Some(entry.username),
                user_id: Some(entry.user_id),
            }),
        ),
        None => (StatusCode::UNAUTHORIZED, Json(Session::anonymous())),
    }
}

async fn get_user_id(
    State(state): State<BackendState>,
    headers: HeaderMap,
) -> HandlerResult<Json<UserIdentity>> {
    let entry = state
        .session(&headers)
        .await
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Not logged in"))?;
    Ok(Json(UserIdentity {
        user_id: Some(entry.user_id),
        username: Some(entry.username),
    }))
}

async fn debug_session(State(state): State<BackendState>, headers: HeaderMap) -> Json<Value> {
    let cookie_present = session_token(&headers).is_some();
    let session = match state.session(&headers).await {
        Some(entry) => json!({ "user_id": entry.user_id, "username": entry.username }),
        None => json!({}),
    };
    Json(json!({
        "session": session,
        "cookie_present": cookie_present,
    }))
}

async fn live_prices(State(state): State<BackendState>) -> Json<Vec<PriceQuote>> {
    Json(state.market.quotes(Utc::now()))
}

fn known_symbol(state: &BackendState, raw: &str) -> HandlerResult<String> {
    let symbol = raw.trim().to_uppercase();
    if !state.market.knows(&symbol) {
        return Err(reject(
            StatusCode::NOT_FOUND,
            format!("Historical data for {} not found", symbol),
        ));
    }
    Ok(symbol)
}

async fn signal(
    State(state): State<BackendState>,
    Path(symbol): Path<String>,
) -> HandlerResult<Json<Signal>> {
    let symbol = known_symbol(&state, &symbol)?;
    let closes = state.market.daily_closes(&symbol, HISTORY_DAYS, Utc::now());
    let signal = SignalEngine::evaluate(&symbol, &closes).ok_or_else(|| {
        reject(
            StatusCode::BAD_REQUEST,
            "Not enough data to generate signal",
        )
    })?;
    debug!(symbol = %symbol, signal = %signal.signal, "Dev backend: signal generated");
    Ok(Json(signal))
}

async fn metrics(
    State(state): State<BackendState>,
    Path(symbol): Path<String>,
) -> HandlerResult<Json<Metrics>> {
    let symbol = known_symbol(&state, &symbol)?;
    let closes = state.market.daily_closes(&symbol, HISTORY_DAYS, Utc::now());
    let result = run_backtest(&closes, INITIAL_CASH).ok_or_else(|| {
        reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            "No backtest data found",
        )
    })?;
    Ok(Json(result.to_metrics(&symbol, INITIAL_CASH)))
}

#[derive(Debug, Deserialize)]
struct CandleQuery {
    timeframe: Option<String>,
}

async fn candlestick(
    State(state): State<BackendState>,
    Path(symbol): Path<String>,
    Query(params): Query<CandleQuery>,
) -> HandlerResult<Json<Vec<Candle>>> {
    let symbol = known_symbol(&state, &symbol)?;
    let timeframe = params
        .timeframe
        .as_deref()
        .map(Timeframe::parse)
        .unwrap_or_default();
    Ok(Json(state.market.candles(&symbol, &timeframe, Utc::now())))
}

pub fn create_router(state: BackendState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/check_login", get(check_login))
        .route("/get_user_id", get(get_user_id))
        .route("/debug_session", get(debug_session))
        .route("/live_prices", get(live_prices))
        .route("/signal/{symbol}", get(signal))
        .route("/metrics/{symbol}", get(metrics))
        .route("/candlestick/{symbol}", get(candlestick))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Serve the router on an already bound listener
pub async fn serve(
    listener: TcpListener,
    state: BackendState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);
    axum::serve(listener, app).await?;
    Ok(())
}

pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!(port = port, "Dev backend listening on port {}", port);
    serve(listener, BackendState::default()).await
}
