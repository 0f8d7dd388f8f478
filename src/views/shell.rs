//! App shell: session bootstrap, route guarding, auth flows and the theme.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::forms::{self, FormState, LoginForm, SignupForm};
use super::market::MarketView;
use super::render;
use super::signals::SignalsView;
use crate::config::DashboardConfig;
use crate::models::UserIdentity;
use crate::services::backend::{ApiResult, DashboardApi};
use crate::services::local_store::LocalStore;

pub const PRIMARY_COLOR: &str = "#4caf50";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    Signup,
    Market,
    Signals,
    Unknown(String),
}

impl Route {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let path = trimmed.strip_prefix('/').unwrap_or(trimmed);
        match path.trim_end_matches('/').to_lowercase().as_str() {
            "" => Route::Root,
            "login" => Route::Login,
            "signup" => Route::Signup,
            "market" => Route::Market,
            "signals" => Route::Signals,
            _ => Route::Unknown(raw.trim().to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Market => "/market",
            Route::Signals => "/signals",
            Route::Unknown(raw) => raw,
        }
    }

    /// Routes that need an authenticated session
    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Market | Route::Signals)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// Session check not answered yet
    Pending,
    Anonymous,
    Authenticated { username: Option<String> },
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            AuthState::Authenticated { username } => username.as_deref(),
            _ => None,
        }
    }
}

/// Resolve where a navigation to `route` lands for the given auth state
pub fn guard(route: &Route, auth: &AuthState) -> Route {
    match auth {
        AuthState::Pending => route.clone(),
        AuthState::Anonymous => match route {
            Route::Login | Route::Signup => route.clone(),
            _ => Route::Signup,
        },
        AuthState::Authenticated { .. } => match route {
            Route::Market | Route::Signals => route.clone(),
            _ => Route::Market,
        },
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn primary(&self) -> &'static str {
        PRIMARY_COLOR
    }

    pub fn background(&self) -> &'static str {
        match self {
            Theme::Light => "#ffffff",
            Theme::Dark => "#121212",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// The mounted page. Views own their timers, so replacing the page tears
/// the previous one down.
pub enum Page {
    Loading,
    Login(FormState),
    Signup(FormState),
    Market(MarketView),
    Signals(SignalsView),
    Failed(String),
}

impl Page {
    fn route(&self) -> Option<Route> {
        match self {
            Page::Login(_) => Some(Route::Login),
            Page::Signup(_) => Some(Route::Signup),
            Page::Market(_) => Some(Route::Market),
            Page::Signals(_) => Some(Route::Signals),
            Page::Loading | Page::Failed(_) => None,
        }
    }
}

pub struct AppShell {
    api: Arc<dyn DashboardApi>,
    local: LocalStore,
    config: DashboardConfig,
    auth: AuthState,
    bootstrapped: bool,
    /// Route asked for before the session check resolved
    requested: Route,
    route: Route,
    page: Page,
    theme: Theme,
}

impl AppShell {
    pub fn new(api: Arc<dyn DashboardApi>, local: LocalStore, config: DashboardConfig) -> Self {
        Self {
            api,
            local,
            config,
            auth: AuthState::Pending,
            bootstrapped: false,
            requested: Route::Root,
            route: Route::Root,
            page: Page::Loading,
            theme: Theme::default(),
        }
    }

    /// Ask the backend whether a session exists; only the first call does anything
    pub async fn bootstrap(&mut self) {
        if self.bootstrapped {
            return;
        }
        self.bootstrapped = true;

        self.auth = match self.api.check_login().await {
            Ok(session) if session.logged_in => {
                let username = session.username.or_else(|| self.local.load_username());
                info!(username = ?username, "Shell: existing session found");
                AuthState::Authenticated { username }
            }
            Ok(_) => {
                info!("Shell: no active session");
                AuthState::Anonymous
            }
            Err(e) => {
                warn!(error = %e, "Shell: session check failed, continuing anonymous");
                AuthState::Anonymous
            }
        };

        let target = guard(&self.requested, &self.auth);
        self.enter(target);
    }

    /// Navigate to `path`, re-validating the session for protected routes
    pub async fn navigate(&mut self, path: &str) {
        let route = Route::parse(path);
        if !self.bootstrapped {
            self.requested = route;
            self.bootstrap().await;
            return;
        }

        if route.is_protected() && self.auth.is_authenticated() {
            self.revalidate().await;
        }

        let target = guard(&route, &self.auth);
        if target != route {
            debug!(from = %route, to = %target, "Shell: redirected");
        }
        self.enter(target);
    }

    async fn revalidate(&mut self) {
        match self.api.check_login().await {
            Ok(session) if session.logged_in => {
                if let Some(username) = session.username {
                    self.auth = AuthState::Authenticated {
                        username: Some(username),
                    };
                }
            }
            Ok(_) => {
                info!("Shell: session no longer valid");
                self.auth = AuthState::Anonymous;
            }
            Err(e) if e.is_unauthorized() => {
                info!("Shell: session rejected by backend");
                self.auth = AuthState::Anonymous;
            }
            Err(e) => {
                warn!(error = %e, "Shell: session re-check failed, keeping cached state");
            }
        }
    }

    fn enter(&mut self, route: Route) {
        if self.route == route && self.page.route().as_ref() == Some(&route) {
            return;
        }

        // Drop the old page first so its timers stop before new ones start.
        self.page = Page::Loading;
        self.page = match &route {
            Route::Login => Page::Login(FormState::default()),
            Route::Signup => Page::Signup(FormState::default()),
            Route::Market => match MarketView::mount(self.api.clone(), self.config.poll_interval) {
                Ok(view) => Page::Market(view),
                Err(e) => {
                    error!(error = %e, "Shell: market view failed to mount");
                    Page::Failed(e.to_string())
                }
            },
            Route::Signals => {
                match SignalsView::mount(self.api.clone(), self.config.progress_interval) {
                    Ok(view) => Page::Signals(view),
                    Err(e) => {
                        error!(error = %e, "Shell: signals view failed to mount");
                        Page::Failed(e.to_string())
                    }
                }
            }
            Route::Root | Route::Unknown(_) => Page::Failed(format!("No page at {}", route)),
        };
        info!(route = %route, "Shell: entered route");
        self.route = route;
    }

    /// Submit the login form; on success the shell lands on `/market`
    pub async fn login(&mut self, form: LoginForm) -> Result<(), String> {
        if let Page::Login(state) = &mut self.page {
            state.loading = true;
            state.error = None;
        }

        match forms::submit_login(self.api.as_ref(), &form).await {
            Ok(username) => {
                if let Err(e) = self.local.save_username(&username) {
                    warn!(error = %e, "Shell: could not persist username");
                }
                self.bootstrapped = true;
                self.auth = AuthState::Authenticated {
                    username: Some(username),
                };
                self.enter(Route::Market);
                Ok(())
            }
            Err(message) => {
                if let Page::Login(state) = &mut self.page {
                    state.loading = false;
                    state.error = Some(message.clone());
                }
                Err(message)
            }
        }
    }

    /// Submit the signup form; on success the page shows the redirect notice
    pub async fn signup(&mut self, form: SignupForm) -> Result<&'static str, String> {
        if let Page::Signup(state) = &mut self.page {
            state.loading = true;
            state.error = None;
            state.notice = None;
        }

        let result = forms::submit_signup(self.api.as_ref(), &form).await;
        if let Page::Signup(state) = &mut self.page {
            state.loading = false;
            match &result {
                Ok(notice) => state.notice = Some(notice.to_string()),
                Err(message) => state.error = Some(message.clone()),
            }
        }
        result
    }

    /// Wait out the redirect delay after a successful signup, then go to `/login`
    pub async fn complete_signup_redirect(&mut self) -> bool {
        let pending = matches!(&self.page, Page::Signup(state) if state.notice.is_some());
        if !pending {
            return false;
        }
        tokio::time::sleep(self.config.signup_redirect_delay).await;
        let target = guard(&Route::Login, &self.auth);
        self.enter(target);
        true
    }

    /// Log out; local state is reset even if the backend call fails
    pub async fn logout(&mut self) {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "Shell: logout request failed");
        }

        self.auth = AuthState::Anonymous;
        if let Err(e) = self.local.clear() {
            warn!(error = %e, "Shell: could not clear stored username");
        }
        self.page = Page::Loading;
        self.enter(Route::Login);
        info!("Shell: logged out");
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggle();
        self.theme
    }

    pub async fn user_identity(&self) -> ApiResult<UserIdentity> {
        self.api.get_user_id().await
    }

    pub async fn debug_session(&self) -> ApiResult<serde_json::Value> {
        self.api.debug_session().await
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn market(&self) -> Option<&MarketView> {
        match &self.page {
            Page::Market(view) => Some(view),
            _ => None,
        }
    }

    pub fn market_mut(&mut self) -> Option<&mut MarketView> {
        match &mut self.page {
            Page::Market(view) => Some(view),
            _ => None,
        }
    }

    pub fn signals(&self) -> Option<&SignalsView> {
        match &self.page {
            Page::Signals(view) => Some(view),
            _ => None,
        }
    }

    pub fn signals_mut(&mut self) -> Option<&mut SignalsView> {
        match &mut self.page {
            Page::Signals(view) => Some(view),
            _ => None,
        }
    }

    /// Tear down the mounted page, stopping every timer it owns
    pub fn shutdown(&mut self) {
        self.page = Page::Loading;
        info!("Shell: shut down");
    }

    /// Current screen as text
    pub fn render(&self) -> String {
        if self.auth == AuthState::Pending {
            return render::loading_screen();
        }

        let mut out = render::nav_bar(self.theme, &self.auth, &self.route);
        out.push('\n');
        let body = match &self.page {
            Page::Loading => render::loading_screen(),
            Page::Login(state) => render::login_screen(state),
            Page::Signup(state) => render::signup_screen(state),
            Page::Market(view) => {
                render::market_screen(&view.snapshot(), view.chart_snapshot().as_ref())
            }
            Page::Signals(view) => render::signals_screen(&view.snapshot()),
            Page::Failed(message) => format!("Error: {}\n", message),
        };
        out.push_str(&body);
        out
    }
}
