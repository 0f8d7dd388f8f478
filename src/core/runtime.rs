//! Line-oriented terminal front end driving the app shell

use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::Timeframe;
use crate::views::forms::{LoginForm, SignupForm};
use crate::views::render;
use crate::views::shell::{AppShell, Route};

pub const HELP: &str = "\
Commands:
  login <user> <pass>                   sign in
  signup <user> <email> <pass> <pass>   create an account
  logout                                sign out
  go <route>                            open /login, /signup, /market or /signals
  market                                open the live market page
  watch [n]                             show the next n market updates
  chart <SYMBOL>                        open the candle chart for a symbol
  timeframe <1min|5min|1hr|1d>          change the chart timeframe
  close                                 close the chart
  signals                               open the signals page
  ticker <SYMBOL>                       set the signals ticker
  signal                                fetch the trading signal
  metrics                               run the backtest metrics
  theme                                 toggle light/dark theme
  whoami                                show the backend's user id
  debug                                 dump the backend session
  quit                                  exit
";

/// Configuration for the interactive runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub prompt: String,
    /// Longest wait for a fetch to settle before rendering anyway
    pub settle_timeout: Duration,
    pub default_watch_updates: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            settle_timeout: Duration::from_secs(10),
            default_watch_updates: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Login {
        username: String,
        password: String,
    },
    Signup {
        username: String,
        email: String,
        password: String,
        confirm_password: String,
    },
    Logout,
    Go(String),
    Market,
    Watch(Option<usize>),
    Chart(String),
    Timeframe(Timeframe),
    Close,
    Signals,
    Ticker(String),
    Signal,
    Metrics,
    Theme,
    WhoAmI,
    Debug,
    Quit,
}

impl Command {
    /// Parse one input line; `Ok(None)` for a blank line
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();
        let arg = |i: usize| args.get(i).map(|s| s.to_string()).unwrap_or_default();

        let command = match head.to_lowercase().as_str() {
            "help" | "?" => Command::Help,
            // Missing credentials are left empty for form validation to report.
            "login" => Command::Login {
                username: arg(0),
                password: arg(1),
            },
            "signup" => Command::Signup {
                username: arg(0),
                email: arg(1),
                password: arg(2),
                confirm_password: arg(3),
            },
            "logout" => Command::Logout,
            "go" => match args.first() {
                Some(path) => Command::Go(path.to_string()),
                None => return Err("usage: go <route>".to_string()),
            },
            "market" => Command::Market,
            "watch" => match args.first() {
                Some(raw) => match raw.parse::<usize>() {
                    Ok(n) => Command::Watch(Some(n)),
                    Err(_) => return Err(format!("invalid update count: {}", raw)),
                },
                None => Command::Watch(None),
            },
            "chart" => match args.first() {
                Some(symbol) => Command::Chart(symbol.to_string()),
                None => return Err("usage: chart <SYMBOL>".to_string()),
            },
            "timeframe" | "tf" => match args.first() {
                Some(raw) => Command::Timeframe(Timeframe::parse(raw)),
                None => return Err("usage: timeframe <1min|5min|1hr|1d>".to_string()),
            },
            "close" => Command::Close,
            "signals" => Command::Signals,
            "ticker" => Command::Ticker(arg(0)),
            "signal" => Command::Signal,
            "metrics" => Command::Metrics,
            "theme" => Command::Theme,
            "whoami" => Command::WhoAmI,
            "debug" => Command::Debug,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("unknown command: {} (try help)", other)),
        };
        Ok(Some(command))
    }
}

/// Result of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub output: String,
    pub quit: bool,
}

impl Reply {
    fn show(output: String) -> Self {
        Self {
            output,
            quit: false,
        }
    }
}

/// Wait until `done` holds for the watched state, or the timeout passes
async fn settle<T, F>(mut rx: watch::Receiver<T>, timeout: Duration, done: F) -> bool
where
    F: FnMut(&T) -> bool,
{
    matches!(
        tokio::time::timeout(timeout, rx.wait_for(done)).await,
        Ok(Ok(_))
    )
}

pub struct DashboardRuntime {
    shell: AppShell,
    config: RuntimeConfig,
}

impl DashboardRuntime {
    pub fn new(shell: AppShell, config: RuntimeConfig) -> Self {
        Self { shell, config }
    }

    pub fn shell(&self) -> &AppShell {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut AppShell {
        &mut self.shell
    }

    /// Resolve the session and land on the initial route
    pub async fn start(&mut self) -> String {
        self.shell.navigate(Route::Root.path()).await;
        self.settle_page().await;
        self.shell.render()
    }

    pub async fn execute(&mut self, command: Command) -> Reply {
        debug!(command = ?command, "Runtime: executing");
        match command {
            Command::Help => Reply::show(HELP.to_string()),
            Command::Login { username, password } => {
                if !self.shell.auth().is_authenticated() && self.shell.route() != &Route::Login {
                    self.shell.navigate(Route::Login.path()).await;
                }
                let outcome = self.shell.login(LoginForm::new(username, password)).await;
                self.settle_page().await;
                self.screen_with(outcome.err())
            }
            Command::Signup {
                username,
                email,
                password,
                confirm_password,
            } => {
                if !self.shell.auth().is_authenticated() && self.shell.route() != &Route::Signup {
                    self.shell.navigate(Route::Signup.path()).await;
                }
                let form = SignupForm::new(username, email, password, confirm_password);
                match self.shell.signup(form).await {
                    Ok(_) => {
                        let mut output = self.shell.render();
                        self.shell.complete_signup_redirect().await;
                        output.push('\n');
                        output.push_str(&self.shell.render());
                        Reply::show(output)
                    }
                    Err(message) => self.screen_with(Some(message)),
                }
            }
            Command::Logout => {
                self.shell.logout().await;
                Reply::show(self.shell.render())
            }
            Command::Go(path) => {
                self.shell.navigate(&path).await;
                self.settle_page().await;
                Reply::show(self.shell.render())
            }
            Command::Market => {
                self.shell.navigate(Route::Market.path()).await;
                self.settle_page().await;
                Reply::show(self.shell.render())
            }
            Command::Watch(count) => self.watch(count).await,
            Command::Chart(symbol) => {
                let Some(market) = self.shell.market_mut() else {
                    return self.screen_with(Some("Open the market page first".to_string()));
                };
                let rx = market.select(&symbol).subscribe();
                settle(rx, self.config.settle_timeout, |state| !state.loading).await;
                Reply::show(self.shell.render())
            }
            Command::Timeframe(timeframe) => {
                let Some(chart) = self.shell.market_mut().and_then(|m| m.chart_mut()) else {
                    return self.screen_with(Some("Open a chart first (chart <SYMBOL>)".to_string()));
                };
                if chart.set_timeframe(timeframe) {
                    let rx = chart.subscribe();
                    settle(rx, self.config.settle_timeout, |state| !state.loading).await;
                }
                Reply::show(self.shell.render())
            }
            Command::Close => {
                if let Some(market) = self.shell.market_mut() {
                    market.close_chart();
                }
                Reply::show(self.shell.render())
            }
            Command::Signals => {
                self.shell.navigate(Route::Signals.path()).await;
                Reply::show(self.shell.render())
            }
            Command::Ticker(ticker) => {
                let Some(signals) = self.shell.signals_mut() else {
                    return self.screen_with(Some("Open the signals page first".to_string()));
                };
                signals.set_ticker(&ticker);
                Reply::show(self.shell.render())
            }
            Command::Signal => {
                let Some(signals) = self.shell.signals_mut() else {
                    return self.screen_with(Some("Open the signals page first".to_string()));
                };
                if signals.fetch_signal() {
                    let rx = signals.subscribe();
                    settle(rx, self.config.settle_timeout, |state| !state.loading_signal).await;
                }
                Reply::show(self.shell.render())
            }
            Command::Metrics => {
                let Some(signals) = self.shell.signals_mut() else {
                    return self.screen_with(Some("Open the signals page first".to_string()));
                };
                if signals.fetch_metrics() {
                    let rx = signals.subscribe();
                    settle(rx, self.config.settle_timeout, |state| !state.loading_metrics).await;
                }
                Reply::show(self.shell.render())
            }
            Command::Theme => {
                let theme = self.shell.toggle_theme();
                info!(theme = theme.as_str(), "Runtime: theme toggled");
                Reply::show(self.shell.render())
            }
            Command::WhoAmI => match self.shell.user_identity().await {
                Ok(identity) => Reply::show(format!(
                    "user_id: {}\nusername: {}\n",
                    identity
                        .user_id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "N/A".to_string()),
                    identity.username.as_deref().unwrap_or("N/A")
                )),
                Err(e) => Reply::show(format!("! {}\n", e.message())),
            },
            Command::Debug => match self.shell.debug_session().await {
                Ok(value) => Reply::show(format!(
                    "{}\n",
                    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
                )),
                Err(e) => Reply::show(format!("! {}\n", e.message())),
            },
            Command::Quit => Reply {
                output: "Bye\n".to_string(),
                quit: true,
            },
        }
    }

    async fn watch(&mut self, count: Option<usize>) -> Reply {
        let count = count.unwrap_or(self.config.default_watch_updates);
        let Some(market) = self.shell.market() else {
            return self.screen_with(Some("Open the market page first".to_string()));
        };

        let mut rx = market.subscribe();
        rx.borrow_and_update();
        let mut output = String::new();
        for _ in 0..count {
            match tokio::time::timeout(self.config.settle_timeout, rx.changed()).await {
                Ok(Ok(())) => {
                    let state = rx.borrow_and_update().clone();
                    let chart = market.chart_snapshot();
                    output.push_str(&render::market_screen(&state, chart.as_ref()));
                    output.push('\n');
                }
                Ok(Err(_)) => break,
                Err(_) => {
                    output.push_str("! No market update before timeout\n");
                    break;
                }
            }
        }
        Reply::show(output)
    }

    /// Give a freshly mounted market page a chance to show its first poll
    async fn settle_page(&self) {
        if let Some(market) = self.shell.market() {
            settle(market.subscribe(), self.config.settle_timeout, |state| {
                !state.is_loading()
            })
            .await;
        }
    }

    fn screen_with(&self, message: Option<String>) -> Reply {
        let screen = self.shell.render();
        match message {
            Some(message) if !screen.contains(&message) => {
                Reply::show(format!("! {}\n{}", message, screen))
            }
            _ => Reply::show(screen),
        }
    }

    /// Read commands until `quit` or end of input, writing each screen
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let first = self.start().await;
        writer.write_all(first.as_bytes()).await?;

        let mut lines = reader.lines();
        loop {
            writer.write_all(self.config.prompt.as_bytes()).await?;
            writer.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            match Command::parse(&line) {
                Ok(Some(command)) => {
                    let reply = self.execute(command).await;
                    writer.write_all(reply.output.as_bytes()).await?;
                    if reply.quit {
                        break;
                    }
                }
                Ok(None) => {}
                Err(message) => {
                    warn!(input = %line, "Runtime: rejected command");
                    writer.write_all(format!("! {}\n", message).as_bytes()).await?;
                }
            }
        }

        self.shutdown();
        writer.flush().await
    }

    /// Stop every view timer
    pub fn shutdown(&mut self) {
        self.shell.shutdown();
    }
}
