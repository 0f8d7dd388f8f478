//! Dashboard views. Each view owns its `watch` store and the tasks feeding it.

pub mod chart;
pub mod forms;
pub mod market;
pub mod render;
pub mod shell;
pub mod signals;

pub use chart::{ChartState, ChartView};
pub use forms::{FormError, FormState, LoginForm, SignupForm};
pub use market::{MarketPhase, MarketState, MarketView};
pub use shell::{guard, AppShell, AuthState, Page, Route, Theme};
pub use signals::{SignalsState, SignalsView};
