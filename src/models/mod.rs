//! View models exchanged with the backend API.

pub mod market;
pub mod session;
pub mod signal;

pub use market::{Candle, ChartPoint, PriceQuote, Timeframe};
pub use session::{AuthMessage, LoginRequest, Session, SignupRequest, UserIdentity};
pub use signal::{Metrics, Signal};
