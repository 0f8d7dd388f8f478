//! Backend access: the API trait, its HTTP client, local persistence and the
//! synthetic data used by the dev backend.

pub mod backend;
pub mod client;
pub mod local_store;
pub mod synthetic;

pub use backend::{ApiError, ApiResult, DashboardApi, ErrorBody};
pub use client::ApiClient;
pub use local_store::LocalStore;
pub use synthetic::SyntheticMarket;
