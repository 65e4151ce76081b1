// HTTP front end for emotrack
// Account endpoints behind the session access gate; runs on any host that can
// bind a TCP port.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod password;
pub mod store;

pub use app::{router, AppState};
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use store::{InMemoryUserStore, NewUser, StoreError, UserProfile, UserRecord, UserStore};
