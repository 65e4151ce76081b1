//! Authentication module: identity tokens and credential resolution
//!
//! Stateless: nothing here is persisted, and the only shared value is the
//! signing secret held inside [`TokenCodec`].

pub mod types;
pub mod codec;
pub mod resolver;

pub use codec::{IssuedToken, TokenCodec};
pub use resolver::{Credentials, Resolution, SessionResolver};
pub use types::{Identity, Role, Subject, TokenClaims};
