//! Credential pair model, secret redaction, and the credential header contract.

pub mod pair;
pub mod request;
pub mod secret;

pub use pair::*;
pub use request::*;
pub use secret::*;

/// Header carrying the session identifier on every authenticated request.
pub const SESSION_ID_HEADER: &str = "x-session-id";
/// Header carrying the refresh identifier on every authenticated request.
pub const REFRESH_ID_HEADER: &str = "x-refresh-id";
