//! Authentication (who is calling) and authorization (what they may do).
pub mod authorize;
pub mod credentials;
