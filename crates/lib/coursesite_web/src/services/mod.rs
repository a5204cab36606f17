//! Request-independent helpers used by handlers.

pub mod accounts;
pub mod cookies;
