//! Faultrix dashboard gateway.
//!
//! Terminates dashboard authentication at the edge: the organization API key
//! lives only in the HttpOnly `fx_session` cookie, the auth gateway routes
//! manage that cookie, and the reverse proxy injects the key into every
//! backend call. Serves `/auth-gateway/*`, `/proxy/*`, `/healthz`, and
//! optionally the built dashboard.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
