//! HTTP API: session handling, the authorization gate and agency-scoped routes.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
pub mod session;
