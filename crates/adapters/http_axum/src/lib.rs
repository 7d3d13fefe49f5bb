//! # techhome-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **REST JSON API**: devices, rooms, automations, auth,
//!   analytics, and the remote-hub bridge
//! - Authenticate requests via bearer access tokens (the [`extract`]
//!   module); most read/write endpoints accept anonymous callers the way
//!   the mobile clients expect, auth-sensitive ones do not
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application errors into HTTP status codes (the [`error`] module)
//!
//! ## Dependency rule
//! Depends on `techhome-app` (for port traits and services) and
//! `techhome-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod extract;
pub mod router;
pub mod state;
