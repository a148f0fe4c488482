//! # pothub-adapter-http-axum
//!
//! HTTP adapter using axum.
//!
//! ## Responsibilities
//! - Expose the pot CRUD and moisture operations as a JSON REST API
//! - Resolve the authenticated owner from the identity gateway's header
//! - Map domain errors to the documented status codes and envelope shape
//!
//! Authentication itself happens upstream; this adapter only trusts the
//! owner id the gateway injects (see [`auth::Owner`]).
//!
//! ## Dependency rule
//! Depends on `pothub-app` and `pothub-domain`. Never imported by them.

pub mod api;
pub mod auth;
pub mod error;
pub mod router;
pub mod state;
