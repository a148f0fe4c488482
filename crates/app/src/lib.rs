//! # pothub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `PotStore` — ownership-scoped persistence for pots and their history
//!   - `UserDirectory` — the owner's reciprocal pot-id list
//!   - `CommandPublisher` — outbound pub/sub messages
//! - Define **driving/inbound ports** as use-case structs:
//!   - `PotService` — owner-scoped CRUD, latest-moisture query, pot-list fan-out
//!   - `MoistureService` — fire-and-forget check dispatch and reply ingestion
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `pothub-domain` only (plus `tokio` for spawning fan-out tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse; transport handles are injected at construction rather than
//! reached through process-wide globals.

pub mod ports;
pub mod services;
