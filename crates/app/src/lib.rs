//! # techhome-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceRepository`, `RoomRepository` — CRUD for devices and rooms
//!   - `AutomationRepository` — CRUD plus the enabled-rule query
//!   - `UserRepository`, `RefreshTokenRepository` — account storage
//!   - `DeviceLogRepository` — usage log writes and aggregation queries
//!   - `HubClient` — commands against the remote home-automation hub
//!   - `EventPublisher` — in-process change notifications
//! - Provide **application services** (device, room, automation, auth,
//!   analytics) that orchestrate domain objects through the ports
//! - Host the **automation core**: the [`scheduler`] that mirrors enabled
//!   time rules as recurring jobs, and the [`executor`] that applies a
//!   rule's action to its target device when a job fires
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `techhome-domain` plus runtime-neutral crates (`tokio::sync`,
//! token/password hashing). Never imports adapter crates. Adapters depend
//! on *this* crate, not the reverse.

pub mod event_bus;
pub mod executor;
pub mod jwt;
pub mod ports;
pub mod scheduler;
pub mod services;
