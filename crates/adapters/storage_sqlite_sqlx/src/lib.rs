//! # techhome-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `techhome-app::ports`
//! - Manage the `SQLite` connection pool lifecycle
//! - Run database migrations (sqlx embedded migrations)
//! - Map between domain types and database rows (structured payloads such
//!   as automation conditions/actions are stored as JSON text columns)
//!
//! ## Dependency rule
//! Depends on `techhome-app` (for port traits) and `techhome-domain` (for
//! domain types). The `app` and `domain` crates must never reference this
//! adapter.

pub mod automation_repo;
pub mod device_log_repo;
pub mod device_repo;
pub mod error;
pub mod pool;
pub mod refresh_token_repo;
pub mod room_repo;
pub mod user_repo;

pub use automation_repo::SqliteAutomationRepository;
pub use device_log_repo::SqliteDeviceLogRepository;
pub use device_repo::SqliteDeviceRepository;
pub use pool::{Config, Database};
pub use refresh_token_repo::SqliteRefreshTokenRepository;
pub use room_repo::SqliteRoomRepository;
pub use user_repo::SqliteUserRepository;
