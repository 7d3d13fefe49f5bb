//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod analytics_service;
pub mod auth_service;
pub mod automation_service;
pub mod device_service;
pub mod room_service;
