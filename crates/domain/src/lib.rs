//! # techhome-domain
//!
//! Pure domain model for the techhome smart-home backend.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** (lights, thermostats, … — locally managed or
//!   mirrored to an external hub)
//! - Define **Rooms** (logical groupings for devices)
//! - Define **Automation rules** (condition → action definitions with an
//!   enabled flag)
//! - Define **Users** and refresh-token records for account management
//! - Define **Device logs** (who did what to which device, when)
//! - Define **Events** (in-process change notifications)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod device;
pub mod device_log;
pub mod event;
pub mod room;
pub mod user;
