// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilience primitives for upstream calls.
//!
//! - [`classifier`] decides whether an upstream failure is a credential fault.
//! - [`credential`] remembers whether the access key currently works and gates
//!   calls while it does not.
//! - [`throttle`] caps operator alerts per calendar day.

pub mod classifier;
pub mod credential;
pub mod throttle;

pub use classifier::is_credential_fault;
pub use credential::{CredentialSnapshot, CredentialTracker, ProbeDecision};
pub use throttle::{NotificationBudget, NotificationThrottler, ThrottleDecision};
