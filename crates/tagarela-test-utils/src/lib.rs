// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Tagarela integration tests.
//!
//! Provides mock collaborators and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Mock completion provider with scripted outcomes
//! - [`MockSender`] - Mock operator sender with message capture
//! - [`TestHarness`] - Full conversation stack over the mocks

pub mod harness;
pub mod mock_provider;
pub mod mock_sender;

pub use harness::{TestHarness, message, reply};
pub use mock_provider::MockProvider;
pub use mock_sender::{MockSender, SentMessage};
