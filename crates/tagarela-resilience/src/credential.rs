// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential state tracking.
//!
//! The tracker changes state only when a call outcome is observed. While the
//! key is known to be invalid, calls are short-circuited except for one probe
//! per probe interval, so a fixed key is noticed without hammering the
//! upstream with a broken one.
//!
//! Every method that depends on the clock has an `_at` variant taking `now`
//! explicitly; the plain variants use `Utc::now()`.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tagarela_config::model::ResilienceConfig;
use tagarela_core::{TagarelaError, UpstreamFailure};
use tracing::{info, warn};

use crate::classifier::is_credential_fault;

/// Default wait, in seconds, before a probe is allowed through an invalid key.
pub const DEFAULT_PROBE_INTERVAL_SECS: i64 = 300;

/// What the guard decided for an outgoing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeDecision {
    /// Key is believed valid; call normally.
    Proceed,
    /// Key is believed invalid but the probe interval elapsed; this call is the probe.
    Probe,
}

/// Immutable view of the tracker state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialSnapshot {
    pub valid: bool,
    pub last_error: Option<String>,
    pub last_failure_at: Option<DateTime<Utc>>,
    pub last_check: Option<DateTime<Utc>>,
    pub notified: bool,
}

/// Tracks whether the upstream access key currently works.
#[derive(Debug)]
pub struct CredentialTracker {
    valid: bool,
    last_error: Option<String>,
    last_failure_at: Option<DateTime<Utc>>,
    last_check: Option<DateTime<Utc>>,
    /// Set once the operator has been told about the current invalid period.
    notified: bool,
    probe_interval: TimeDelta,
}

impl Default for CredentialTracker {
    fn default() -> Self {
        Self::new(TimeDelta::seconds(DEFAULT_PROBE_INTERVAL_SECS))
    }
}

impl CredentialTracker {
    /// Create a tracker that assumes the key is valid until told otherwise.
    pub fn new(probe_interval: TimeDelta) -> Self {
        Self {
            valid: true,
            last_error: None,
            last_failure_at: None,
            last_check: None,
            notified: false,
            probe_interval,
        }
    }

    pub fn from_config(config: &ResilienceConfig) -> Self {
        let secs = i64::try_from(config.probe_interval_secs).unwrap_or(i64::MAX);
        Self::new(TimeDelta::try_seconds(secs).unwrap_or(TimeDelta::MAX))
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Gate an outgoing call.
    pub fn check(&mut self) -> Result<ProbeDecision, TagarelaError> {
        self.check_at(Utc::now())
    }

    /// Gate an outgoing call at `now`.
    ///
    /// Returns a `Credential` error while the key is invalid and the probe
    /// interval has not elapsed since the last check. When it has elapsed,
    /// the last check time moves to `now` and exactly one probe is allowed.
    pub fn check_at(&mut self, now: DateTime<Utc>) -> Result<ProbeDecision, TagarelaError> {
        if self.valid {
            return Ok(ProbeDecision::Proceed);
        }

        let due = match self.last_check {
            Some(last) => now.signed_duration_since(last) >= self.probe_interval,
            None => true,
        };

        if due {
            self.last_check = Some(now);
            info!("probing upstream with previously rejected credential");
            return Ok(ProbeDecision::Probe);
        }

        Err(TagarelaError::Credential {
            message: self
                .last_error
                .clone()
                .unwrap_or_else(|| "credential invalid".to_string()),
        })
    }

    /// Observe a failed call. Returns `true` when it was a credential fault.
    pub fn record_failure(&mut self, failure: &UpstreamFailure) -> bool {
        self.record_failure_at(failure, Utc::now())
    }

    /// Observe a failed call at `now`.
    ///
    /// Only credential faults change state; transient failures say nothing
    /// about the key.
    pub fn record_failure_at(&mut self, failure: &UpstreamFailure, now: DateTime<Utc>) -> bool {
        if !is_credential_fault(failure) {
            return false;
        }

        if self.valid {
            warn!(status = ?failure.status, "upstream credential rejected");
        }
        self.valid = false;
        self.last_error = Some(failure.message.clone());
        self.last_failure_at = Some(now);
        self.last_check = Some(now);
        true
    }

    /// Observe a successful call.
    pub fn record_success(&mut self) {
        self.record_success_at(Utc::now());
    }

    /// Observe a successful call at `now`.
    ///
    /// The notified flag resets only on an invalid to valid transition.
    pub fn record_success_at(&mut self, now: DateTime<Utc>) {
        if !self.valid {
            info!("upstream credential accepted again");
            self.notified = false;
        }
        self.valid = true;
        self.last_error = None;
        self.last_check = Some(now);
    }

    /// Claim the right to alert the operator about the current invalid period.
    ///
    /// Returns the last error message the first time it is called while the
    /// key is invalid, and `None` afterwards until the key recovers.
    pub fn claim_notification(&mut self) -> Option<String> {
        if self.valid || self.notified {
            return None;
        }
        self.notified = true;
        Some(
            self.last_error
                .clone()
                .unwrap_or_else(|| "credential invalid".to_string()),
        )
    }

    pub fn snapshot(&self) -> CredentialSnapshot {
        CredentialSnapshot {
            valid: self.valid,
            last_error: self.last_error.clone(),
            last_failure_at: self.last_failure_at,
            last_check: self.last_check,
            notified: self.notified,
        }
    }
}
