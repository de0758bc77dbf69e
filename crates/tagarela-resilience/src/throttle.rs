// SPDX-FileCopyrightText: 2026 Tagarela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily cap on operator alerts.
//!
//! The counter resets whenever the calendar date (UTC) changes. Once the cap
//! is reached a single "limit reached" notice is allowed for the rest of the
//! day; it does not count against the cap.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tagarela_config::model::ResilienceConfig;
use tracing::{debug, warn};

/// Outcome of asking the throttler for permission to alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// Send the alert. It has been counted.
    Send,
    /// The cap was just hit; send the one-per-day limit notice instead.
    SendLimitNotice,
    /// Stay quiet until tomorrow.
    Suppress,
}

/// Snapshot of the daily budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotificationBudget {
    pub count: u32,
    pub max: u32,
    pub date: NaiveDate,
    pub limit_notice_sent: bool,
}

/// Per-day operator alert budget.
#[derive(Debug)]
pub struct NotificationThrottler {
    count: u32,
    max: u32,
    date: NaiveDate,
    limit_notice_sent: bool,
}

impl NotificationThrottler {
    pub fn new(max: u32) -> Self {
        Self::starting_on(max, Utc::now().date_naive())
    }

    /// Create a throttler whose current day is `date`.
    pub fn starting_on(max: u32, date: NaiveDate) -> Self {
        Self {
            count: 0,
            max,
            date,
            limit_notice_sent: false,
        }
    }

    pub fn from_config(config: &ResilienceConfig) -> Self {
        Self::new(config.max_notifications_per_day)
    }

    /// Whether another alert fits in today's budget.
    pub fn can_send(&mut self) -> bool {
        self.can_send_on(Utc::now().date_naive())
    }

    pub fn can_send_on(&mut self, today: NaiveDate) -> bool {
        self.maybe_reset(today);
        self.count < self.max
    }

    /// Count one sent alert. Never pushes the count past the cap.
    pub fn record_sent(&mut self) {
        self.record_sent_on(Utc::now().date_naive());
    }

    pub fn record_sent_on(&mut self, today: NaiveDate) {
        self.maybe_reset(today);
        if self.count < self.max {
            self.count += 1;
        }
    }

    /// Check, count, and pick the message kind in one step.
    pub fn decide(&mut self) -> ThrottleDecision {
        self.decide_on(Utc::now().date_naive())
    }

    pub fn decide_on(&mut self, today: NaiveDate) -> ThrottleDecision {
        if self.can_send_on(today) {
            self.record_sent_on(today);
            debug!(count = self.count, max = self.max, "operator alert allowed");
            return ThrottleDecision::Send;
        }

        if !self.limit_notice_sent {
            self.limit_notice_sent = true;
            warn!(max = self.max, "daily operator alert limit reached");
            return ThrottleDecision::SendLimitNotice;
        }

        ThrottleDecision::Suppress
    }

    pub fn budget(&self) -> NotificationBudget {
        NotificationBudget {
            count: self.count,
            max: self.max,
            date: self.date,
            limit_notice_sent: self.limit_notice_sent,
        }
    }

    fn maybe_reset(&mut self, today: NaiveDate) {
        if today != self.date {
            self.count = 0;
            self.limit_notice_sent = false;
            self.date = today;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn five_attempts_give_three_alerts_and_one_notice() {
        let mut throttler = NotificationThrottler::starting_on(3, day(1));
        let decisions: Vec<_> = (0..5).map(|_| throttler.decide_on(day(1))).collect();
        assert_eq!(
            decisions,
            vec![
                ThrottleDecision::Send,
                ThrottleDecision::Send,
                ThrottleDecision::Send,
                ThrottleDecision::SendLimitNotice,
                ThrottleDecision::Suppress,
            ]
        );
        assert_eq!(throttler.budget().count, 3);
    }

    #[test]
    fn date_change_resets_budget_and_notice() {
        let mut throttler = NotificationThrottler::starting_on(1, day(1));
        assert_eq!(throttler.decide_on(day(1)), ThrottleDecision::Send);
        assert_eq!(throttler.decide_on(day(1)), ThrottleDecision::SendLimitNotice);

        assert!(throttler.can_send_on(day(2)));
        let budget = throttler.budget();
        assert_eq!(budget.count, 0);
        assert_eq!(budget.date, day(2));
        assert!(!budget.limit_notice_sent);
    }

    #[test]
    fn record_sent_saturates_at_max() {
        let mut throttler = NotificationThrottler::starting_on(2, day(1));
        for _ in 0..5 {
            throttler.record_sent_on(day(1));
        }
        assert_eq!(throttler.budget().count, 2);
        assert!(!throttler.can_send_on(day(1)));
    }

    #[test]
    fn zero_max_only_sends_the_notice() {
        let mut throttler = NotificationThrottler::starting_on(0, day(1));
        assert_eq!(throttler.decide_on(day(1)), ThrottleDecision::SendLimitNotice);
        assert_eq!(throttler.decide_on(day(1)), ThrottleDecision::Suppress);
    }

    proptest! {
        #[test]
        fn count_never_exceeds_max(max in 0u32..10, attempts in 0usize..40) {
            let mut throttler = NotificationThrottler::starting_on(max, day(1));
            let mut notices = 0;
            for _ in 0..attempts {
                if throttler.decide_on(day(1)) == ThrottleDecision::SendLimitNotice {
                    notices += 1;
                }
                prop_assert!(throttler.budget().count <= max);
            }
            prop_assert!(notices <= 1);
        }
    }
}
