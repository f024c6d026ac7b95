//! Notification deduplication
//!
//! Two layers. A bounded seen-key set suppresses exact re-delivery of the
//! same OS notification (platforms re-post notifications when they update).
//! A time-windowed rule suppresses bank debit SMS that restate a payment
//! already captured through another channel, while keeping the SMS when it
//! is the only signal of the payment.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

use crate::models::{NotificationEvent, TransactionRecord};

/// How many recently seen keys are retained before the oldest is evicted.
pub const DEFAULT_CAPACITY: usize = 100;

/// Account-indicator vocabulary that marks a debit message as a bank
/// restatement rather than a primary payment notification.
const ACCOUNT_MARKERS: [&str; 6] = ["a/c", "acct", "account", "ending", "bank", "balance"];

/// Bounded set of recently seen notification keys, oldest evicted first.
///
/// Shared mutable state by design: the ingestion pipeline owns one instance
/// and callers serialize access to it.
#[derive(Debug)]
pub struct NotificationDeduper {
    capacity: usize,
    order: VecDeque<String>,
    seen: HashSet<String>,
}

impl NotificationDeduper {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    /// Stable key for one delivery of one notification.
    pub fn key_for(event: &NotificationEvent) -> String {
        let mut hasher = Sha256::new();
        hasher.update(event.source_app_id.as_bytes());
        hasher.update(event.title.as_bytes());
        hasher.update(event.text.as_bytes());
        hasher.update(event.posted_at.timestamp_millis().to_be_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn seen(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// Record a key, evicting the oldest entry once capacity is exceeded.
    pub fn remember(&mut self, key: String) {
        if self.seen.contains(&key) {
            return;
        }
        self.order.push_back(key.clone());
        self.seen.insert(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                debug!("Evicting oldest notification key");
                self.seen.remove(&oldest);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for NotificationDeduper {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a message reads like a bank debit restatement: "debited" plus an
/// account indicator ("a/c XX1234 debited Rs.10").
pub fn is_bank_restatement(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("debited") && ACCOUNT_MARKERS.iter().any(|m| lower.contains(m))
}

/// Whether `amount` was already recorded within `window` before `posted_at`.
/// Two independent payments of the same amount inside the window are
/// indistinguishable from a restatement and are suppressed as well.
pub fn restates_recent_amount(
    amount: &str,
    posted_at: DateTime<Utc>,
    window: Duration,
    recent: &[TransactionRecord],
) -> bool {
    let cutoff = posted_at - window;
    recent.iter().any(|tx| {
        tx.amount.as_deref() == Some(amount) && tx.posted_at >= cutoff && tx.posted_at <= posted_at
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, h, m, s).unwrap()
    }

    fn event(text: &str, posted_at: DateTime<Utc>) -> NotificationEvent {
        NotificationEvent {
            source_app_id: "com.google.android.apps.nbu.paisa.user".into(),
            title: "Payment".into(),
            text: text.into(),
            posted_at,
        }
    }

    fn recorded(amount: &str, posted_at: DateTime<Utc>) -> TransactionRecord {
        TransactionRecord {
            posted_at,
            amount: Some(amount.into()),
            merchant: None,
            category: None,
            attributed_app: None,
        }
    }

    #[test]
    fn test_same_delivery_is_seen_once() {
        let mut deduper = NotificationDeduper::new();
        let key = NotificationDeduper::key_for(&event("₹10 paid to X", at(10, 0, 0)));

        assert!(!deduper.seen(&key));
        deduper.remember(key.clone());
        assert!(deduper.seen(&key));

        // Re-remembering is a no-op
        deduper.remember(key.clone());
        assert_eq!(deduper.len(), 1);
    }

    #[test]
    fn test_different_post_time_is_a_different_key() {
        let a = NotificationDeduper::key_for(&event("₹10 paid to X", at(10, 0, 0)));
        let b = NotificationDeduper::key_for(&event("₹10 paid to X", at(10, 0, 1)));
        assert_ne!(a, b);
    }

    #[test]
    fn test_oldest_key_is_evicted_at_capacity() {
        let mut deduper = NotificationDeduper::with_capacity(3);
        for i in 0..4 {
            deduper.remember(format!("key-{}", i));
        }

        assert_eq!(deduper.len(), 3);
        assert!(!deduper.seen("key-0"));
        assert!(deduper.seen("key-1"));
        assert!(deduper.seen("key-3"));
    }

    #[test]
    fn test_bank_restatement_vocabulary() {
        assert!(is_bank_restatement("A/c XX1234 debited Rs.10"));
        assert!(is_bank_restatement(
            "Rs.500 debited from your account ending 2341"
        ));
        assert!(!is_bank_restatement("₹183 paid to Uber India using UPI"));
        // "debited" alone, with no account indicator, is not a restatement
        assert!(!is_bank_restatement("Rs.120 debited via UPI"));
    }

    #[test]
    fn test_restatement_suppressed_only_inside_window() {
        let recent = [recorded("10", at(10, 0, 0))];
        let window = Duration::minutes(3);

        assert!(restates_recent_amount("10", at(10, 2, 0), window, &recent));
        assert!(!restates_recent_amount("10", at(10, 4, 0), window, &recent));
        assert!(!restates_recent_amount("99", at(10, 2, 0), window, &recent));
    }

    #[test]
    fn test_restatement_with_no_match_is_kept() {
        assert!(!restates_recent_amount(
            "10",
            at(10, 2, 0),
            Duration::minutes(3),
            &[]
        ));
    }
}
