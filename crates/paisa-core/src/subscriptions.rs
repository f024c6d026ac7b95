//! Recurring-subscription detection
//!
//! Finds merchants that charge a stable amount on a regular cadence:
//! Netflix on the 1st of every month, a weekly tiffin service, a yearly
//! domain renewal. Groups transaction history by normalized merchant name,
//! rejects groups whose amounts wobble or whose gaps fit no known cadence,
//! and predicts the next charge for the rest.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Confidence, Frequency, Subscription, TransactionRecord};

/// Services that are overwhelmingly billed as subscriptions. A normalized
/// merchant name containing one of these tokens raises detection confidence.
const KNOWN_SUBSCRIPTIONS: [&str; 29] = [
    "netflix",
    "spotify",
    "youtube",
    "hotstar",
    "prime",
    "amazonprime",
    "zee5",
    "sonyliv",
    "jiocinema",
    "apple",
    "icloud",
    "googleone",
    "linkedin",
    "medium",
    "notion",
    "figma",
    "canva",
    "adobe",
    "chatgpt",
    "openai",
    "github",
    "dropbox",
    "evernote",
    "airtel",
    "jio",
    "vodafone",
    "bsnl",
    "tatasky",
    "dth",
];

/// Thresholds for subscription detection.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Trailing history window considered
    pub history_window: Duration,
    /// Minimum amount-bearing transactions overall before detection runs
    pub min_history: usize,
    /// Minimum charges to one merchant to call it recurring
    pub min_occurrences: usize,
    /// Maximum allowed amount spread, as (max - min) / mean
    pub amount_variance: f64,
    /// Mean-gap band in days classified as weekly, inclusive
    pub weekly_gap_days: (f64, f64),
    /// Mean-gap band in days classified as monthly, inclusive
    pub monthly_gap_days: (f64, f64),
    /// Mean-gap band in days classified as yearly, inclusive
    pub yearly_gap_days: (f64, f64),
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            history_window: Duration::days(90),
            min_history: 4,
            min_occurrences: 2,
            amount_variance: 0.15,
            weekly_gap_days: (5.0, 9.0),
            monthly_gap_days: (20.0, 40.0),
            yearly_gap_days: (340.0, 400.0),
        }
    }
}

impl DetectorConfig {
    /// Reject configurations that cannot produce meaningful results.
    pub fn validate(&self) -> Result<()> {
        if self.history_window <= Duration::zero() {
            return Err(Error::InvalidConfig(format!(
                "history window must be positive, got {}",
                self.history_window
            )));
        }
        if self.amount_variance <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "amount variance must be positive, got {}",
                self.amount_variance
            )));
        }
        if self.min_occurrences < 2 {
            return Err(Error::InvalidConfig(
                "at least 2 occurrences are needed to call anything recurring".into(),
            ));
        }
        Ok(())
    }
}

/// A recurring pattern found in transaction history.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedSubscription {
    /// Merchant as first seen, e.g. "Netflix"
    pub merchant_name: String,
    /// Stable grouping key
    pub normalized_name: String,
    pub average_amount: f64,
    pub frequency: Frequency,
    pub confidence: Confidence,
    pub occurrences: usize,
    pub last_charged_at: DateTime<Utc>,
    pub next_expected_at: DateTime<Utc>,
}

impl DetectedSubscription {
    /// Apply this detection to the host's store: refresh the charge cursor
    /// on an existing record, or build a new one. The store itself is
    /// external; this only computes the row to write.
    pub fn merge_into(&self, existing: Option<&Subscription>) -> Subscription {
        match existing {
            Some(sub) => Subscription {
                last_charged_at: self.last_charged_at,
                next_expected_at: self.next_expected_at,
                times_detected: sub.times_detected + 1,
                ..sub.clone()
            },
            None => Subscription {
                merchant_name: self.merchant_name.clone(),
                normalized_name: self.normalized_name.clone(),
                average_amount: self.average_amount,
                frequency: self.frequency,
                confidence: self.confidence,
                last_charged_at: self.last_charged_at,
                next_expected_at: self.next_expected_at,
                times_detected: self.occurrences as i64,
            },
        }
    }
}

/// Detects recurring subscriptions in transaction history.
pub struct SubscriptionDetector {
    config: DetectorConfig,
}

impl SubscriptionDetector {
    pub fn new() -> Self {
        Self {
            config: DetectorConfig::default(),
        }
    }

    pub fn with_config(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Analyze transaction history as of `now` and return detected
    /// subscriptions, most frequently charged first.
    pub fn detect(
        &self,
        transactions: &[TransactionRecord],
        now: DateTime<Utc>,
    ) -> Vec<DetectedSubscription> {
        let cutoff = now - self.config.history_window;
        let recent: Vec<&TransactionRecord> = transactions
            .iter()
            .filter(|tx| tx.amount.is_some() && tx.posted_at >= cutoff)
            .collect();

        if recent.len() < self.config.min_history {
            debug!(
                "Not enough transactions for subscription detection ({} of {})",
                recent.len(),
                self.config.min_history
            );
            return Vec::new();
        }

        let mut groups: HashMap<String, Vec<&TransactionRecord>> = HashMap::new();
        for &tx in &recent {
            let key = normalize_merchant(tx.merchant.as_deref().unwrap_or("unknown"));
            groups.entry(key).or_default().push(tx);
        }

        let mut detected = Vec::new();
        for (normalized, group) in groups {
            // Keys this short ("ab", "7") no longer identify a merchant
            if normalized.len() <= 2 {
                continue;
            }
            if let Some(sub) = self.analyze_group(&normalized, &group) {
                detected.push(sub);
            }
        }

        detected.sort_by(|a, b| {
            b.occurrences
                .cmp(&a.occurrences)
                .then_with(|| a.normalized_name.cmp(&b.normalized_name))
        });
        detected
    }

    fn analyze_group(
        &self,
        normalized: &str,
        group: &[&TransactionRecord],
    ) -> Option<DetectedSubscription> {
        if group.len() < self.config.min_occurrences {
            return None;
        }

        let amounts: Vec<f64> = group
            .iter()
            .filter_map(|tx| tx.amount.as_deref())
            .filter_map(|a| a.replace(',', "").parse::<f64>().ok())
            .collect();
        if amounts.is_empty() {
            return None;
        }

        let mean = amounts.iter().sum::<f64>() / amounts.len() as f64;
        let min = amounts.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = amounts.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let spread = if mean > 0.0 { (max - min) / mean } else { 1.0 };
        if spread > self.config.amount_variance {
            debug!(
                "Skipping {}: amount spread too high ({:.2})",
                normalized, spread
            );
            return None;
        }

        let mut timestamps: Vec<DateTime<Utc>> = group.iter().map(|tx| tx.posted_at).collect();
        timestamps.sort();
        let gaps: Vec<f64> = timestamps
            .windows(2)
            .map(|w| (w[1] - w[0]).num_seconds() as f64 / 86_400.0)
            .collect();
        if gaps.is_empty() {
            return None;
        }

        let mean_gap_days = gaps.iter().sum::<f64>() / gaps.len() as f64;
        let frequency = match self.classify_gap(mean_gap_days) {
            Some(freq) => freq,
            None => {
                debug!(
                    "Skipping {}: irregular cadence ({:.1} days)",
                    normalized, mean_gap_days
                );
                return None;
            }
        };

        let known = KNOWN_SUBSCRIPTIONS.iter().any(|k| normalized.contains(k));
        let confidence = match (known, group.len() >= 3) {
            (true, true) => Confidence::High,
            (false, false) => Confidence::Low,
            _ => Confidence::Medium,
        };

        let last_charged_at = *timestamps.last()?;
        let mean_gap = Duration::seconds((mean_gap_days * 86_400.0) as i64);
        let next_expected_at = last_charged_at + mean_gap;

        let merchant_name = group
            .iter()
            .find_map(|tx| tx.merchant.clone())
            .unwrap_or_else(|| normalized.to_string());

        debug!(
            "Detected subscription: {} ~{:.0} {} ({})",
            merchant_name, mean, frequency, confidence
        );

        Some(DetectedSubscription {
            merchant_name,
            normalized_name: normalized.to_string(),
            average_amount: mean,
            frequency,
            confidence,
            occurrences: group.len(),
            last_charged_at,
            next_expected_at,
        })
    }

    fn classify_gap(&self, mean_gap_days: f64) -> Option<Frequency> {
        let within = |(lo, hi): (f64, f64)| mean_gap_days >= lo && mean_gap_days <= hi;
        if within(self.config.weekly_gap_days) {
            Some(Frequency::Weekly)
        } else if within(self.config.monthly_gap_days) {
            Some(Frequency::Monthly)
        } else if within(self.config.yearly_gap_days) {
            Some(Frequency::Yearly)
        } else {
            None
        }
    }
}

impl Default for SubscriptionDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Reduce a merchant string to its lowercase ASCII alphanumerics, the
/// stable grouping and lookup key. "Netflix.com" and "NETFLIX COM" both
/// become "netflixcom".
pub fn normalize_merchant(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Total monthly cost of a set of subscriptions, with weekly and yearly
/// cadences normalized to a month (4.33 weeks per month).
pub fn monthly_burn(subscriptions: &[DetectedSubscription]) -> f64 {
    subscriptions
        .iter()
        .map(|sub| match sub.frequency {
            Frequency::Weekly => sub.average_amount * 4.33,
            Frequency::Monthly => sub.average_amount,
            Frequency::Yearly => sub.average_amount / 12.0,
        })
        .sum()
}
