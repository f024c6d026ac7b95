//! Payment-to-app correlation
//!
//! For each payment the engine answers: which app most likely caused it?
//! Usage sessions inside a lookback window are scored on recognition,
//! session length, and recency; the highest score wins. With no candidate
//! sessions at all, the payment is treated as an offline purchase and
//! categorized from its text alone.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::knowledge;
use crate::models::{
    AppUsageSession, Confidence, CorrelationResult, NotificationEvent, ParsedTransaction,
};

/// Scoring weights and windows for the correlation engine.
///
/// With the defaults, a recognized transactional app used for a minute and
/// closed just before the payment scores 50 + 30 + 20 + 20 = 120, the
/// maximum attainable.
#[derive(Debug, Clone)]
pub struct CorrelationConfig {
    /// Lookback window before the payment in which sessions are candidates
    pub window: Duration,
    /// Bonus for an app the knowledge base recognizes
    pub known_app_bonus: i32,
    /// Extra bonus when the recognized app's category is transactional
    pub transactional_bonus: i32,
    /// (minimum session seconds, bonus) tiers, checked top-down
    pub duration_tiers: [(i64, i32); 3],
    /// Bonus for sessions shorter than every duration tier
    pub brief_session_bonus: i32,
    /// (maximum end-to-payment gap seconds, bonus) tiers, checked top-down;
    /// gaps beyond the last tier earn nothing
    pub recency_tiers: [(i64, i32); 3],
    /// Minimum score mapped to high confidence
    pub high_confidence_score: i32,
    /// Minimum score mapped to medium confidence
    pub medium_confidence_score: i32,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            window: Duration::minutes(10),
            known_app_bonus: 50,
            transactional_bonus: 30,
            duration_tiers: [(60, 20), (30, 15), (10, 10)],
            brief_session_bonus: 5,
            recency_tiers: [(60, 20), (180, 10), (600, 5)],
            high_confidence_score: 80,
            medium_confidence_score: 40,
        }
    }
}

impl CorrelationConfig {
    /// Reject configurations that cannot produce meaningful results. These
    /// are programmer errors and propagate.
    pub fn validate(&self) -> Result<()> {
        if self.window <= Duration::zero() {
            return Err(Error::InvalidConfig(format!(
                "correlation window must be positive, got {}",
                self.window
            )));
        }
        if self.medium_confidence_score > self.high_confidence_score {
            return Err(Error::InvalidConfig(format!(
                "medium confidence cutoff {} exceeds high cutoff {}",
                self.medium_confidence_score, self.high_confidence_score
            )));
        }
        Ok(())
    }
}

/// Keyword buckets for categorizing offline purchases, tried in order.
/// The first bucket with any keyword present in merchant + text wins.
const CATEGORY_KEYWORDS: [(&str, &[&str]); 7] = [
    (
        "Food",
        &[
            "zomato", "swiggy", "food", "restaurant", "cafe", "pizza", "burger", "chowmein",
            "biryani", "chai", "tea", "coffee", "bakery", "dhaba", "kitchen", "meals", "tiffin",
            "juice", "eat",
        ],
    ),
    (
        "Transport",
        &[
            "uber", "ola", "rapido", "cab", "auto", "ride", "trip", "metro", "bus", "transport",
            "parking", "petrol", "diesel", "fuel",
        ],
    ),
    (
        "Shopping",
        &[
            "amazon", "flipkart", "myntra", "shop", "store", "mart", "retail", "mall", "bazaar",
            "market",
        ],
    ),
    (
        "Groceries",
        &[
            "bigbasket",
            "zepto",
            "blinkit",
            "grocery",
            "vegetables",
            "fruits",
            "kirana",
            "supermarket",
        ],
    ),
    (
        "Utilities / Bills",
        &[
            "electricity",
            "water",
            "gas",
            "bill",
            "recharge",
            "airtel",
            "jio",
            "vodafone",
            "bsnl",
            "broadband",
            "wifi",
            "insurance",
            "emi",
        ],
    ),
    (
        "Healthcare",
        &[
            "hospital",
            "medical",
            "pharmacy",
            "medicine",
            "doctor",
            "clinic",
            "health",
            "lab",
            "diagnostic",
        ],
    ),
    (
        "Entertainment",
        &[
            "movie",
            "cinema",
            "pvr",
            "inox",
            "netflix",
            "hotstar",
            "spotify",
            "subscription",
        ],
    ),
];

/// Guess a category from merchant name and notification text alone. Used
/// when no app session explains the payment.
pub fn guess_category(merchant: Option<&str>, text: &str) -> String {
    let combined = format!(
        "{} {}",
        merchant.unwrap_or("").to_lowercase(),
        text.to_lowercase()
    );

    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|k| combined.contains(k)) {
            return category.to_string();
        }
    }
    "Offline Purchase".to_string()
}

/// Attributes a payment to the most likely causal app session.
pub struct CorrelationEngine {
    config: CorrelationConfig,
}

impl CorrelationEngine {
    pub fn new() -> Self {
        Self {
            config: CorrelationConfig::default(),
        }
    }

    pub fn with_config(config: CorrelationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CorrelationConfig {
        &self.config
    }

    /// Correlate one payment with the usage sessions around it.
    ///
    /// `sessions` may be broader than the lookback window; the engine
    /// filters to sessions overlapping the window and to relevant apps.
    /// Never fails: an empty candidate set becomes an offline purchase, an
    /// unrecognized winner is still attributed by its raw identifier.
    pub fn correlate(
        &self,
        event: &NotificationEvent,
        parsed: &ParsedTransaction,
        sessions: &[AppUsageSession],
    ) -> CorrelationResult {
        let payment_time = event.posted_at;
        let window_start = payment_time - self.config.window;

        let candidates: Vec<&AppUsageSession> = sessions
            .iter()
            .filter(|s| s.end >= window_start && s.start <= payment_time)
            .filter(|s| knowledge::is_relevant(&s.app_id))
            .collect();

        debug!(
            "Found {} relevant session(s) in {}-minute window",
            candidates.len(),
            self.config.window.num_minutes()
        );

        if candidates.is_empty() {
            let category = guess_category(parsed.merchant.as_deref(), &event.text);
            debug!("No app activity, treating as offline purchase ({})", category);

            return CorrelationResult {
                app_name: None,
                app_id: None,
                category,
                confidence: Confidence::Low,
                reason: format!(
                    "No app activity found in the {}-minute window; likely offline purchase",
                    self.config.window.num_minutes()
                ),
            };
        }

        // Strict > keeps the first-seen session on ties.
        let mut winner = candidates[0];
        let mut winner_score = self.score(winner, payment_time);
        for &session in candidates.iter().skip(1) {
            let score = self.score(session, payment_time);
            if score > winner_score {
                winner = session;
                winner_score = score;
            }
        }

        let info = knowledge::lookup(&winner.app_id);
        let app_name = knowledge::display_name(&winner.app_id);
        let category = info
            .map(|i| i.category.to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let confidence = if winner_score >= self.config.high_confidence_score {
            Confidence::High
        } else if winner_score >= self.config.medium_confidence_score {
            Confidence::Medium
        } else {
            Confidence::Low
        };

        let duration_secs = winner.duration().num_seconds();
        let reason = format!(
            "Used {} for {}s before the payment (score: {})",
            app_name, duration_secs, winner_score
        );

        debug!(
            "Winner: {} ({}) with score {} -> {}",
            app_name, category, winner_score, confidence
        );

        CorrelationResult {
            app_name: Some(app_name),
            app_id: Some(winner.app_id.clone()),
            category,
            confidence,
            reason,
        }
    }

    /// Score one session as the likely cause of a payment at `payment_time`.
    fn score(&self, session: &AppUsageSession, payment_time: DateTime<Utc>) -> i32 {
        let mut score = 0;

        if let Some(info) = knowledge::lookup(&session.app_id) {
            score += self.config.known_app_bonus;
            if knowledge::is_transactional(info.category) {
                score += self.config.transactional_bonus;
            }
        }

        let duration_secs = session.duration().num_seconds();
        score += self
            .config
            .duration_tiers
            .iter()
            .find(|(min_secs, _)| duration_secs >= *min_secs)
            .map(|(_, bonus)| *bonus)
            .unwrap_or(self.config.brief_session_bonus);

        // A session still open at payment time has a non-positive gap and
        // lands in the tightest recency tier.
        let gap_secs = (payment_time - session.end).num_seconds();
        score += self
            .config
            .recency_tiers
            .iter()
            .find(|(max_secs, _)| gap_secs < *max_secs)
            .map(|(_, bonus)| *bonus)
            .unwrap_or(0);

        score
    }
}

impl Default for CorrelationEngine {
    fn default() -> Self {
        Self::new()
    }
}
