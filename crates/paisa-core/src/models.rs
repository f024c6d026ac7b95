//! Domain models for Paisa

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One notification as delivered by the platform's notification stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Identifier of the app that posted the notification
    pub source_app_id: String,
    pub title: String,
    pub text: String,
    pub posted_at: DateTime<Utc>,
}

/// Structured payment data extracted from one notification's text.
///
/// All fields are optional because not every notification carries payment
/// info. The amount keeps its thousands separators exactly as written;
/// numeric interpretation is the consumer's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    /// e.g. "183", "1,460.00"
    pub amount: Option<String>,
    /// e.g. "Uber India", "RAMESH FAST FOOD"
    pub merchant: Option<String>,
    /// e.g. "UPI", "Card", "Net Banking"
    pub channel: Option<String>,
}

impl ParsedTransaction {
    /// An extracted amount is what makes an event a monetary event. Without
    /// one, nothing downstream treats this as a transaction.
    pub fn is_payment(&self) -> bool {
        self.amount.is_some()
    }

    /// Numeric value of the amount; missing or malformed amounts count as zero.
    pub fn amount_value(&self) -> f64 {
        amount_value(self.amount.as_deref())
    }
}

/// Parse an amount string ("1,460.00") to a number. Anything unparseable
/// contributes zero rather than failing the batch it appears in.
pub fn amount_value(amount: Option<&str>) -> f64 {
    amount
        .map(|a| a.replace(',', "").parse::<f64>().unwrap_or(0.0))
        .unwrap_or(0.0)
}

/// One foreground session of a single app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppUsageSession {
    /// App identifier, e.g. "com.application.zomato"
    pub app_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AppUsageSession {
    /// Build a session. A session that ends before it starts is a bug in the
    /// producer, not data to tolerate.
    pub fn new(
        app_id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidSession(format!(
                "session ends at {} before it starts at {}",
                end, start
            )));
        }
        Ok(Self {
            app_id: app_id.into(),
            start,
            end,
        })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// How trustworthy an automatic category/app attribution is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    /// Applied from a learned merchant alias instead of scoring
    Learned,
    /// Set directly by the user
    User,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Learned => "learned",
            Self::User => "user",
        }
    }
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            "learned" => Ok(Self::Learned),
            "user" => Ok(Self::User),
            _ => Err(format!("Unknown confidence: {}", s)),
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Subscription billing frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The answer to "why did this payment happen?". Computed once per payment;
/// re-running correlation produces a fresh value, never a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Friendly app name, e.g. "Zomato". None for offline purchases.
    pub app_name: Option<String>,
    /// App identifier, e.g. "com.application.zomato". None for offline purchases.
    pub app_id: Option<String>,
    /// e.g. "Food Delivery", "Transport", "Offline Purchase"
    pub category: String,
    pub confidence: Confidence,
    /// Human-readable explanation, displayable as-is
    pub reason: String,
}

/// A learned category override. Owned by the host's store; this crate only
/// reads it, via `normalized_name` lookups resolved by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantAlias {
    /// Original spelling, e.g. "RAMESH CHOWMEIN"
    pub merchant_name: String,
    /// Unique lookup key (lowercase, trimmed)
    pub normalized_name: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub user_note: Option<String>,
    pub times_used: i64,
    pub last_used_at: DateTime<Utc>,
}

impl MerchantAlias {
    /// The category this alias applies: the subcategory when present, else
    /// the top-level category.
    pub fn effective_category(&self) -> &str {
        self.subcategory.as_deref().unwrap_or(&self.category)
    }
}

/// A recurring subscription record, keyed by normalized merchant name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub merchant_name: String,
    /// Unique upsert key
    pub normalized_name: String,
    pub average_amount: f64,
    pub frequency: Frequency,
    pub confidence: Confidence,
    pub last_charged_at: DateTime<Utc>,
    pub next_expected_at: DateTime<Utc>,
    pub times_detected: i64,
}

/// The transaction-history tuple collaborators feed back into the core:
/// what was parsed, when it was posted, and what it was attributed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub posted_at: DateTime<Utc>,
    /// Amount as parsed, separators preserved. None = not a transaction.
    pub amount: Option<String>,
    pub merchant: Option<String>,
    pub category: Option<String>,
    /// Friendly name of the app the payment was attributed to, if any
    pub attributed_app: Option<String>,
}

impl TransactionRecord {
    /// Numeric value of the amount; missing or malformed amounts count as zero.
    pub fn amount_value(&self) -> f64 {
        amount_value(self.amount.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 14, h, m, 0).unwrap()
    }

    #[test]
    fn test_amount_value_handles_separators_and_garbage() {
        assert_eq!(amount_value(Some("183")), 183.0);
        assert_eq!(amount_value(Some("1,460.00")), 1460.0);
        assert_eq!(amount_value(Some("forty")), 0.0);
        assert_eq!(amount_value(None), 0.0);
    }

    #[test]
    fn test_session_rejects_end_before_start() {
        let err = AppUsageSession::new("com.ubercab", at(10, 5), at(10, 0));
        assert!(err.is_err());

        let ok = AppUsageSession::new("com.ubercab", at(10, 0), at(10, 5)).unwrap();
        assert_eq!(ok.duration(), Duration::minutes(5));
    }

    #[test]
    fn test_confidence_wire_form_is_lowercase() {
        let json = serde_json::to_string(&Confidence::Learned).unwrap();
        assert_eq!(json, "\"learned\"");
        let back: Confidence = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(back, Confidence::High);
    }

    #[test]
    fn test_frequency_round_trips_through_strings() {
        for freq in [Frequency::Weekly, Frequency::Monthly, Frequency::Yearly] {
            let parsed: Frequency = freq.as_str().parse().unwrap();
            assert_eq!(parsed, freq);
        }
        assert!("fortnightly".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_alias_effective_category_prefers_subcategory() {
        let mut alias = MerchantAlias {
            merchant_name: "RAMESH CHOWMEIN".into(),
            normalized_name: "ramesh chowmein".into(),
            category: "Food".into(),
            subcategory: Some("Street Food".into()),
            user_note: None,
            times_used: 1,
            last_used_at: at(9, 0),
        };
        assert_eq!(alias.effective_category(), "Street Food");
        alias.subcategory = None;
        assert_eq!(alias.effective_category(), "Food");
    }
}
