//! Paisa Core Library
//!
//! Pure classification, correlation, and detection engine behind the Paisa
//! expense tracker:
//! - Notification text parsing (amount / merchant / payment channel)
//! - Payment-to-app correlation with a keyword fallback for offline purchases
//! - Recurring-subscription detection over transaction history
//! - Bounded notification deduplication, including bank-restatement suppression
//! - Spending summaries (daily breakdown, top apps, need/want)
//!
//! Storage, notification capture, foreground-app polling, and AI enrichment
//! all live in the host application. This crate consumes their
//! already-resolved data and returns values; it performs no I/O and holds no
//! state beyond the dedup buffer the pipeline owns.

pub mod correlate;
pub mod dedup;
pub mod error;
pub mod ingest;
pub mod insights;
pub mod knowledge;
pub mod models;
pub mod parse;
pub mod subscriptions;

pub use correlate::{guess_category, CorrelationConfig, CorrelationEngine};
pub use dedup::{is_bank_restatement, restates_recent_amount, NotificationDeduper};
pub use error::{Error, Result};
pub use ingest::{IngestPipeline, Outcome, PaymentVerifier, SkipReason};
pub use insights::{
    daily_summary, guess_necessity, top_apps_by_spending, AppSpending, CategoryBreakdown,
    DailySummary, Necessity, TransactionItem,
};
pub use knowledge::AppInfo;
pub use models::{
    amount_value, AppUsageSession, Confidence, CorrelationResult, Frequency, MerchantAlias,
    NotificationEvent, ParsedTransaction, Subscription, TransactionRecord,
};
pub use parse::TransactionParser;
pub use subscriptions::{
    monthly_burn, normalize_merchant, DetectedSubscription, DetectorConfig, SubscriptionDetector,
};
