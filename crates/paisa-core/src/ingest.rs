//! Ingestion pipeline
//!
//! Wires parsing, deduplication, learned aliases, and correlation together
//! for one notification at a time. Every collaborator input (usage sessions
//! around the payment, recently recorded transactions, a learned alias for
//! the merchant) is resolved by the caller and passed in; the pipeline
//! performs no I/O of its own.

use chrono::Duration;
use tracing::{debug, info};

use crate::correlate::CorrelationEngine;
use crate::dedup::{self, NotificationDeduper};
use crate::error::Result;
use crate::knowledge;
use crate::models::{
    AppUsageSession, Confidence, CorrelationResult, MerchantAlias, NotificationEvent,
    ParsedTransaction, TransactionRecord,
};
use crate::parse::TransactionParser;

/// Verdict on an amount-bearing message with no clear payment verb: real
/// payment, or promo/offer noise?
///
/// Implemented by the host against whatever enrichment backend it runs.
/// The pipeline treats an error as "not a payment" and drops the message.
pub trait PaymentVerifier {
    fn is_real_payment(&self, text: &str) -> Result<bool>;
}

/// Verbs that mark money leaving the account. "credited" and "received"
/// are income, not expenses, and are intentionally absent.
const PAYMENT_VERBS: [&str; 11] = [
    "paid",
    "sent",
    "debited",
    "transferred",
    "payment successful",
    "payment of",
    "transaction",
    "txn",
    "withdrawn",
    "charged",
    "deducted",
];

/// Why an event was dropped without producing a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty or whitespace-only body
    BlankText,
    /// Posted by a system surface (launcher, keyboard), never a payment source
    IrrelevantSource,
    /// Exact re-delivery of an already-processed notification
    DuplicateKey,
    /// Bank debit restating an amount captured moments earlier
    DuplicateRestatement,
    /// Amount-bearing text with no payment verb that verification declined
    NotAPayment,
}

/// Outcome of running one notification through the pipeline.
#[derive(Debug)]
pub enum Outcome {
    Skipped(SkipReason),
    /// Captured, but no amount found: stored as a plain notification, not a
    /// transaction
    Recorded { parsed: ParsedTransaction },
    /// A monetary event with its attribution
    Payment {
        parsed: ParsedTransaction,
        correlation: CorrelationResult,
    },
}

/// One-notification-at-a-time ingestion. Owns the dedup state; everything
/// else it touches is read-only.
pub struct IngestPipeline<'a> {
    parser: TransactionParser,
    engine: CorrelationEngine,
    deduper: NotificationDeduper,
    verifier: Option<&'a dyn PaymentVerifier>,
    /// Window in which a bank debit restating an identical amount is
    /// treated as a duplicate signal
    restatement_window: Duration,
}

impl<'a> IngestPipeline<'a> {
    pub fn new() -> Self {
        Self {
            parser: TransactionParser::new(),
            engine: CorrelationEngine::new(),
            deduper: NotificationDeduper::new(),
            verifier: None,
            restatement_window: Duration::minutes(3),
        }
    }

    pub fn with_verifier(verifier: &'a dyn PaymentVerifier) -> Self {
        Self {
            verifier: Some(verifier),
            ..Self::new()
        }
    }

    pub fn with_engine(engine: CorrelationEngine) -> Self {
        Self {
            engine,
            ..Self::new()
        }
    }

    pub fn with_engine_and_verifier(
        engine: CorrelationEngine,
        verifier: &'a dyn PaymentVerifier,
    ) -> Self {
        Self {
            engine,
            verifier: Some(verifier),
            ..Self::new()
        }
    }

    /// Process one notification.
    ///
    /// `sessions` are the usage sessions around the event (the caller
    /// queries its store for the correlation window), `recent` the already
    /// recorded transactions near the event, and `alias` a learned override
    /// for the parsed merchant, if the caller found one.
    pub fn process(
        &mut self,
        event: &NotificationEvent,
        sessions: &[AppUsageSession],
        recent: &[TransactionRecord],
        alias: Option<&MerchantAlias>,
    ) -> Outcome {
        if event.text.trim().is_empty() {
            return Outcome::Skipped(SkipReason::BlankText);
        }
        if !knowledge::is_relevant(&event.source_app_id) {
            return Outcome::Skipped(SkipReason::IrrelevantSource);
        }

        let key = NotificationDeduper::key_for(event);
        if self.deduper.seen(&key) {
            debug!("Skipping re-delivered notification from {}", event.source_app_id);
            return Outcome::Skipped(SkipReason::DuplicateKey);
        }
        self.deduper.remember(key);

        // Promo gate: an amount with no payment verb is usually an offer
        // ("Get ₹201 off"), not an expense. An injected verifier gets the
        // final word; without one, or on error, the message is dropped.
        let lower = event.text.to_lowercase();
        if self.parser.mentions_amount(&event.text)
            && !PAYMENT_VERBS.iter().any(|verb| lower.contains(verb))
        {
            let verified = match self.verifier {
                Some(verifier) => verifier.is_real_payment(&event.text).unwrap_or(false),
                None => false,
            };
            if !verified {
                debug!("Amount without payment verb, not verified as a payment");
                return Outcome::Skipped(SkipReason::NotAPayment);
            }
        }

        let parsed = self.parser.parse(&event.text);

        if let Some(amount) = parsed.amount.as_deref() {
            if dedup::is_bank_restatement(&event.text)
                && dedup::restates_recent_amount(
                    amount,
                    event.posted_at,
                    self.restatement_window,
                    recent,
                )
            {
                debug!("Bank SMS restates amount {} captured moments earlier", amount);
                return Outcome::Skipped(SkipReason::DuplicateRestatement);
            }
        }

        if !parsed.is_payment() {
            return Outcome::Recorded { parsed };
        }

        // A learned alias short-circuits scoring entirely.
        if let Some(alias) = alias {
            let category = alias.effective_category().to_string();
            info!(
                "Applying learned category '{}' for {}",
                category, alias.merchant_name
            );
            let correlation = CorrelationResult {
                app_name: None,
                app_id: None,
                category: category.clone(),
                confidence: Confidence::Learned,
                reason: format!("Merchant previously categorized as {} by the user", category),
            };
            return Outcome::Payment {
                parsed,
                correlation,
            };
        }

        let correlation = self.engine.correlate(event, &parsed, sessions);
        Outcome::Payment {
            parsed,
            correlation,
        }
    }
}

impl Default for IngestPipeline<'_> {
    fn default() -> Self {
        Self::new()
    }
}
