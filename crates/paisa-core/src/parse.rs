//! Notification text parsing
//!
//! Payment notifications follow a handful of phrasings. Real examples:
//!
//! ```text
//! ₹183 paid to Uber India using UPI
//! Payment of Rs.120.00 to RAMESH FAST FOOD via UPI
//! Sent ₹500 to Amit Kumar on Google Pay
//! INR 1,460.00 debited from A/c XX2341 to RELIANCE RETAIL
//! Rs 247 paid to Zomato Ltd UPI Ref: 423456789
//! Dear Customer, Rs.2500 has been debited from your account for UPI txn to SWIGGY
//! ```
//!
//! Extraction runs three independent passes: a currency-marked amount, a
//! merchant found by an ordered rule list (first non-empty capture wins),
//! and a payment-channel keyword. Each pass that finds nothing yields None;
//! parsing itself never fails.

use regex::Regex;

use crate::models::ParsedTransaction;

/// Extracts amount, merchant, and payment channel from raw notification
/// text. Compile once, parse many; the rules hold no other state, so a
/// parser is a pure function of its input.
pub struct TransactionParser {
    /// Currency marker before the digits ("₹183", "Rs.120.00", "INR 1,460.00")
    /// in group 1, or a trailing currency word ("183 rupees") in group 2.
    amount: Regex,
    /// Preposition rule: "to"/"for" + lazy run, stopped by a channel or
    /// reference marker. Requires a stop marker or trailing whitespace, so
    /// names at the very end of the string fall through to `merchant_tail`.
    merchant: Regex,
    /// Bank-statement rule: "txn/transaction/transfer to X", stopped by a
    /// date, balance marker, or end of string.
    bank_merchant: Regex,
    /// Last resort: "to <name>" anchored at the end of the string.
    merchant_tail: Regex,
    /// Marks a capture from the preposition rule that swallowed bank
    /// phrasing whole ("UPI txn to SWIGGY") and needs re-extraction.
    bank_phrase: Regex,
    /// Payment channel vocabulary, first hit wins.
    channel: Regex,
    trailing_punct: Regex,
    whitespace: Regex,
    /// Cheap gate: does this text mention a currency amount at all?
    has_amount: Regex,
}

impl TransactionParser {
    pub fn new() -> Self {
        Self {
            amount: Regex::new(
                r"(?i)(?:₹|Rs\.?\s?|INR)\s*([\d,]+\.?\d*)|(\d[\d,]*\.?\d*)\s*(?:₹|Rs\.?|INR|rupees?)",
            )
            .expect("valid regex"),
            merchant: Regex::new(
                r"(?i)(?:paid |sent |debited .+?|payment .+?)?(?:to|for)\s+(.+?)(?:\s+(?:using|via|on|through|UPI|Ref|$))",
            )
            .expect("valid regex"),
            bank_merchant: Regex::new(
                r"(?i)(?:txn|transaction|transfer)\s+(?:to|for)\s+([A-Za-z][\w\s@.\-]+?)(?:\s+(?:on|Ref|Avl|\d{2}[-/])|\s*$)",
            )
            .expect("valid regex"),
            merchant_tail: Regex::new(r"(?i)(?:to|for)\s+([A-Za-z@][\w\s@.]+)$")
                .expect("valid regex"),
            bank_phrase: Regex::new(r"(?i)(?:txn|transaction)\s+to\s").expect("valid regex"),
            channel: Regex::new(
                r"(?i)(UPI|NEFT|IMPS|RTGS|Net Banking|Debit Card|Credit Card|Card|Google Pay|GPay|PhonePe|Paytm|Amazon Pay)",
            )
            .expect("valid regex"),
            trailing_punct: Regex::new(r"[.\-,;:!]+$").expect("valid regex"),
            whitespace: Regex::new(r"\s+").expect("valid regex"),
            has_amount: Regex::new(
                r"(?i)(?:₹|Rs\.?\s?|INR)\s*[\d,]+|[\d,]+\s*(?:₹|Rs\.?|INR|rupees?)",
            )
            .expect("valid regex"),
        }
    }

    /// Parse one notification body. Fields that cannot be located are None.
    pub fn parse(&self, text: &str) -> ParsedTransaction {
        ParsedTransaction {
            amount: self.extract_amount(text),
            merchant: self.extract_merchant(text),
            channel: self
                .channel
                .find(text)
                .map(|m| m.as_str().to_string()),
        }
    }

    /// Whether the text mentions a currency amount at all. Used by the
    /// ingestion pipeline to separate promos from payments before parsing.
    pub fn mentions_amount(&self, text: &str) -> bool {
        self.has_amount.is_match(text)
    }

    fn extract_amount(&self, text: &str) -> Option<String> {
        let caps = self.amount.captures(text)?;
        // Group 1 = currency marker before the digits, group 2 = after
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }

    fn extract_merchant(&self, text: &str) -> Option<String> {
        let mut merchant = self
            .merchant
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string());

        // The preposition rule happily captures "UPI txn to SWIGGY" whole;
        // when the capture still contains bank phrasing, re-extract with the
        // bank rule.
        if let Some(ref captured) = merchant {
            if self.bank_phrase.is_match(captured) {
                if let Some(bank) = self.capture_first(&self.bank_merchant, text) {
                    merchant = Some(bank);
                }
            }
        }

        if merchant.as_deref().is_none_or(str::is_empty) {
            merchant = self.capture_first(&self.bank_merchant, text);
        }
        if merchant.as_deref().is_none_or(str::is_empty) {
            merchant = self.capture_first(&self.merchant_tail, text);
        }

        let raw = merchant?;
        let stripped = self.trailing_punct.replace(&raw, "");
        let collapsed = self.whitespace.replace_all(&stripped, " ");
        let cleaned = collapsed.trim();
        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned.to_string())
        }
    }

    fn capture_first(&self, rule: &Regex, text: &str) -> Option<String> {
        rule.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    }
}

impl Default for TransactionParser {
    fn default() -> Self {
        Self::new()
    }
}
