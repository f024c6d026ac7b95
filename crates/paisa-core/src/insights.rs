//! Spending summaries over recorded transactions
//!
//! Pure aggregation for the host's summary screens: a per-category daily
//! breakdown, top apps by spend, and a need/want heuristic. Amount strings
//! that fail numeric parsing contribute zero rather than aborting a batch.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::models::TransactionRecord;

/// Whether spending was essential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Necessity {
    Need,
    Want,
}

impl Necessity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Need => "need",
            Self::Want => "want",
        }
    }
}

impl std::fmt::Display for Necessity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One transaction inside a category breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionItem {
    pub amount: f64,
    pub merchant: String,
    pub posted_at: DateTime<Utc>,
    pub necessity: Option<Necessity>,
}

/// A single category with its total spend and individual transactions.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub total: f64,
    pub items: Vec<TransactionItem>,
}

/// Total spent plus breakdown by category, biggest spend first.
#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub total_spent: f64,
    pub categories: Vec<CategoryBreakdown>,
    pub transaction_count: usize,
}

/// Total spend attributed to one app.
#[derive(Debug, Clone, Serialize)]
pub struct AppSpending {
    pub app_name: String,
    pub total_spent: f64,
    pub transaction_count: usize,
    pub category: String,
}

/// Summarize one day's transactions by category. The caller selects the
/// day's slice; this only groups and sums it.
pub fn daily_summary(transactions: &[TransactionRecord]) -> DailySummary {
    if transactions.is_empty() {
        return DailySummary {
            total_spent: 0.0,
            categories: Vec::new(),
            transaction_count: 0,
        };
    }

    let mut grouped: HashMap<String, Vec<&TransactionRecord>> = HashMap::new();
    for tx in transactions {
        grouped
            .entry(display_category(tx.category.as_deref()))
            .or_default()
            .push(tx);
    }

    let mut categories: Vec<CategoryBreakdown> = grouped
        .into_iter()
        .map(|(category, txs)| {
            let items: Vec<TransactionItem> = txs
                .iter()
                .map(|tx| TransactionItem {
                    amount: tx.amount_value(),
                    merchant: tx.merchant.clone().unwrap_or_else(|| "Unknown".to_string()),
                    posted_at: tx.posted_at,
                    necessity: guess_necessity(tx.category.as_deref(), tx.merchant.as_deref()),
                })
                .collect();
            let total = items.iter().map(|item| item.amount).sum();
            CategoryBreakdown {
                category,
                total,
                items,
            }
        })
        .collect();

    categories.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });

    let total_spent = categories.iter().map(|c| c.total).sum();
    debug!(
        "Daily total {:.2} across {} categories",
        total_spent,
        categories.len()
    );

    DailySummary {
        total_spent,
        categories,
        transaction_count: transactions.len(),
    }
}

/// Top apps by total attributed spend, largest first. Attributions that are
/// artifacts of the platform (launcher, system UI) are excluded.
pub fn top_apps_by_spending(transactions: &[TransactionRecord], limit: usize) -> Vec<AppSpending> {
    let mut grouped: HashMap<&str, Vec<&TransactionRecord>> = HashMap::new();
    for tx in transactions {
        if let Some(app) = tx.attributed_app.as_deref() {
            if is_reportable_app(app) {
                grouped.entry(app).or_default().push(tx);
            }
        }
    }

    let mut spendings: Vec<AppSpending> = grouped
        .into_iter()
        .map(|(app, txs)| AppSpending {
            app_name: app.to_string(),
            total_spent: txs.iter().map(|tx| tx.amount_value()).sum(),
            transaction_count: txs.len(),
            category: txs
                .iter()
                .find_map(|tx| tx.category.clone())
                .unwrap_or_else(|| "Uncategorized".to_string()),
        })
        .collect();

    spendings.sort_by(|a, b| {
        b.total_spent
            .partial_cmp(&a.total_spent)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.app_name.cmp(&b.app_name))
    });
    spendings.truncate(limit);
    spendings
}

/// Need/want heuristic from category and merchant. Commute-style transport
/// is a need; vacations fall under travel, a want. Returns None when
/// neither side gives a signal.
pub fn guess_necessity(category: Option<&str>, merchant: Option<&str>) -> Option<Necessity> {
    let cat = category.unwrap_or("").to_lowercase();
    let merch = merchant.unwrap_or("").to_lowercase();

    if cat.contains("transport") {
        return Some(Necessity::Need);
    }
    if cat.contains("grocer") || cat.contains("medicine") || cat.contains("health") {
        return Some(Necessity::Need);
    }
    if cat.contains("bill") || cat.contains("recharge") || cat.contains("utility") {
        return Some(Necessity::Need);
    }
    if cat.contains("rent") || cat.contains("housing") {
        return Some(Necessity::Need);
    }
    if cat.contains("education") {
        return Some(Necessity::Need);
    }

    if cat.contains("food delivery") || merch.contains("zomato") || merch.contains("swiggy") {
        return Some(Necessity::Want);
    }
    if cat.contains("shopping") || cat.contains("entertainment") {
        return Some(Necessity::Want);
    }
    if cat.contains("personal") || cat.contains("salon") {
        return Some(Necessity::Want);
    }
    if cat.contains("travel") {
        return Some(Necessity::Want);
    }

    None
}

/// Normalize stored categories for display grouping.
fn display_category(category: Option<&str>) -> String {
    match category {
        None => "Other".to_string(),
        Some(c) if c.trim().is_empty() => "Other".to_string(),
        Some(c) if c.eq_ignore_ascii_case("unknown") => "Other".to_string(),
        Some(c) if c.eq_ignore_ascii_case("uncategorized") => "Other".to_string(),
        Some(c) => c.to_string(),
    }
}

fn is_reportable_app(name: &str) -> bool {
    let lower = name.to_lowercase();
    !name.trim().is_empty()
        && lower != "unknown"
        && !lower.contains("launcher")
        && !lower.contains("systemui")
        && !lower.contains("settings")
}
