//! Integration tests for paisa-core
//!
//! These tests exercise the full capture → parse → correlate → detect
//! workflow the host application drives, using only public API.

use chrono::{DateTime, TimeZone, Utc};

use paisa_core::{
    daily_summary, monthly_burn, AppUsageSession, Confidence, Frequency, IngestPipeline,
    NotificationEvent, Outcome, SkipReason, SubscriptionDetector, TransactionRecord,
};

fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, h, m, 0).unwrap()
}

fn gpay_event(text: &str, posted_at: DateTime<Utc>) -> NotificationEvent {
    NotificationEvent {
        source_app_id: "com.google.android.apps.nbu.paisa.user".into(),
        title: "Google Pay".into(),
        text: text.into(),
        posted_at,
    }
}

fn recorded(
    merchant: &str,
    amount: &str,
    category: Option<&str>,
    app: Option<&str>,
    posted_at: DateTime<Utc>,
) -> TransactionRecord {
    TransactionRecord {
        posted_at,
        amount: Some(amount.into()),
        merchant: Some(merchant.into()),
        category: category.map(String::from),
        attributed_app: app.map(String::from),
    }
}

#[test]
fn test_payment_is_parsed_and_attributed_to_recent_app() {
    let mut pipeline = IngestPipeline::new();

    let payment = gpay_event("₹183 paid to Zomato using UPI", at(14, 20, 10));
    // Zomato browsed for 2 minutes, closed a minute before the payment
    let sessions = [
        AppUsageSession::new("com.application.zomato", at(14, 20, 7), at(14, 20, 9)).unwrap(),
        AppUsageSession::new("com.android.systemui", at(14, 20, 9), at(14, 20, 10)).unwrap(),
    ];

    match pipeline.process(&payment, &sessions, &[], None) {
        Outcome::Payment {
            parsed,
            correlation,
        } => {
            assert_eq!(parsed.amount.as_deref(), Some("183"));
            assert_eq!(parsed.merchant.as_deref(), Some("Zomato"));
            assert_eq!(parsed.channel.as_deref(), Some("UPI"));

            assert_eq!(correlation.app_name.as_deref(), Some("Zomato"));
            assert_eq!(correlation.category, "Food Delivery");
            assert_eq!(correlation.confidence, Confidence::High);
            assert!(correlation.reason.contains("Zomato"));
        }
        other => panic!("expected Payment, got {:?}", other),
    }
}

#[test]
fn test_redelivered_notification_is_not_processed_twice() {
    let mut pipeline = IngestPipeline::new();
    let payment = gpay_event("₹120 paid to AUTO STAND", at(10, 9, 0));

    assert!(matches!(
        pipeline.process(&payment, &[], &[], None),
        Outcome::Payment { .. }
    ));
    assert!(matches!(
        pipeline.process(&payment, &[], &[], None),
        Outcome::Skipped(SkipReason::DuplicateKey)
    ));
}

#[test]
fn test_bank_sms_after_captured_payment_is_suppressed() {
    let mut pipeline = IngestPipeline::new();

    // The GPay notification is captured first...
    let gpay = gpay_event("₹10 paid to Aayush Raj", at(11, 12, 0));
    let outcome = pipeline.process(&gpay, &[], &[], None);
    let already_recorded = match outcome {
        Outcome::Payment { ref parsed, .. } => vec![TransactionRecord {
            posted_at: gpay.posted_at,
            amount: parsed.amount.clone(),
            merchant: parsed.merchant.clone(),
            category: None,
            attributed_app: None,
        }],
        other => panic!("expected Payment, got {:?}", other),
    };

    // ...so the bank's restatement two minutes later is a duplicate signal
    let mut sms = gpay_event("A/c XX1234 debited Rs.10", at(11, 14, 0));
    sms.source_app_id = "com.bank.messages".into();
    assert!(matches!(
        pipeline.process(&sms, &[], &already_recorded, None),
        Outcome::Skipped(SkipReason::DuplicateRestatement)
    ));

    // With nothing captured nearby, the same SMS is the only signal and kept
    let mut lone_sms = gpay_event("A/c XX1234 debited Rs.10", at(11, 40, 0));
    lone_sms.source_app_id = "com.bank.messages".into();
    assert!(matches!(
        pipeline.process(&lone_sms, &[], &[], None),
        Outcome::Payment { .. }
    ));
}

#[test]
fn test_session_from_a_launcher_never_explains_a_payment() {
    let mut pipeline = IngestPipeline::new();
    let payment = gpay_event("₹40 paid to RAMESH CHOWMEIN", at(21, 3, 0));
    let sessions = [AppUsageSession::new(
        "com.google.android.apps.nexuslauncher",
        at(21, 1, 0),
        at(21, 2, 0),
    )
    .unwrap()];

    match pipeline.process(&payment, &sessions, &[], None) {
        Outcome::Payment { correlation, .. } => {
            assert_eq!(correlation.app_name, None);
            assert_eq!(correlation.confidence, Confidence::Low);
            assert_eq!(correlation.category, "Food");
        }
        other => panic!("expected Payment, got {:?}", other),
    }
}

#[test]
fn test_subscription_detection_over_captured_history() {
    // Three months of captured transactions: Netflix monthly, plus noise
    let mut history = vec![
        recorded("Netflix", "649", Some("Entertainment"), None, at(1, 9, 0)),
        recorded("Zomato", "183", Some("Food Delivery"), Some("Zomato"), at(2, 21, 0)),
        recorded("Netflix", "649", Some("Entertainment"), None, at(31, 9, 0)),
        recorded("AUTO STAND", "120", Some("Transport"), None, at(15, 8, 30)),
    ];
    // Third Netflix charge lands one "month" later
    history.push(recorded(
        "Netflix",
        "650",
        Some("Entertainment"),
        None,
        Utc.with_ymd_and_hms(2024, 4, 30, 9, 0, 0).unwrap(),
    ));

    let detector = SubscriptionDetector::new();
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let detected = detector.detect(&history, now);

    assert_eq!(detected.len(), 1);
    let netflix = &detected[0];
    assert_eq!(netflix.normalized_name, "netflix");
    assert_eq!(netflix.frequency, Frequency::Monthly);
    assert_eq!(netflix.confidence, Confidence::High);
    assert_eq!(netflix.occurrences, 3);

    // Upsert into the host's store: insert, then a later detection updates
    let inserted = netflix.merge_into(None);
    assert_eq!(inserted.times_detected, 3);
    let updated = netflix.merge_into(Some(&inserted));
    assert_eq!(updated.times_detected, 4);

    let burn = monthly_burn(&detected);
    assert!((burn - netflix.average_amount).abs() < 1e-9);
}

#[test]
fn test_daily_summary_over_captured_payments() {
    let day = [
        recorded("Swiggy", "250", Some("Food Delivery"), Some("Swiggy"), at(14, 13, 0)),
        recorded("Zomato", "183", Some("Food Delivery"), Some("Zomato"), at(14, 21, 0)),
        recorded("AUTO STAND", "120", Some("Transport"), None, at(14, 8, 30)),
        // A malformed amount must not poison the batch
        recorded("Mystery", "??", None, None, at(14, 10, 0)),
    ];

    let summary = daily_summary(&day);
    assert_eq!(summary.transaction_count, 4);
    assert!((summary.total_spent - 553.0).abs() < 1e-9);
    assert_eq!(summary.categories[0].category, "Food Delivery");
}

#[test]
fn test_promotional_amounts_never_reach_history() {
    let mut pipeline = IngestPipeline::new();
    let promo = gpay_event("Get ₹201 off on your next ride", at(9, 10, 0));

    assert!(matches!(
        pipeline.process(&promo, &[], &[], None),
        Outcome::Skipped(SkipReason::NotAPayment)
    ));
}
