//! Integration tests for runway-core
//!
//! These tests exercise the full CSV → analyze → alerts workflow.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use runway_core::{
    alerts::rules::{self, AlertConfig},
    analyze,
    cashflow::{self, runway_for},
    forecast, AlertKind, AnalysisInput, AnalyticsConfig, CsvEventAdapter, Direction,
    FixedClock, FrequencyClass, GoalProgress, GroupKey, MonetaryEvent, Obligation, Pattern,
    Priority, Runway, TagRule,
};

/// Six months of history ending June 2026:
/// - biweekly payroll of $2,400
/// - monthly Netflix, Spotify and electric bills
/// - an electric bill in June five times the usual amount
fn sample_csv() -> &'static str {
    r#"date,description,amount,category
2026-01-02,ACME PAYROLL,2400.00,
2026-01-16,ACME PAYROLL,2400.00,
2026-01-30,ACME PAYROLL,2400.00,
2026-02-13,ACME PAYROLL,2400.00,
2026-02-27,ACME PAYROLL,2400.00,
2026-03-13,ACME PAYROLL,2400.00,
2026-03-27,ACME PAYROLL,2400.00,
2026-04-10,ACME PAYROLL,2400.00,
2026-04-24,ACME PAYROLL,2400.00,
2026-05-08,ACME PAYROLL,2400.00,
2026-05-22,ACME PAYROLL,2400.00,
2026-06-05,ACME PAYROLL,2400.00,
2026-06-19,ACME PAYROLL,2400.00,
2026-01-15,NETFLIX.COM,-15.49,Entertainment
2026-02-15,NETFLIX.COM,-15.49,Entertainment
2026-03-15,NETFLIX.COM,-15.49,Entertainment
2026-04-15,NETFLIX.COM,-15.49,Entertainment
2026-05-15,NETFLIX.COM,-15.49,Entertainment
2026-06-15,NETFLIX.COM,-15.49,Entertainment
2026-01-02,SPOTIFY USA,-10.99,Entertainment
2026-02-02,SPOTIFY USA,-10.99,Entertainment
2026-03-02,SPOTIFY USA,-10.99,Entertainment
2026-04-02,SPOTIFY USA,-10.99,Entertainment
2026-05-02,SPOTIFY USA,-10.99,Entertainment
2026-06-02,SPOTIFY USA,-10.99,Entertainment
2026-01-20,ELECTRIC CO,-80.00,Utilities
2026-02-20,ELECTRIC CO,-80.00,Utilities
2026-03-20,ELECTRIC CO,-80.00,Utilities
2026-04-20,ELECTRIC CO,-80.00,Utilities
2026-05-20,ELECTRIC CO,-80.00,Utilities
2026-06-20,ELECTRIC CO,-400.00,Utilities"#
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()
}

fn clock() -> FixedClock {
    FixedClock::end_of_day(today())
}

fn load_events() -> Vec<MonetaryEvent> {
    let mut adapter = CsvEventAdapter::new();
    adapter
        .parse_csv(sample_csv().as_bytes())
        .expect("Failed to parse CSV")
        .into_events()
}

fn find_pattern<'a>(patterns: &'a [Pattern], merchant: &str) -> &'a Pattern {
    patterns
        .iter()
        .find(|p| p.group_key.label().starts_with(merchant))
        .unwrap_or_else(|| panic!("no pattern for {}", merchant))
}

// =============================================================================
// CSV → Analysis Workflow
// =============================================================================

#[test]
fn test_full_analysis_workflow() {
    let events = load_events();
    assert_eq!(events.len(), 31);

    let input = AnalysisInput::new(events, 5_000.0);
    let report = analyze(&input, &clock(), &AnalyticsConfig::default()).unwrap();

    // Patterns
    assert_eq!(report.patterns.len(), 4);
    let payroll = find_pattern(&report.patterns, "ACME PAYROLL");
    assert_eq!(payroll.direction, Direction::Income);
    assert_eq!(payroll.frequency_class, FrequencyClass::Biweekly);
    assert_eq!(payroll.confidence, 100.0);
    assert_eq!(payroll.sample_count, 13);

    let netflix = find_pattern(&report.patterns, "NETFLIX.COM");
    assert_eq!(netflix.frequency_class, FrequencyClass::Monthly);
    assert_eq!(
        netflix.next_expected,
        Some(Utc.with_ymd_and_hms(2026, 7, 15, 0, 0, 0).unwrap())
    );

    // Forecasts: 30 days holds two biweekly paychecks
    let income_30 = report
        .income_forecasts
        .iter()
        .find(|f| f.horizon_days == 30)
        .unwrap();
    assert_eq!(income_30.predicted_amount, 4_800.0);

    // Anomalies: only the June electric bill
    assert_eq!(report.anomalies.len(), 1);
    let anomaly = &report.anomalies[0];
    assert_eq!(anomaly.group_key, GroupKey::merchant("ELECTRIC CO", "Utilities"));
    assert_eq!(anomaly.amount, 400.0);
    assert!(anomaly.assessment.is_anomaly);

    // Cashflow: June spend of 426.48 over a 30-day window
    assert!((report.cashflow.daily_burn_rate - 426.48 / 30.0).abs() < 1e-9);
    assert!(matches!(report.cashflow.runway, Runway::Finite { .. }));

    // Trailing 90 days held six paychecks: 14,400 scaled to 30 days
    assert!((report.expected_monthly_income - 4_800.0).abs() < 1e-9);

    // Spotify renews July 2, inside the notice window
    let kinds: Vec<AlertKind> = report.alerts.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![AlertKind::SubscriptionNotice]);
    assert_eq!(
        report.alerts[0].key,
        "subscription_notice:SPOTIFY USA (Entertainment)"
    );
    assert_eq!(report.alerts[0].priority, Priority::Low);
}

#[test]
fn test_reimport_produces_no_new_events() {
    let mut adapter = CsvEventAdapter::new();
    let first = adapter.parse_csv(sample_csv().as_bytes()).unwrap();
    let second = adapter.parse_csv(sample_csv().as_bytes()).unwrap();

    assert_eq!(first.events.len(), 31);
    assert!(second.events.is_empty());
    assert_eq!(second.duplicates, 31);
}

#[test]
fn test_tag_rules_during_import() {
    let mut adapter = CsvEventAdapter::with_tag_rules(vec![
        TagRule::new("streaming", "netflix|spotify").unwrap(),
        TagRule::new("utilities", r"\(utilities\)$").unwrap(),
    ]);
    let batch = adapter.parse_csv(sample_csv().as_bytes()).unwrap();

    let streaming = batch
        .events
        .iter()
        .filter(|e| e.tags.contains(&"streaming".to_string()))
        .count();
    let utilities = batch
        .events
        .iter()
        .filter(|e| e.tags.contains(&"utilities".to_string()))
        .count();
    assert_eq!(streaming, 12);
    assert_eq!(utilities, 6);
}

#[test]
fn test_tight_budget_alerts_are_ranked() {
    let input = AnalysisInput::new(load_events(), 300.0)
        .with_obligations(vec![Obligation::new("Rent", 1_200.0, 2)])
        .with_goals(vec![GoalProgress::new("Vacation", 1_000.0, 950.0)])
        .with_expected_income(12_000.0);
    let report = analyze(&input, &clock(), &AnalyticsConfig::default()).unwrap();

    let kinds: Vec<AlertKind> = report.alerts.iter().map(|a| a.kind).collect();
    assert_eq!(kinds[0], AlertKind::RentRisk);
    assert!(kinds.contains(&AlertKind::IncomeDip));
    assert!(kinds.contains(&AlertKind::GoalMilestone));
    assert!(kinds.contains(&AlertKind::SubscriptionNotice));

    for pair in report.alerts.windows(2) {
        assert!(pair[0].priority.rank() <= pair[1].priority.rank());
    }
    assert_eq!(report.alerts.last().unwrap().priority, Priority::Low);
}

#[test]
fn test_report_json_contract() {
    let input = AnalysisInput::new(load_events(), 5_000.0);
    let report = analyze(&input, &clock(), &AnalyticsConfig::default()).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    let runway = &json["cashflow"]["runway"];
    assert!(runway["days"].is_u64());
    assert!(runway["date"].is_string());
    assert!(json["cashflow"]["trend"].is_string());

    let forecast = &json["income_forecasts"][0];
    for field in ["horizon_days", "predicted_amount", "lower_bound", "upper_bound", "confidence", "trend"] {
        assert!(!forecast[field].is_null(), "missing {}", field);
    }

    let pattern = &json["patterns"][0];
    assert!(pattern["group_key"]["kind"].is_string());
    assert!(pattern["frequency_class"].is_string());

    let alert = &json["alerts"][0];
    assert_eq!(alert["priority"], "low");
    assert!(alert["actions"].is_array());

    // Indefinite runway is a bare string
    let empty = analyze(
        &AnalysisInput::new(vec![], 100.0),
        &clock(),
        &AnalyticsConfig::default(),
    )
    .unwrap();
    let json = serde_json::to_value(&empty).unwrap();
    assert_eq!(json["cashflow"]["runway"], "indefinite");
}

// =============================================================================
// Reference Scenarios
// =============================================================================

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 30, 12, 0, 0).unwrap()
}

#[test]
fn test_rent_risk_scenario() {
    let alert = rules::rent_risk(
        &Obligation::new("Rent", 10_000.0, 5),
        8_100.0,
        200.0,
        noon(),
        &AlertConfig::default(),
    )
    .unwrap();
    assert_eq!(alert.priority, Priority::High);
    assert!((alert.impact - 2_900.0).abs() < 1e-9);
}

#[test]
fn test_runway_scenario() {
    assert_eq!(runway_for(5_000.0, 500.0, today()).days(), Some(10));
    assert_eq!(runway_for(5_000.0, 0.0, today()), Runway::Indefinite);
}

#[test]
fn test_weekly_income_forecast_scenario() {
    let start = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
    let events: Vec<MonetaryEvent> = (0..6)
        .map(|i| {
            MonetaryEvent::income(start + chrono::Duration::days(7 * i), 5_000.0, "CLIENT")
                .unwrap()
        })
        .collect();
    let patterns = runway_core::extract_patterns(&events).unwrap();
    let forecast = forecast::project(&patterns, 30);

    assert_eq!(forecast.predicted_amount, 20_000.0);
    assert_eq!(forecast.lower_bound, 20_000.0);
    assert_eq!(forecast.upper_bound, 20_000.0);
}

#[test]
fn test_daily_spend_series_feeds_spike_detection() {
    let ts = |d: u32| Utc.with_ymd_and_hms(2026, 6, d, 10, 0, 0).unwrap();
    let mut events: Vec<MonetaryEvent> = (1..30)
        .map(|d| MonetaryEvent::expense(ts(d), 40.0, "CAFE", "Food").unwrap())
        .collect();
    events.push(MonetaryEvent::expense(ts(30), 120.0, "CAFE", "Food").unwrap());

    let series = cashflow::daily_spend_series(&events, today(), 31);
    assert_eq!(series.len(), 31);
    assert_eq!(*series.last().unwrap(), 120.0);

    let report = analyze(
        &AnalysisInput::new(events, 10_000.0),
        &clock(),
        &AnalyticsConfig::default(),
    )
    .unwrap();
    let spike = report
        .alerts
        .iter()
        .find(|a| a.kind == AlertKind::SpendingSpike)
        .unwrap();
    assert_eq!(spike.priority, Priority::High);
}
