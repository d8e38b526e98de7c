use crate::UsageStats;

/// **VALUE**: Verifies the day rollover on the first enhancement of a new day.
///
/// **WHY THIS MATTERS**: `today` is shown in the popup as "enhancements today". If it does not
/// reset, yesterday's count leaks into today; if `total` resets too, lifetime usage is lost.
///
/// **BUG THIS CATCHES**: Would catch resetting after incrementing, or resetting `total`.
#[test]
fn given_stats_from_previous_day_when_recording_then_today_resets_and_total_increments() {
    // GIVEN: Stats last touched on 2024-01-01
    let mut stats = UsageStats {
        total: 5,
        today: 2,
        last_date: String::from("2024-01-01"),
    };

    // WHEN: Recording an enhancement on another date
    stats.record_enhancement("2024-01-02");

    // THEN: today restarts at 1, total grows by one
    assert_eq!(stats.today, 1);
    assert_eq!(stats.total, 6);
    assert_eq!(stats.last_date, "2024-01-02");
}

#[test]
fn given_stats_from_same_day_when_recording_then_both_counters_increment() {
    let mut stats = UsageStats {
        total: 5,
        today: 2,
        last_date: String::from("2024-01-01"),
    };

    stats.record_enhancement("2024-01-01");

    assert_eq!(stats.today, 3);
    assert_eq!(stats.total, 6);
}

#[test]
fn given_fresh_stats_when_recording_then_starts_counting_from_one() {
    let mut stats = UsageStats::default();

    stats.record_enhancement("2025-06-30");

    assert_eq!(stats.total, 1);
    assert_eq!(stats.today, 1);
    assert_eq!(stats.last_date, "2025-06-30");
}

#[test]
fn given_stale_stats_when_reading_today_count_then_reports_zero_without_mutating() {
    let stats = UsageStats {
        total: 9,
        today: 4,
        last_date: String::from("2024-01-01"),
    };

    assert_eq!(stats.today_count("2024-03-01"), 0);
    assert_eq!(stats.today_count("2024-01-01"), 4);
    assert_eq!(stats.today, 4);
}

#[test]
fn given_stats_when_serialized_then_uses_camel_case_last_date() {
    let stats = UsageStats {
        total: 1,
        today: 1,
        last_date: String::from("2024-01-01"),
    };

    let json = serde_json::to_value(&stats).unwrap();

    assert_eq!(json["lastDate"], "2024-01-01");
    assert_eq!(json["total"], 1);
}
