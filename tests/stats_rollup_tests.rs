// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Points/stats aggregator tests: rollup recompute, range totals, and the
//! display-streak walks over DayStats history.

mod common;

use common::{day, seed_quest, seed_user, test_state};
use quest_board::models::{DayStats, Plan};

#[tokio::test]
async fn test_recompute_day_is_idempotent() {
    let state = test_state();
    seed_user(&state.db, 1, Plan::Free, 0);
    let quest_a = seed_quest(&state.db, 1, day("2024-01-15"), 20);
    seed_quest(&state.db, 1, day("2024-01-15"), 10);

    state
        .completion_processor
        .toggle(1, quest_a.id, day("2024-01-15"), true, chrono::Utc::now())
        .await
        .unwrap();

    let first = state.stats_service.recompute_day(1, day("2024-01-15")).await.unwrap();
    let second = state.stats_service.recompute_day(1, day("2024-01-15")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.total_points, 20);
    assert_eq!(first.quests_completed, 1);
    assert_eq!(first.quests_total, 2);
}

#[tokio::test]
async fn test_toggle_round_trip_restores_day_stats() {
    let state = test_state();
    seed_user(&state.db, 1, Plan::Free, 0);
    let quest = seed_quest(&state.db, 1, day("2024-01-15"), 20);
    let other = seed_quest(&state.db, 1, day("2024-01-15"), 5);

    state
        .completion_processor
        .toggle(1, other.id, day("2024-01-15"), true, chrono::Utc::now())
        .await
        .unwrap();
    let before = state.db.get_day_stats(1, day("2024-01-15")).unwrap().unwrap();

    // On then off
    state
        .completion_processor
        .toggle(1, quest.id, day("2024-01-15"), true, chrono::Utc::now())
        .await
        .unwrap();
    state
        .completion_processor
        .toggle(1, quest.id, day("2024-01-15"), false, chrono::Utc::now())
        .await
        .unwrap();

    let after = state.db.get_day_stats(1, day("2024-01-15")).unwrap().unwrap();
    assert_eq!(before, after);
    assert!(state
        .db
        .get_completion(1, quest.id, day("2024-01-15"))
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_weekly_total_sums_range_only() {
    let state = test_state();
    seed_user(&state.db, 1, Plan::Free, 0);

    for (d, points) in [
        ("2024-01-14", 100), // Sunday before the week
        ("2024-01-15", 10),  // Monday
        ("2024-01-17", 5),
        ("2024-01-21", 3),  // Sunday
        ("2024-01-22", 50), // next Monday
    ] {
        state
            .db
            .upsert_day_stats(&DayStats {
                user_id: 1,
                date: day(d),
                total_points: points,
                quests_completed: 1,
                quests_total: 1,
            })
            .unwrap();
    }

    let total = state
        .stats_service
        .weekly_total(1, day("2024-01-15"), day("2024-01-21"))
        .await
        .unwrap();
    assert_eq!(total, 18);
}

#[tokio::test]
async fn test_all_time_total_counts_today_exactly_once() {
    let state = test_state();
    seed_user(&state.db, 1, Plan::Free, 0);

    // Historic rollup
    state
        .db
        .upsert_day_stats(&DayStats {
            user_id: 1,
            date: day("2024-01-10"),
            total_points: 30,
            quests_completed: 2,
            quests_total: 2,
        })
        .unwrap();

    // Today: a stale rollup plus a live completion worth 20
    let quest = seed_quest(&state.db, 1, day("2024-01-15"), 20);
    state
        .db
        .upsert_day_stats(&DayStats {
            user_id: 1,
            date: day("2024-01-15"),
            total_points: 999, // stale, must be recomputed away
            quests_completed: 9,
            quests_total: 9,
        })
        .unwrap();
    state
        .completion_processor
        .toggle(1, quest.id, day("2024-01-15"), true, chrono::Utc::now())
        .await
        .unwrap();

    let total = state
        .stats_service
        .all_time_total(1, day("2024-01-15"))
        .await
        .unwrap();
    assert_eq!(total, 50);
}

#[tokio::test]
async fn test_current_streak_display_walks_backward() {
    let state = test_state();
    seed_user(&state.db, 1, Plan::Free, 0);

    for d in ["2024-01-13", "2024-01-14", "2024-01-15"] {
        state
            .db
            .upsert_day_stats(&DayStats {
                user_id: 1,
                date: day(d),
                total_points: 5,
                quests_completed: 1,
                quests_total: 2,
            })
            .unwrap();
    }
    // Gap on Jan 12; active Jan 11
    state
        .db
        .upsert_day_stats(&DayStats {
            user_id: 1,
            date: day("2024-01-11"),
            total_points: 5,
            quests_completed: 1,
            quests_total: 1,
        })
        .unwrap();

    let streak = state
        .stats_service
        .current_streak_display(1, day("2024-01-15"))
        .await
        .unwrap();
    assert_eq!(streak, 3, "walk stops at the Jan 12 gap");
}

#[tokio::test]
async fn test_current_streak_display_idle_today_does_not_break_chain() {
    let state = test_state();
    seed_user(&state.db, 1, Plan::Free, 0);

    for d in ["2024-01-13", "2024-01-14"] {
        state
            .db
            .upsert_day_stats(&DayStats {
                user_id: 1,
                date: day(d),
                total_points: 5,
                quests_completed: 1,
                quests_total: 1,
            })
            .unwrap();
    }

    // Nothing recorded yet for Jan 15 ("today")
    let streak = state
        .stats_service
        .current_streak_display(1, day("2024-01-15"))
        .await
        .unwrap();
    assert_eq!(streak, 2);
}

#[tokio::test]
async fn test_best_streak_reconstruction_tolerates_gaps() {
    let state = test_state();
    seed_user(&state.db, 1, Plan::Free, 0);

    // Run of 2, gap, run of 4, zero-completion row, run of 1
    let active_days = [
        "2024-01-01",
        "2024-01-02",
        "2024-01-05",
        "2024-01-06",
        "2024-01-07",
        "2024-01-08",
        "2024-01-12",
    ];
    for d in active_days {
        state
            .db
            .upsert_day_stats(&DayStats {
                user_id: 1,
                date: day(d),
                total_points: 5,
                quests_completed: 1,
                quests_total: 1,
            })
            .unwrap();
    }
    state
        .db
        .upsert_day_stats(&DayStats {
            user_id: 1,
            date: day("2024-01-10"),
            total_points: 0,
            quests_completed: 0,
            quests_total: 3,
        })
        .unwrap();

    let best = state.stats_service.best_streak_display(1).await.unwrap();
    assert_eq!(best, 4);
}

#[tokio::test]
async fn test_best_streak_empty_history() {
    let state = test_state();
    seed_user(&state.db, 1, Plan::Free, 0);

    assert_eq!(state.stats_service.best_streak_display(1).await.unwrap(), 0);
    assert_eq!(
        state
            .stats_service
            .current_streak_display(1, day("2024-01-15"))
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_last_n_days_returns_dense_series() {
    let state = test_state();
    seed_user(&state.db, 1, Plan::Free, 0);

    state
        .db
        .upsert_day_stats(&DayStats {
            user_id: 1,
            date: day("2024-01-14"),
            total_points: 7,
            quests_completed: 1,
            quests_total: 1,
        })
        .unwrap();

    let series = state
        .stats_service
        .last_n_days(1, day("2024-01-15"), 3)
        .await
        .unwrap();

    assert_eq!(series.len(), 3);
    assert_eq!(series[0].date, day("2024-01-13"));
    assert_eq!(series[0].total_points, 0);
    assert_eq!(series[1].total_points, 7);
    assert_eq!(series[2].date, day("2024-01-15"));
}

#[tokio::test]
async fn test_completion_rate() {
    let state = test_state();
    seed_user(&state.db, 1, Plan::Free, 0);

    for (d, completed, total) in [("2024-01-13", 1, 2), ("2024-01-14", 2, 2)] {
        state
            .db
            .upsert_day_stats(&DayStats {
                user_id: 1,
                date: day(d),
                total_points: 0,
                quests_completed: completed,
                quests_total: total,
            })
            .unwrap();
    }

    assert_eq!(state.stats_service.completion_rate(1).await.unwrap(), 75);
}
