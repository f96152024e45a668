//! Per-day rollup for efficient dashboard queries.
//!
//! DayStats rows are pre-computed whenever a completion is toggled,
//! reducing dashboard reads from O(completions) to O(days).

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Quest;

/// Pre-computed rollup for one (user, calendar day).
///
/// Derived cache over the completion ledger and quest point values.
/// Invariants: `quests_completed <= quests_total`; `total_points` equals
/// the sum of point values of quests with a completion that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStats {
    pub user_id: u64,
    pub date: NaiveDate,
    /// Total points earned that day
    pub total_points: u32,
    /// Quests with at least one completion
    pub quests_completed: u32,
    /// Quests assigned that day
    pub quests_total: u32,
}

impl DayStats {
    /// Compute the rollup for a day from its quests and the set of
    /// completed quest IDs. Deterministic: the same inputs always produce
    /// the same row.
    pub fn compute(
        user_id: u64,
        date: NaiveDate,
        quests: &[Quest],
        completed_quest_ids: &HashSet<u64>,
    ) -> Self {
        let quests_total = quests.len() as u32;
        let mut quests_completed = 0;
        let mut total_points = 0;

        for quest in quests {
            if completed_quest_ids.contains(&quest.id) {
                quests_completed += 1;
                total_points += quest.points;
            }
        }

        Self {
            user_id,
            date,
            total_points,
            quests_completed,
            quests_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestType;

    fn make_quest(id: u64, points: u32) -> Quest {
        Quest {
            id,
            user_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            quest_type: QuestType::Side,
            title: format!("Quest {}", id),
            subtitle: None,
            icon: None,
            points,
            order: 0,
            asana_task_gid: None,
        }
    }

    #[test]
    fn test_compute_counts_only_completed_points() {
        let quests = vec![make_quest(1, 20), make_quest(2, 10), make_quest(3, 5)];
        let completed: HashSet<u64> = [1, 3].into_iter().collect();

        let stats = DayStats::compute(1, quests[0].date, &quests, &completed);

        assert_eq!(stats.quests_total, 3);
        assert_eq!(stats.quests_completed, 2);
        assert_eq!(stats.total_points, 25);
    }

    #[test]
    fn test_compute_empty_day() {
        let stats = DayStats::compute(
            1,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            &[],
            &HashSet::new(),
        );

        assert_eq!(stats.quests_total, 0);
        assert_eq!(stats.quests_completed, 0);
        assert_eq!(stats.total_points, 0);
    }

    #[test]
    fn test_compute_ignores_completions_for_unassigned_quests() {
        let quests = vec![make_quest(1, 20)];
        // Completion for a quest not assigned this day must not count
        let completed: HashSet<u64> = [99].into_iter().collect();

        let stats = DayStats::compute(1, quests[0].date, &quests, &completed);

        assert_eq!(stats.quests_completed, 0);
        assert_eq!(stats.total_points, 0);
        assert!(stats.quests_completed <= stats.quests_total);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let quests = vec![make_quest(1, 20), make_quest(2, 10)];
        let completed: HashSet<u64> = [2].into_iter().collect();

        let first = DayStats::compute(1, quests[0].date, &quests, &completed);
        let second = DayStats::compute(1, quests[0].date, &quests, &completed);

        assert_eq!(first, second);
    }
}
