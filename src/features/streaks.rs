//! Win, unbeaten, scoring and clean-sheet streaks
//!
//! Each streak runs independently: a draw ends a win streak but extends an
//! unbeaten one, and a scoring streak survives a defeat.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::features::reducer::Reducer;
use crate::{MatchOutcome, MatchRecord, Side, TeamId};

/// Current streak lengths for one team, counted back from its latest match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakCounts {
    pub win: u32,
    pub unbeaten: u32,
    pub scoring: u32,
    pub clean_sheet: u32,
}

impl StreakCounts {
    pub const DIM: usize = 4;
    pub const NAMES: [&'static str; Self::DIM] =
        ["win_streak", "unbeaten_streak", "scoring_streak", "clean_sheet_streak"];

    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.win as f64,
            self.unbeaten as f64,
            self.scoring as f64,
            self.clean_sheet as f64,
        ]
    }

    /// Streaks after one more match
    fn extend(self, outcome: MatchOutcome, scored: f64, conceded: f64) -> Self {
        let run = |cond: bool, current: u32| if cond { current + 1 } else { 0 };
        StreakCounts {
            win: run(outcome == MatchOutcome::Win, self.win),
            unbeaten: run(outcome != MatchOutcome::Loss, self.unbeaten),
            scoring: run(scored > 0.0, self.scoring),
            clean_sheet: run(conceded == 0.0, self.clean_sheet),
        }
    }
}

/// Streaks for both teams going into a match
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StreakFeatures {
    pub home: StreakCounts,
    pub away: StreakCounts,
}

/// Tracks streaks per team
#[derive(Debug, Clone, Copy, Default)]
pub struct Streaks;

impl Reducer for Streaks {
    type State = HashMap<TeamId, StreakCounts>;
    type Emit = StreakFeatures;

    fn emit(&self, state: &Self::State, record: &MatchRecord) -> StreakFeatures {
        StreakFeatures {
            home: state.get(&record.home_team).copied().unwrap_or_default(),
            away: state.get(&record.away_team).copied().unwrap_or_default(),
        }
    }

    fn absorb(&self, mut state: Self::State, record: &MatchRecord) -> Self::State {
        for side in [Side::Home, Side::Away] {
            // A match without a score leaves the streaks as they were
            let (Some(outcome), Some(scored), Some(conceded)) = (
                record.outcome(side),
                record.goals_for(side),
                record.goals_against(side),
            ) else {
                continue;
            };
            let counts = state.entry(record.team(side)).or_default();
            *counts = counts.extend(outcome, scored, conceded);
        }
        state
    }
}
