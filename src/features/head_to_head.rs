//! Head-to-head history between the two teams of a fixture
//!
//! Meetings are keyed by the unordered team pair, so a fixture sees earlier
//! meetings at either venue.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::features::aggregate::FeatureValue;
use crate::features::reducer::Reducer;
use crate::features::window::TrailingWindow;
use crate::target::LivelinessMetric;
use crate::{MatchOutcome, MatchRecord, Side, TeamId};

/// Head-to-head summary going into a match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadToHead {
    /// All earlier meetings, not just the window
    pub count: f64,
    pub avg_goals: FeatureValue,
    pub avg_xg: FeatureValue,
    pub avg_liveliness: FeatureValue,
    /// Share of recent meetings won by the current home team
    pub home_win_pct: FeatureValue,
    pub high_scoring_pct: FeatureValue,
}

impl HeadToHead {
    pub const DIM: usize = 6;
    pub const NAMES: [&'static str; Self::DIM] = [
        "h2h_count",
        "h2h_avg_goals",
        "h2h_avg_xG",
        "h2h_avg_liveliness",
        "h2h_home_win_pct",
        "h2h_high_scoring_pct",
    ];

    pub fn to_vec(&self) -> Vec<FeatureValue> {
        vec![
            FeatureValue::Value(self.count),
            self.avg_goals,
            self.avg_xg,
            self.avg_liveliness,
            self.home_win_pct,
            self.high_scoring_pct,
        ]
    }
}

/// One earlier meeting between a pair. Fields unknown for that match are None.
#[derive(Debug, Clone, Copy)]
pub struct Meeting {
    home_team: TeamId,
    home_outcome: Option<MatchOutcome>,
    total_goals: Option<f64>,
    total_xg: Option<f64>,
    liveliness: Option<f64>,
}

impl Meeting {
    /// Whether `team` won, if the result is known
    fn won_by(&self, team: TeamId) -> Option<bool> {
        let outcome = self.home_outcome?;
        Some(match outcome {
            MatchOutcome::Win => team == self.home_team,
            MatchOutcome::Loss => team != self.home_team,
            MatchOutcome::Draw => false,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PairHistory {
    count: usize,
    recent: TrailingWindow<Meeting>,
}

/// Tracks the last `window` meetings of every team pair
#[derive(Debug, Clone, Copy)]
pub struct HeadToHeadTracker {
    window: usize,
    high_scoring_goals: f64,
}

impl HeadToHeadTracker {
    pub fn new(window: usize, high_scoring_goals: f64) -> Self {
        HeadToHeadTracker {
            window,
            high_scoring_goals,
        }
    }

    /// Canonical key for a pair (smaller ID first)
    fn pair_key(team1: TeamId, team2: TeamId) -> (TeamId, TeamId) {
        if team1 < team2 {
            (team1, team2)
        } else {
            (team2, team1)
        }
    }
}

fn mean_of(values: impl Iterator<Item = f64>) -> FeatureValue {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        FeatureValue::InsufficientHistory
    } else {
        FeatureValue::Value(sum / n as f64)
    }
}

impl Reducer for HeadToHeadTracker {
    type State = HashMap<(TeamId, TeamId), PairHistory>;
    type Emit = HeadToHead;

    fn emit(&self, state: &Self::State, record: &MatchRecord) -> HeadToHead {
        let key = Self::pair_key(record.home_team, record.away_team);
        let Some(history) = state.get(&key).filter(|h| !h.recent.is_empty()) else {
            return HeadToHead {
                count: 0.0,
                avg_goals: FeatureValue::InsufficientHistory,
                avg_xg: FeatureValue::InsufficientHistory,
                avg_liveliness: FeatureValue::InsufficientHistory,
                home_win_pct: FeatureValue::InsufficientHistory,
                high_scoring_pct: FeatureValue::InsufficientHistory,
            };
        };

        let meetings = &history.recent;
        let indicator = |hit: bool| if hit { 1.0 } else { 0.0 };
        HeadToHead {
            count: history.count as f64,
            avg_goals: mean_of(meetings.iter().filter_map(|m| m.total_goals)),
            avg_xg: mean_of(meetings.iter().filter_map(|m| m.total_xg)),
            avg_liveliness: mean_of(meetings.iter().filter_map(|m| m.liveliness)),
            home_win_pct: mean_of(
                meetings
                    .iter()
                    .filter_map(|m| m.won_by(record.home_team))
                    .map(indicator),
            ),
            high_scoring_pct: mean_of(
                meetings
                    .iter()
                    .filter_map(|m| m.total_goals)
                    .map(|goals| indicator(goals >= self.high_scoring_goals)),
            ),
        }
    }

    fn absorb(&self, mut state: Self::State, record: &MatchRecord) -> Self::State {
        let meeting = Meeting {
            home_team: record.home_team,
            home_outcome: record.outcome(Side::Home),
            total_goals: record.total_goals(),
            total_xg: record.total(|s| s.xg),
            liveliness: LivelinessMetric::SimpleXg.value(record),
        };

        let window = self.window;
        let history = state
            .entry(Self::pair_key(record.home_team, record.away_team))
            .or_insert_with(|| PairHistory {
                count: 0,
                recent: TrailingWindow::new(window),
            });
        history.count += 1;
        history.recent.push(meeting);
        state
    }
}
