//! Quality of recent opposition
//!
//! Records where each opponent stood in the table at the time it was met.

use serde::{Deserialize, Serialize};

use crate::features::aggregate::FeatureValue;
use crate::features::reducer::Reducer;
use crate::features::standings::LeagueTable;
use crate::features::window::{TeamWindows, TrailingWindow};
use crate::{MatchRecord, Side};

/// Opposition faced by one team over its recent matches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpponentQuality {
    pub avg_position: FeatureValue,
    pub avg_points: FeatureValue,
    /// Share of opponents that were in the top positions when met
    pub tough_pct: FeatureValue,
}

impl OpponentQuality {
    pub const DIM: usize = 3;
    pub const NAMES: [&'static str; Self::DIM] =
        ["avg_opp_position", "avg_opp_points", "tough_schedule_pct"];

    pub fn to_vec(&self) -> Vec<FeatureValue> {
        vec![self.avg_position, self.avg_points, self.tough_pct]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpponentFeatures {
    pub home: OpponentQuality,
    pub away: OpponentQuality,
}

/// Opponent standing when met: (position, points)
type Faced = (u32, u32);

#[derive(Debug, Clone, Default)]
pub struct OpponentState {
    table: LeagueTable,
    faced: TeamWindows<Faced>,
}

/// Tracks the last `window` opponents of every team
#[derive(Debug, Clone, Copy)]
pub struct OpponentTracker {
    window: usize,
    top_positions: u32,
}

impl OpponentTracker {
    pub fn new(window: usize, top_positions: u32) -> Self {
        OpponentTracker {
            window,
            top_positions,
        }
    }

    fn compute(&self, history: Option<&TrailingWindow<Faced>>) -> OpponentQuality {
        let Some(history) = history.filter(|h| !h.is_empty()) else {
            return OpponentQuality {
                avg_position: FeatureValue::InsufficientHistory,
                avg_points: FeatureValue::InsufficientHistory,
                tough_pct: FeatureValue::InsufficientHistory,
            };
        };
        let n = history.len() as f64;
        let positions: f64 = history.iter().map(|(pos, _)| *pos as f64).sum();
        let points: f64 = history.iter().map(|(_, pts)| *pts as f64).sum();
        let tough = history
            .iter()
            .filter(|(pos, _)| *pos <= self.top_positions)
            .count();
        OpponentQuality {
            avg_position: FeatureValue::Value(positions / n),
            avg_points: FeatureValue::Value(points / n),
            tough_pct: FeatureValue::Value(tough as f64 / n),
        }
    }
}

impl Reducer for OpponentTracker {
    type State = OpponentState;
    type Emit = OpponentFeatures;

    fn emit(&self, state: &OpponentState, record: &MatchRecord) -> OpponentFeatures {
        OpponentFeatures {
            home: self.compute(state.faced.get(&record.home_team)),
            away: self.compute(state.faced.get(&record.away_team)),
        }
    }

    fn absorb(&self, mut state: OpponentState, record: &MatchRecord) -> OpponentState {
        // Opponent standings are taken before the match updates the table
        for side in [Side::Home, Side::Away] {
            let opponent = record.team(side.opposite());
            let faced = (
                state.table.position(opponent),
                state.table.get_or_default(opponent).points,
            );
            state.faced.push(record.team(side), faced, self.window);
        }
        state.table.update(record);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reducer::fold;
    use crate::features::test_support::make_match;

    #[test]
    fn test_no_opponents_yet() {
        let out = fold(&OpponentTracker::new(5, 6), &[make_match(0, 1, 2, 1.0, 0.0)]).unwrap();
        assert!(out[0].home.avg_position.is_insufficient());
        assert!(out[0].away.tough_pct.is_insufficient());
    }

    #[test]
    fn test_opponent_standing_when_met() {
        let matches = vec![
            make_match(0, 1, 2, 3.0, 0.0),
            make_match(0, 3, 4, 1.0, 1.0),
            // Team 5 meets the leader, then the bottom side
            make_match(1, 5, 1, 0.0, 1.0),
            make_match(2, 2, 5, 0.0, 0.0),
            make_match(3, 5, 3, 0.0, 0.0),
        ];
        let out = fold(&OpponentTracker::new(5, 1), &matches).unwrap();
        let q = out[4].home;

        // Team 1 was 1st on 3 points; team 2 was 5th on 0
        assert_eq!(q.avg_position, FeatureValue::Value(3.0));
        assert_eq!(q.avg_points, FeatureValue::Value(1.5));
        assert_eq!(q.tough_pct, FeatureValue::Value(0.5));
    }

    #[test]
    fn test_window_keeps_latest_opponents() {
        let matches = vec![
            make_match(0, 1, 2, 3.0, 0.0),
            make_match(1, 3, 1, 0.0, 0.0),
            make_match(2, 3, 4, 0.0, 0.0),
        ];
        let out = fold(&OpponentTracker::new(1, 6), &matches).unwrap();
        // Team 3's only remembered opponent is team 1 (3 points)
        assert_eq!(out[2].home.avg_points, FeatureValue::Value(3.0));
    }
}
