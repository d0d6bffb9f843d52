//! Form trajectory: the last few matches against the block before them

use serde::{Deserialize, Serialize};

use crate::features::aggregate::FeatureValue;
use crate::features::reducer::Reducer;
use crate::features::window::{TeamWindows, TrailingWindow};
use crate::{MatchRecord, Side};

/// Recent form against earlier form for one team
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Points over the most recent block
    pub last_points: FeatureValue,
    pub last_goals: FeatureValue,
    /// Points over the earlier block, scaled to the recent block's length
    pub previous_points: FeatureValue,
    pub previous_goals: FeatureValue,
    /// `last_points - previous_points`
    pub form_trend: FeatureValue,
}

impl Trajectory {
    pub const DIM: usize = 5;
    pub const NAMES: [&'static str; Self::DIM] = [
        "last_points",
        "last_goals",
        "prev_points",
        "prev_goals",
        "form_trend",
    ];

    fn insufficient() -> Self {
        Trajectory {
            last_points: FeatureValue::InsufficientHistory,
            last_goals: FeatureValue::InsufficientHistory,
            previous_points: FeatureValue::InsufficientHistory,
            previous_goals: FeatureValue::InsufficientHistory,
            form_trend: FeatureValue::InsufficientHistory,
        }
    }

    pub fn to_vec(&self) -> Vec<FeatureValue> {
        vec![
            self.last_points,
            self.last_goals,
            self.previous_points,
            self.previous_goals,
            self.form_trend,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryFeatures {
    pub home: Trajectory,
    pub away: Trajectory,
}

/// Compares a team's last `recent` matches with the `previous` before them
#[derive(Debug, Clone, Copy)]
pub struct FormTrajectory {
    recent: usize,
    previous: usize,
}

impl FormTrajectory {
    pub fn new(recent: usize, previous: usize) -> Self {
        FormTrajectory {
            recent: recent.max(1),
            previous,
        }
    }

    fn compute(&self, history: Option<&TrailingWindow<(f64, f64)>>) -> Trajectory {
        let Some(history) = history.filter(|h| h.len() >= self.recent) else {
            return Trajectory::insufficient();
        };

        let (last_points, last_goals) = history
            .iter_recent()
            .take(self.recent)
            .fold((0.0_f64, 0.0_f64), |(p, g), &(mp, mg)| (p + mp, g + mg));

        let earlier: Vec<&(f64, f64)> = history.iter_recent().skip(self.recent).collect();
        let mut trajectory = Trajectory {
            last_points: FeatureValue::Value(last_points),
            last_goals: FeatureValue::Value(last_goals),
            ..Trajectory::insufficient()
        };
        if !earlier.is_empty() {
            let scale = self.recent as f64 / earlier.len() as f64;
            let points: f64 = earlier.iter().map(|(p, _)| p).sum::<f64>() * scale;
            let goals: f64 = earlier.iter().map(|(_, g)| g).sum::<f64>() * scale;
            trajectory.previous_points = FeatureValue::Value(points);
            trajectory.previous_goals = FeatureValue::Value(goals);
            trajectory.form_trend = FeatureValue::Value(last_points - points);
        }
        trajectory
    }
}

impl Reducer for FormTrajectory {
    /// (points, goals) per match, newest last
    type State = TeamWindows<(f64, f64)>;
    type Emit = TrajectoryFeatures;

    fn emit(&self, state: &Self::State, record: &MatchRecord) -> TrajectoryFeatures {
        TrajectoryFeatures {
            home: self.compute(state.get(&record.home_team)),
            away: self.compute(state.get(&record.away_team)),
        }
    }

    fn absorb(&self, mut state: Self::State, record: &MatchRecord) -> Self::State {
        for side in [Side::Home, Side::Away] {
            if let (Some(points), Some(goals)) = (record.points(side), record.goals_for(side)) {
                state.push(record.team(side), (points, goals), self.recent + self.previous);
            }
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reducer::fold;
    use crate::features::test_support::make_match;

    /// Team 1 at home every round with the given scores
    fn run_for(scores: &[(f64, f64)]) -> Vec<TrajectoryFeatures> {
        let matches: Vec<_> = scores
            .iter()
            .enumerate()
            .map(|(i, (h, a))| make_match(i as u32, 1, 10 + i as i64, *h, *a))
            .collect();
        fold(&FormTrajectory::new(3, 5), &matches).unwrap()
    }

    #[test]
    fn test_needs_recent_block() {
        let out = run_for(&[(1.0, 0.0), (1.0, 0.0), (1.0, 0.0)]);
        assert!(out[2].home.last_points.is_insufficient());
    }

    #[test]
    fn test_recent_block_without_previous() {
        let out = run_for(&[(1.0, 0.0), (0.0, 0.0), (0.0, 2.0), (5.0, 5.0)]);
        let t = out[3].home;
        assert_eq!(t.last_points, FeatureValue::Value(4.0));
        assert_eq!(t.last_goals, FeatureValue::Value(1.0));
        assert!(t.previous_points.is_insufficient());
        assert!(t.form_trend.is_insufficient());
    }

    #[test]
    fn test_previous_block_is_scaled() {
        // Two earlier losses, then three wins
        let out = run_for(&[
            (0.0, 1.0),
            (2.0, 3.0),
            (1.0, 0.0),
            (1.0, 0.0),
            (1.0, 0.0),
            (0.0, 0.0),
        ]);
        let t = out[5].home;
        assert_eq!(t.last_points, FeatureValue::Value(9.0));
        assert_eq!(t.previous_points, FeatureValue::Value(0.0));
        // 2 goals over 2 matches, scaled to 3
        assert_eq!(t.previous_goals, FeatureValue::Value(3.0));
        assert_eq!(t.form_trend, FeatureValue::Value(9.0));
    }
}
