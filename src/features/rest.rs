//! Rest between matches
//!
//! Days since each team's previous match, from kickoff dates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::features::aggregate::FeatureValue;
use crate::features::reducer::Reducer;
use crate::{MatchRecord, TeamId};

/// Rest going into a match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RestFeatures {
    pub home_rest_days: FeatureValue,
    pub away_rest_days: FeatureValue,
    /// Home rest minus away rest
    pub rest_advantage: FeatureValue,
}

impl RestFeatures {
    pub const DIM: usize = 3;
    pub const NAMES: [&'static str; Self::DIM] =
        ["home_rest_days", "away_rest_days", "rest_advantage"];

    pub fn to_vec(&self) -> Vec<FeatureValue> {
        vec![self.home_rest_days, self.away_rest_days, self.rest_advantage]
    }
}

/// Tracks the last match date per team
#[derive(Debug, Clone, Copy, Default)]
pub struct RestDays;

impl RestDays {
    fn days_since(state: &HashMap<TeamId, NaiveDate>, team: TeamId, date: Option<NaiveDate>) -> Option<f64> {
        let last = state.get(&team)?;
        Some((date? - *last).num_days() as f64)
    }
}

impl Reducer for RestDays {
    type State = HashMap<TeamId, NaiveDate>;
    type Emit = RestFeatures;

    fn emit(&self, state: &Self::State, record: &MatchRecord) -> RestFeatures {
        let home = Self::days_since(state, record.home_team, record.date);
        let away = Self::days_since(state, record.away_team, record.date);
        let advantage = match (home, away) {
            (Some(h), Some(a)) => Some(h - a),
            _ => None,
        };
        RestFeatures {
            home_rest_days: FeatureValue::from_option(home),
            away_rest_days: FeatureValue::from_option(away),
            rest_advantage: FeatureValue::from_option(advantage),
        }
    }

    fn absorb(&self, mut state: Self::State, record: &MatchRecord) -> Self::State {
        for team in [record.home_team, record.away_team] {
            match record.date {
                Some(date) => {
                    state.insert(team, date);
                }
                // An undated match makes the previous date meaningless
                None => {
                    state.remove(&team);
                }
            }
        }
        state
    }
}
