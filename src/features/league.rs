//! League-wide averages per match so far

use serde::{Deserialize, Serialize};

use crate::features::aggregate::{ratio, FeatureValue};
use crate::features::reducer::Reducer;
use crate::{MatchRecord, SideStats};

/// Average match totals over every earlier match in the league
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeagueAverages {
    pub xg: FeatureValue,
    pub shots_on_target: FeatureValue,
    pub corners: FeatureValue,
}

impl LeagueAverages {
    pub const DIM: usize = 3;
    pub const NAMES: [&'static str; Self::DIM] = [
        "LeagueAvg_xG_perMatch_sofar",
        "LeagueAvg_SoT_perMatch_sofar",
        "LeagueAvg_Corners_perMatch_sofar",
    ];

    pub fn to_vec(&self) -> Vec<FeatureValue> {
        vec![self.xg, self.shots_on_target, self.corners]
    }
}

/// Running (sum, count) of one match total
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningTotal {
    sum: f64,
    count: usize,
}

impl RunningTotal {
    fn add(&mut self, value: Option<f64>) {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            self.sum += v;
            self.count += 1;
        }
    }

    fn mean(&self) -> FeatureValue {
        FeatureValue::from_option(ratio(self.sum, self.count as f64))
    }
}

const TOTALS: [fn(&SideStats) -> Option<f64>; LeagueAverages::DIM] =
    [|s| s.xg, |s| s.shots_on_target, |s| s.corners];

/// Unbounded league-wide running averages
#[derive(Debug, Clone, Copy, Default)]
pub struct LeagueContext;

impl Reducer for LeagueContext {
    type State = [RunningTotal; LeagueAverages::DIM];
    type Emit = LeagueAverages;

    fn emit(&self, state: &Self::State, _record: &MatchRecord) -> LeagueAverages {
        LeagueAverages {
            xg: state[0].mean(),
            shots_on_target: state[1].mean(),
            corners: state[2].mean(),
        }
    }

    fn absorb(&self, mut state: Self::State, record: &MatchRecord) -> Self::State {
        for (total, stat) in state.iter_mut().zip(TOTALS) {
            total.add(record.total(stat));
        }
        state
    }
}
