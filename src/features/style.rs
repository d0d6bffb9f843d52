//! Playing style and extreme result tendencies

use serde::{Deserialize, Serialize};

use crate::features::aggregate::{ratio, FeatureValue};
use crate::features::reducer::Reducer;
use crate::features::window::{TeamWindows, TrailingWindow};
use crate::{MatchRecord, Side};

/// Shooting style over a team's recent matches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Shots per expected goal (high = volume shooter)
    pub shots_per_xg: FeatureValue,
    /// Goals per big chance
    pub big_chance_conversion: FeatureValue,
    /// Goals per shot
    pub shot_efficiency: FeatureValue,
}

impl Style {
    pub const DIM: usize = 3;
    pub const NAMES: [&'static str; Self::DIM] = ["shots_per_xG", "bigch_conversion", "shot_efficiency"];

    pub fn to_vec(&self) -> Vec<FeatureValue> {
        vec![self.shots_per_xg, self.big_chance_conversion, self.shot_efficiency]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StyleFeatures {
    pub home: Style,
    pub away: Style,
}

/// Attacking output of one team in one match
#[derive(Debug, Clone, Copy, Default)]
pub struct Attempt {
    pub shots: f64,
    pub xg: f64,
    pub big_chances: f64,
    pub goals: f64,
}

/// Ratio-of-sums style indicators over the last `window` matches.
/// A match without a full set of attacking stats takes a slot but adds nothing.
#[derive(Debug, Clone, Copy)]
pub struct StyleTracker {
    window: usize,
}

impl StyleTracker {
    pub fn new(window: usize) -> Self {
        StyleTracker { window }
    }

    fn compute(history: Option<&TrailingWindow<Option<Attempt>>>) -> Style {
        let totals = history
            .filter(|h| h.iter().any(Option::is_some))
            .map(|h| {
                h.iter().flatten().fold(Attempt::default(), |acc, a| Attempt {
                    shots: acc.shots + a.shots,
                    xg: acc.xg + a.xg,
                    big_chances: acc.big_chances + a.big_chances,
                    goals: acc.goals + a.goals,
                })
            });
        match totals {
            Some(t) => Style {
                shots_per_xg: FeatureValue::or_undefined(ratio(t.shots, t.xg)),
                big_chance_conversion: FeatureValue::or_undefined(ratio(t.goals, t.big_chances)),
                shot_efficiency: FeatureValue::or_undefined(ratio(t.goals, t.shots)),
            },
            None => Style {
                shots_per_xg: FeatureValue::InsufficientHistory,
                big_chance_conversion: FeatureValue::InsufficientHistory,
                shot_efficiency: FeatureValue::InsufficientHistory,
            },
        }
    }
}

impl Reducer for StyleTracker {
    type State = TeamWindows<Option<Attempt>>;
    type Emit = StyleFeatures;

    fn emit(&self, state: &Self::State, record: &MatchRecord) -> StyleFeatures {
        StyleFeatures {
            home: Self::compute(state.get(&record.home_team)),
            away: Self::compute(state.get(&record.away_team)),
        }
    }

    fn absorb(&self, mut state: Self::State, record: &MatchRecord) -> Self::State {
        for side in [Side::Home, Side::Away] {
            let stats = record.stats(side);
            let attempt = match (stats.shots, stats.xg, stats.big_chances, stats.goals) {
                (Some(shots), Some(xg), Some(big_chances), Some(goals)) => Some(Attempt {
                    shots,
                    xg,
                    big_chances,
                    goals,
                }),
                _ => None,
            };
            state.push(record.team(side), attempt, self.window);
        }
        state
    }
}

/// Share of a team's recent matches that were lopsided, tight or high scoring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremes {
    pub blowout_rate: FeatureValue,
    pub close_game_rate: FeatureValue,
    pub high_scoring_rate: FeatureValue,
}

impl Extremes {
    pub const DIM: usize = 3;
    pub const NAMES: [&'static str; Self::DIM] = ["blowout_rate", "close_game_rate", "high_scoring_rate"];

    pub fn to_vec(&self) -> Vec<FeatureValue> {
        vec![self.blowout_rate, self.close_game_rate, self.high_scoring_rate]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtremeFeatures {
    pub home: Extremes,
    pub away: Extremes,
}

/// Thresholds for classifying a result
#[derive(Debug, Clone, Copy)]
pub struct ExtremeThresholds {
    /// Goal margin at or above which a match is a blowout
    pub blowout_margin: f64,
    /// Goal margin at or below which a match is close
    pub close_margin: f64,
    /// Total goals at or above which a match is high scoring
    pub high_scoring_goals: f64,
}

/// Tracks (margin, total goals) of each team's recent matches
#[derive(Debug, Clone, Copy)]
pub struct ExtremeResults {
    window: usize,
    min_history: usize,
    thresholds: ExtremeThresholds,
}

impl ExtremeResults {
    pub fn new(window: usize, min_history: usize, thresholds: ExtremeThresholds) -> Self {
        ExtremeResults {
            window,
            min_history: min_history.max(1),
            thresholds,
        }
    }

    fn compute(&self, history: Option<&TrailingWindow<Option<(f64, f64)>>>) -> Extremes {
        let results: Vec<(f64, f64)> = history
            .map(|h| h.iter().flatten().copied().collect())
            .unwrap_or_default();
        if results.len() < self.min_history {
            return Extremes {
                blowout_rate: FeatureValue::InsufficientHistory,
                close_game_rate: FeatureValue::InsufficientHistory,
                high_scoring_rate: FeatureValue::InsufficientHistory,
            };
        }
        let n = results.len() as f64;
        let share = |pred: &dyn Fn(f64, f64) -> bool| {
            let hits = results.iter().filter(|(m, t)| pred(*m, *t)).count();
            FeatureValue::Value(hits as f64 / n)
        };
        let t = self.thresholds;
        Extremes {
            blowout_rate: share(&|margin, _| margin >= t.blowout_margin),
            close_game_rate: share(&|margin, _| margin <= t.close_margin),
            high_scoring_rate: share(&|_, total| total >= t.high_scoring_goals),
        }
    }
}

impl Reducer for ExtremeResults {
    type State = TeamWindows<Option<(f64, f64)>>;
    type Emit = ExtremeFeatures;

    fn emit(&self, state: &Self::State, record: &MatchRecord) -> ExtremeFeatures {
        ExtremeFeatures {
            home: self.compute(state.get(&record.home_team)),
            away: self.compute(state.get(&record.away_team)),
        }
    }

    fn absorb(&self, mut state: Self::State, record: &MatchRecord) -> Self::State {
        let result = record.goal_margin().zip(record.total_goals());
        state.push(record.home_team, result, self.window);
        state.push(record.away_team, result, self.window);
        state
    }
}
