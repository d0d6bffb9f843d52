//! Progressive rolling aggregator
//!
//! For every match, emits an aggregate of each statistic over the home and
//! away teams' previous K matches, then appends the match's own values to
//! those teams' windows. One hash lookup per team per match, single pass.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::features::aggregate::{Aggregation, FeatureValue};
use crate::features::reducer::{self, Reducer};
use crate::features::window::{check_window, TrailingWindow};
use crate::{MatchRecord, Result, Side, TeamId};

/// Extracts one value for one side of a match
pub type Extractor = fn(&MatchRecord, Side) -> Option<f64>;

/// A named per-side statistic
#[derive(Clone)]
pub struct Statistic {
    pub name: String,
    pub extract: Extractor,
}

impl Statistic {
    pub fn new(name: impl Into<String>, extract: Extractor) -> Self {
        Statistic {
            name: name.into(),
            extract,
        }
    }

    /// Extract a usable value; non-finite numbers count as malformed
    fn value(&self, record: &MatchRecord, side: Side) -> Option<f64> {
        (self.extract)(record, side).filter(|v| v.is_finite())
    }
}

impl fmt::Debug for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statistic").field("name", &self.name).finish()
    }
}

/// Which earlier matches make up a team's timeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineScope {
    /// Home and away matches alike
    #[default]
    AllMatches,
    /// Only matches played on the same side as the current one
    VenueOnly,
}

/// Features emitted for one match, one value per statistic per side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingFeatures {
    pub home: Vec<FeatureValue>,
    pub away: Vec<FeatureValue>,
}

impl RollingFeatures {
    pub fn side(&self, side: Side) -> &[FeatureValue] {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}

/// Per-pass state: one window per statistic per timeline.
///
/// Every match takes a slot, so a skipped value still ages out the oldest
/// match; `None` marks the skip.
#[derive(Debug, Clone, Default)]
pub struct RollingState {
    windows: HashMap<(TeamId, Option<Side>), Vec<TrailingWindow<Option<f64>>>>,
    skipped: Vec<usize>,
}

impl RollingState {
    /// Malformed values skipped so far, per statistic
    pub fn skipped(&self) -> &[usize] {
        &self.skipped
    }
}

/// Result of a full aggregation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingOutput {
    /// Statistic names, in the order of each feature vector
    pub names: Vec<String>,
    /// One entry per input match, in input order
    pub rows: Vec<RollingFeatures>,
    /// Malformed values skipped, per statistic
    pub skipped: Vec<usize>,
}

impl RollingOutput {
    pub fn total_skipped(&self) -> usize {
        self.skipped.iter().sum()
    }

    /// Position of a statistic by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// Trailing-window aggregator over a set of statistics
#[derive(Debug, Clone)]
pub struct RollingAggregator {
    statistics: Vec<Statistic>,
    aggregation: Aggregation,
    window: usize,
    min_history: usize,
    scope: TimelineScope,
}

impl RollingAggregator {
    /// Aggregator over the last `window` matches, requiring a full window
    pub fn new(window: usize, aggregation: Aggregation) -> Result<Self> {
        check_window("rolling", window, window)?;
        aggregation.validate()?;
        Ok(RollingAggregator {
            statistics: Vec::new(),
            aggregation,
            window,
            min_history: window,
            scope: TimelineScope::AllMatches,
        })
    }

    /// Emit a value once a team has at least `min_history` prior matches
    pub fn with_min_history(mut self, min_history: usize) -> Result<Self> {
        check_window("rolling", self.window, min_history)?;
        self.min_history = min_history.max(1);
        Ok(self)
    }

    pub fn with_scope(mut self, scope: TimelineScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn statistic(mut self, name: impl Into<String>, extract: Extractor) -> Self {
        self.statistics.push(Statistic::new(name, extract));
        self
    }

    pub fn with_statistics(mut self, statistics: impl IntoIterator<Item = Statistic>) -> Self {
        self.statistics.extend(statistics);
        self
    }

    pub fn names(&self) -> Vec<String> {
        self.statistics.iter().map(|s| s.name.clone()).collect()
    }

    fn key(&self, record: &MatchRecord, side: Side) -> (TeamId, Option<Side>) {
        match self.scope {
            TimelineScope::AllMatches => (record.team(side), None),
            TimelineScope::VenueOnly => (record.team(side), Some(side)),
        }
    }

    fn emit_side(&self, state: &RollingState, record: &MatchRecord, side: Side) -> Vec<FeatureValue> {
        let windows = state.windows.get(&self.key(record, side));
        (0..self.statistics.len())
            .map(|i| {
                let values: Vec<f64> = windows
                    .and_then(|w| w.get(i))
                    .map(|w| w.iter().flatten().copied().collect())
                    .unwrap_or_default();
                if values.len() >= self.min_history {
                    FeatureValue::or_undefined(self.aggregation.apply(&values))
                } else {
                    FeatureValue::InsufficientHistory
                }
            })
            .collect()
    }

    fn absorb_side(&self, state: &mut RollingState, record: &MatchRecord, side: Side) {
        let n = self.statistics.len();
        if state.skipped.len() < n {
            state.skipped.resize(n, 0);
        }
        let window = self.window;
        let windows = state
            .windows
            .entry(self.key(record, side))
            .or_insert_with(|| (0..n).map(|_| TrailingWindow::new(window)).collect());
        for (i, stat) in self.statistics.iter().enumerate() {
            let value = stat.value(record, side);
            if value.is_none() {
                log::trace!(
                    "Skipping {} for {} in match {}",
                    stat.name,
                    record.team(side),
                    record.match_id
                );
                state.skipped[i] += 1;
            }
            windows[i].push(value);
        }
    }

    /// Run one full pass over a chronologically ordered match sequence
    pub fn run(&self, matches: &[MatchRecord]) -> Result<RollingOutput> {
        reducer::validate_chronological(matches)?;
        Ok(self.run_unchecked(matches))
    }

    /// Pass over matches whose order has already been validated
    pub(crate) fn run_unchecked(&self, matches: &[MatchRecord]) -> RollingOutput {
        let (state, rows) = reducer::fold_unchecked(self, matches);

        let mut skipped = state.skipped;
        skipped.resize(self.statistics.len(), 0);
        let output = RollingOutput {
            names: self.names(),
            rows,
            skipped,
        };

        log::debug!(
            "Rolling pass over {} matches ({} statistics, window {})",
            matches.len(),
            self.statistics.len(),
            self.window
        );
        if output.total_skipped() > 0 {
            log::warn!(
                "Skipped {} malformed statistic values during rolling pass",
                output.total_skipped()
            );
        }
        output
    }
}

impl Reducer for RollingAggregator {
    type State = RollingState;
    type Emit = RollingFeatures;

    fn emit(&self, state: &RollingState, record: &MatchRecord) -> RollingFeatures {
        RollingFeatures {
            home: self.emit_side(state, record, Side::Home),
            away: self.emit_side(state, record, Side::Away),
        }
    }

    fn absorb(&self, mut state: RollingState, record: &MatchRecord) -> RollingState {
        self.absorb_side(&mut state, record, Side::Home);
        self.absorb_side(&mut state, record, Side::Away);
        state
    }
}
