//! Pre-match feature extraction
//!
//! Every feature is computed progressively: the value emitted for a match
//! only depends on matches earlier in the input sequence.

pub mod aggregate;
pub mod form;
pub mod head_to_head;
pub mod league;
pub mod opponent;
pub mod reducer;
pub mod rest;
pub mod rolling;
pub mod standings;
pub mod stats;
pub mod streaks;
pub mod style;
pub mod table;
pub mod window;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregate::{Aggregation, FeatureValue, HistoryPolicy};
pub use reducer::{fold, snapshots, step, validate_chronological, Reducer};
pub use rolling::{RollingAggregator, RollingFeatures, RollingOutput, Statistic, TimelineScope};
pub use standings::LeagueTable;
pub use table::{FeatureBuilder, FeatureRow, FeatureTable};
pub use window::TrailingWindow;
