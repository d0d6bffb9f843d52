//! Liveliness targets
//!
//! Per-match labels describing how lively a match was, computed from the
//! match's own statistics. Targets are labels, not features: they may use
//! the whole season.

pub mod liveliness;
pub mod sls;

pub use liveliness::LivelinessMetric;
pub use sls::{SlsFplus, SlsScore};

use serde::Serialize;

use crate::{MatchRecord, Result, TargetConfig};

/// Every target for one match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetRow {
    pub match_id: i64,
    pub round: u32,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetTable {
    pub columns: Vec<String>,
    pub rows: Vec<TargetRow>,
}

impl TargetTable {
    /// All values of one target, in match order
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let index = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row.values[index]).collect())
    }
}

/// Compute the liveliness metrics and both SLS-F+ variants for a season
pub fn compute_targets(matches: &[MatchRecord], config: &TargetConfig) -> Result<TargetTable> {
    let sls = SlsFplus::new(config.clone());
    let rolling = sls.rolling(matches)?;
    let fixed = sls.fixed(matches);

    let mut columns: Vec<String> = LivelinessMetric::ALL
        .iter()
        .map(|m| m.name().to_string())
        .collect();
    columns.extend(
        [
            "SLS_Fplus_fixed_raw",
            "SLS_Fplus_fixed",
            "SLS_Fplus_rolling_raw",
            "SLS_Fplus_rolling",
        ]
        .map(String::from),
    );

    let rows = matches
        .iter()
        .zip(fixed.iter().zip(&rolling))
        .map(|(record, (fixed, rolling))| {
            let mut values: Vec<Option<f64>> = LivelinessMetric::ALL
                .iter()
                .map(|m| m.value(record))
                .collect();
            values.extend([fixed.raw, fixed.scaled, rolling.raw, rolling.scaled]);
            TargetRow {
                match_id: record.match_id,
                round: record.round,
                values,
            }
        })
        .collect();

    Ok(TargetTable { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::synthetic_season;

    #[test]
    fn test_target_table_shape() {
        let matches = synthetic_season(4, 2);
        let table = compute_targets(&matches, &TargetConfig::default()).unwrap();

        assert_eq!(table.rows.len(), matches.len());
        assert!(table.rows.iter().all(|r| r.values.len() == table.columns.len()));

        let simple = table.column("Liveliness_xG").unwrap();
        for (value, record) in simple.iter().zip(&matches) {
            assert_eq!(*value, LivelinessMetric::SimpleXg.value(record));
        }
        let rolling = table.column("SLS_Fplus_rolling").unwrap();
        assert!(rolling[0].is_none());
        assert!(rolling.last().unwrap().is_some());
        assert!(table.column("missing").is_none());
    }
}
