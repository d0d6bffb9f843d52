//! Per-match liveliness formulas
//!
//! Each metric is a weighted sum of match totals. Cards count as zero when
//! unreported; any other missing statistic makes the metric undefined.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{MatchRecord, SideStats};

/// Candidate liveliness targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LivelinessMetric {
    /// Total xG plus the smaller side's xG
    SimpleXg,
    /// Shot volume and quality
    ShotQuality,
    /// Many opportunities even at low xG
    Chances,
    /// Both sides attacking
    EndToEnd,
    /// Tempo and cards
    Intensity,
    Comprehensive,
    /// Shots and xG only
    Minimal,
}

fn xg(s: &SideStats) -> Option<f64> {
    s.xg
}

fn shots(s: &SideStats) -> Option<f64> {
    s.shots
}

impl LivelinessMetric {
    pub const ALL: [LivelinessMetric; 7] = [
        LivelinessMetric::SimpleXg,
        LivelinessMetric::ShotQuality,
        LivelinessMetric::Chances,
        LivelinessMetric::EndToEnd,
        LivelinessMetric::Intensity,
        LivelinessMetric::Comprehensive,
        LivelinessMetric::Minimal,
    ];

    /// Column name in a target table
    pub fn name(self) -> &'static str {
        match self {
            LivelinessMetric::SimpleXg => "Liveliness_xG",
            LivelinessMetric::ShotQuality => "shot_quality",
            LivelinessMetric::Chances => "chances",
            LivelinessMetric::EndToEnd => "end_to_end",
            LivelinessMetric::Intensity => "intensity",
            LivelinessMetric::Comprehensive => "comprehensive",
            LivelinessMetric::Minimal => "minimal",
        }
    }

    /// Metric value for a match, None if a required statistic is missing
    pub fn value(self, record: &MatchRecord) -> Option<f64> {
        let xg_total = || record.total(xg);
        let shots_total = || record.total(shots);
        let sot_total = || record.total(|s| s.shots_on_target);
        let bigch_total = || record.total(|s| s.big_chances);
        let corners_total = || record.total(|s| s.corners);
        let cards_total = || record.home.cards() + record.away.cards();

        let value = match self {
            LivelinessMetric::SimpleXg => xg_total()? + record.min_side(xg)?,
            LivelinessMetric::ShotQuality => {
                0.5 * xg_total()? + 0.3 * shots_total()? + 0.2 * sot_total()?
            }
            LivelinessMetric::Chances => {
                0.4 * shots_total()? + 0.3 * bigch_total()? + 0.3 * xg_total()?
            }
            LivelinessMetric::EndToEnd => {
                xg_total()? + 2.0 * record.min_side(xg)? + record.min_side(shots)?
            }
            LivelinessMetric::Intensity => {
                0.3 * xg_total()?
                    + 0.2 * shots_total()?
                    + 0.2 * corners_total()?
                    + 0.15 * cards_total()
                    + 0.15 * bigch_total()?
            }
            LivelinessMetric::Comprehensive => {
                0.25 * xg_total()?
                    + 0.20 * shots_total()?
                    + 0.15 * sot_total()?
                    + 0.15 * bigch_total()?
                    + 0.15 * corners_total()?
                    + 0.10 * cards_total()
            }
            LivelinessMetric::Minimal => 0.6 * xg_total()? + 0.4 * shots_total()?,
        };
        Some(value).filter(|v| v.is_finite())
    }
}

impl fmt::Display for LivelinessMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::{make_full_match, make_match};

    fn sample() -> MatchRecord {
        // shots 12/6, SoT 4/2, big chances 3/2, corners 6/3, cards 1/1
        make_full_match(0, 1, 2, (2.0, 1.0), (1.5, 0.5), (12.0, 6.0))
    }

    fn approx(metric: LivelinessMetric, expected: f64) {
        let got = metric.value(&sample()).unwrap();
        assert!((got - expected).abs() < 1e-9, "{}: {} vs {}", metric, got, expected);
    }

    #[test]
    fn test_metric_formulas() {
        approx(LivelinessMetric::SimpleXg, 2.5);
        approx(LivelinessMetric::ShotQuality, 0.5 * 2.0 + 0.3 * 18.0 + 0.2 * 6.0);
        approx(LivelinessMetric::Chances, 0.4 * 18.0 + 0.3 * 5.0 + 0.3 * 2.0);
        approx(LivelinessMetric::EndToEnd, 2.0 + 2.0 * 0.5 + 6.0);
        approx(
            LivelinessMetric::Intensity,
            0.3 * 2.0 + 0.2 * 18.0 + 0.2 * 9.0 + 0.15 * 2.0 + 0.15 * 5.0,
        );
        approx(
            LivelinessMetric::Comprehensive,
            0.25 * 2.0 + 0.2 * 18.0 + 0.15 * 6.0 + 0.15 * 5.0 + 0.15 * 9.0 + 0.1 * 2.0,
        );
        approx(LivelinessMetric::Minimal, 0.6 * 2.0 + 0.4 * 18.0);
    }

    #[test]
    fn test_missing_statistics() {
        let goals_only = make_match(0, 1, 2, 1.0, 1.0);
        for metric in LivelinessMetric::ALL {
            assert_eq!(metric.value(&goals_only), None);
        }

        let mut no_cards = sample();
        no_cards.home.yellow_cards = None;
        no_cards.away.yellow_cards = None;
        let got = LivelinessMetric::Minimal.value(&no_cards);
        assert!(got.is_some());
        let with_cards = LivelinessMetric::Intensity.value(&sample()).unwrap();
        let without = LivelinessMetric::Intensity.value(&no_cards).unwrap();
        assert!((with_cards - without - 0.15 * 2.0).abs() < 1e-9);
    }
}
