//! SLS-F+: a weighted z-score composite of attacking match totals
//!
//! Each of the five component totals is standardized, the weighted sum of the
//! z-scores forms a raw score, and raw scores are rescaled to
//! `center + spread * z` and clipped.

use serde::{Deserialize, Serialize};

use crate::features::reducer::validate_chronological;
use crate::{MatchRecord, Result, SideStats, TargetConfig};

/// Standard deviations at or below this are treated as zero
const MIN_SPREAD: f64 = 1e-9;

/// Components of the composite, in weight order
pub const COMPONENTS: [(&str, fn(&SideStats) -> Option<f64>); 5] = [
    ("xG", |s| s.xg),
    ("SoT", |s| s.shots_on_target),
    ("BigCh", |s| s.big_chances),
    ("Corners", |s| s.corners),
    ("ToB", |s| s.touches_opp_box),
];

/// Running mean and squared deviations of a series (Welford)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    count: usize,
    mean: f64,
    m2: f64,
}

impl Moments {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut moments = Moments::default();
        for v in values {
            moments.add(v);
        }
        moments
    }

    pub fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    fn squared_deviations(&self) -> Option<f64> {
        (self.count > 0).then_some(self.m2.max(0.0))
    }

    /// Standard deviation with n - 1 degrees of freedom
    pub fn sample_std(&self) -> Option<f64> {
        if self.count < 2 {
            return None;
        }
        Some((self.squared_deviations()? / (self.count - 1) as f64).sqrt())
    }

    /// Standard deviation with n degrees of freedom
    pub fn population_std(&self) -> Option<f64> {
        Some((self.squared_deviations()? / self.count as f64).sqrt())
    }

    /// z-score of a value, 0 when the spread is undefined or zero
    fn z(&self, value: f64, std: Option<f64>) -> f64 {
        match (self.mean(), std) {
            (Some(mean), Some(std)) if std > MIN_SPREAD => (value - mean) / std,
            _ => 0.0,
        }
    }
}

/// Computes fixed and rolling SLS-F+ scores
#[derive(Debug, Clone)]
pub struct SlsFplus {
    config: TargetConfig,
}

/// Raw and rescaled scores for one match
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SlsScore {
    pub raw: Option<f64>,
    pub scaled: Option<f64>,
}

impl SlsFplus {
    pub fn new(config: TargetConfig) -> Self {
        SlsFplus { config }
    }

    fn weights(&self) -> [f64; 5] {
        let c = &self.config;
        [
            c.xg_weight,
            c.shots_on_target_weight,
            c.big_chances_weight,
            c.corners_weight,
            c.touches_opp_box_weight,
        ]
    }

    fn totals(record: &MatchRecord) -> [Option<f64>; 5] {
        COMPONENTS.map(|(_, stat)| record.total(stat).filter(|v| v.is_finite()))
    }

    /// Weighted z-score sum, None if any component total is missing
    fn raw_score(&self, totals: &[Option<f64>; 5], history: &[Moments; 5]) -> Option<f64> {
        let mut raw = 0.0;
        for ((total, moments), weight) in totals.iter().zip(history).zip(self.weights()) {
            let value = (*total)?;
            raw += weight * moments.z(value, moments.sample_std());
        }
        Some(raw)
    }

    fn rescale(&self, raw: Option<f64>, mean: f64, std: Option<f64>) -> Option<f64> {
        let raw = raw?;
        let c = &self.config;
        let z = match std {
            Some(std) if std > MIN_SPREAD => (raw - mean) / std,
            _ => 0.0,
        };
        Some((c.scale_center + c.scale_spread * z).clamp(c.clip_min, c.clip_max))
    }

    /// Score every match against whole-season statistics
    pub fn fixed(&self, matches: &[MatchRecord]) -> Vec<SlsScore> {
        let totals: Vec<[Option<f64>; 5]> = matches.iter().map(Self::totals).collect();
        let season: [Moments; 5] =
            std::array::from_fn(|i| Moments::from_values(totals.iter().filter_map(|t| t[i])));

        let raws: Vec<Option<f64>> = totals.iter().map(|t| self.raw_score(t, &season)).collect();
        let spread = Moments::from_values(raws.iter().flatten().copied());
        let mean = spread.mean().unwrap_or(0.0);
        let std = spread.population_std();

        raws.into_iter()
            .map(|raw| SlsScore {
                raw,
                scaled: self.rescale(raw, mean, std),
            })
            .collect()
    }

    /// Score matches from `rolling_min_round` on against all matches of
    /// strictly earlier rounds. Earlier rounds get no score.
    pub fn rolling(&self, matches: &[MatchRecord]) -> Result<Vec<SlsScore>> {
        validate_chronological(matches)?;

        let mut history = [Moments::default(); 5];
        let mut absorbed = 0;
        let mut raws = Vec::with_capacity(matches.len());
        for (i, record) in matches.iter().enumerate() {
            // Fold in the previous rounds once this round starts
            if i > 0 && matches[i - 1].round != record.round {
                for earlier in &matches[absorbed..i] {
                    for (moments, total) in history.iter_mut().zip(Self::totals(earlier)) {
                        if let Some(v) = total {
                            moments.add(v);
                        }
                    }
                }
                absorbed = i;
            }

            let raw = if record.round < self.config.rolling_min_round || absorbed == 0 {
                None
            } else {
                self.raw_score(&Self::totals(record), &history)
            };
            raws.push(raw);
        }

        let spread = Moments::from_values(raws.iter().flatten().copied());
        let mean = spread.mean().unwrap_or(0.0);
        let std = spread.sample_std();
        log::debug!(
            "Rolling SLS-F+ scored {} of {} matches",
            spread.count,
            matches.len()
        );

        Ok(raws
            .into_iter()
            .map(|raw| SlsScore {
                raw,
                scaled: self.rescale(raw, mean, std),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::{make_full_match, synthetic_season};

    #[test]
    fn test_moments() {
        let m = Moments::from_values([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((m.mean().unwrap() - 5.0).abs() < 1e-9);
        assert!((m.population_std().unwrap() - 2.0).abs() < 1e-9);
        assert!((m.sample_std().unwrap() - (32.0_f64 / 7.0).sqrt()).abs() < 1e-9);
        assert_eq!(Moments::from_values([1.0]).sample_std(), None);
    }

    #[test]
    fn test_fixed_scores_are_centered_and_clipped() {
        let matches = synthetic_season(6, 11);
        let scores = SlsFplus::new(TargetConfig::default()).fixed(&matches);
        assert_eq!(scores.len(), matches.len());

        let raws: Vec<f64> = scores.iter().map(|s| s.raw.unwrap()).collect();
        // Raw scores are sums of centered z-scores
        assert!(raws.iter().sum::<f64>().abs() < 1e-6);

        let scaled: Vec<f64> = scores.iter().map(|s| s.scaled.unwrap()).collect();
        assert!(scaled.iter().all(|s| (0.0..=100.0).contains(s)));
        let mean = scaled.iter().sum::<f64>() / scaled.len() as f64;
        assert!((mean - 50.0).abs() < 5.0);
    }

    #[test]
    fn test_fixed_constant_season() {
        let matches: Vec<_> = (0..4)
            .map(|r| make_full_match(r, 1, 2, (1.0, 1.0), (1.0, 1.0), (9.0, 9.0)))
            .collect();
        let scores = SlsFplus::new(TargetConfig::default()).fixed(&matches);
        for s in scores {
            assert_eq!(s.raw, Some(0.0));
            assert_eq!(s.scaled, Some(50.0));
        }
    }

    #[test]
    fn test_rolling_uses_only_earlier_rounds() {
        let matches = synthetic_season(6, 5);
        let sls = SlsFplus::new(TargetConfig::default());
        let full = sls.rolling(&matches).unwrap();

        for (record, score) in matches.iter().zip(&full) {
            assert_eq!(score.raw.is_none(), record.round < 2);
        }

        // Raw scores never depend on the match itself or later rounds
        let cut = matches.iter().position(|m| m.round == 4).unwrap();
        let mut altered = matches.clone();
        for record in &mut altered[cut..] {
            record.home.xg = Some(9.0);
        }
        let partial = sls.rolling(&altered).unwrap();
        for i in 0..cut {
            assert_eq!(full[i].raw, partial[i].raw);
        }
    }

    #[test]
    fn test_rolling_z_against_history() {
        // Round 0 totals 2 and 4 (xG); round 2 sees mean 3, sample std sqrt(2)
        let matches = vec![
            make_full_match(0, 1, 2, (0.0, 0.0), (1.0, 1.0), (9.0, 9.0)),
            make_full_match(0, 3, 4, (0.0, 0.0), (2.0, 2.0), (9.0, 9.0)),
            make_full_match(2, 1, 3, (0.0, 0.0), (2.5, 2.5), (9.0, 9.0)),
        ];
        let config = TargetConfig {
            rolling_min_round: 1,
            ..TargetConfig::default()
        };
        let scores = SlsFplus::new(config).rolling(&matches).unwrap();

        assert_eq!(scores[0].raw, None);
        // Other components are constant and contribute 0
        let expected = 0.5 * (5.0 - 3.0) / 2.0_f64.sqrt();
        assert!((scores[2].raw.unwrap() - expected).abs() < 1e-9);
        // A single valid score has no spread and maps to the center
        assert_eq!(scores[2].scaled, Some(50.0));
    }

    #[test]
    fn test_rolling_rejects_unsorted() {
        let matches = vec![
            make_full_match(3, 1, 2, (0.0, 0.0), (1.0, 1.0), (9.0, 9.0)),
            make_full_match(1, 1, 2, (0.0, 0.0), (1.0, 1.0), (9.0, 9.0)),
        ];
        assert!(SlsFplus::new(TargetConfig::default()).rolling(&matches).is_err());
    }
}
