//! Match feature table
//!
//! Runs every feature family over a season in one validated pass and lays
//! the results out as one row per match with a fixed column order.

use serde::{Deserialize, Serialize};

use crate::features::aggregate::{Aggregation, FeatureValue, HistoryPolicy};
use crate::features::form::{FormTrajectory, Trajectory};
use crate::features::head_to_head::{HeadToHead, HeadToHeadTracker};
use crate::features::league::{LeagueAverages, LeagueContext};
use crate::features::opponent::{OpponentQuality, OpponentTracker};
use crate::features::reducer::{fold_unchecked, validate_chronological, Reducer};
use crate::features::rest::{RestDays, RestFeatures};
use crate::features::rolling::{RollingAggregator, RollingOutput};
use crate::features::standings::{MatchContext, PositionBands, Standing, Standings};
use crate::features::stats;
use crate::features::streaks::{StreakCounts, Streaks};
use crate::features::style::{ExtremeResults, ExtremeThresholds, Extremes, Style, StyleTracker};
use crate::{FeatureConfig, MatchRecord, Result, Side, TeamId};

/// Pair features combining both teams' rolling attack and defence
pub const COMPOSITE_NAMES: [&str; 6] = [
    "TempoSum",
    "SoTSum",
    "AttackVsDefense",
    "xG_att_sum",
    "xG_att_min",
    "BigCh_sum",
];

/// Features for one match, resolved under a history policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub match_id: i64,
    pub round: u32,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub values: Vec<Option<f64>>,
}

/// One row per input match, in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    pub columns: Vec<String>,
    pub rows: Vec<FeatureRow>,
    pub policy: HistoryPolicy,
    /// Malformed statistic values skipped by the rolling passes
    pub skipped: usize,
}

impl FeatureTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, in match order
    pub fn column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row.values[index]).collect())
    }

    pub fn row(&self, match_id: i64) -> Option<&FeatureRow> {
        self.rows.iter().find(|row| row.match_id == match_id)
    }

    /// Value of one cell
    pub fn get(&self, match_id: i64, name: &str) -> Option<f64> {
        let index = self.column_index(name)?;
        self.row(match_id)?.values[index]
    }
}

/// Unresolved cells accumulated family by family
struct Columns {
    names: Vec<String>,
    rows: Vec<Vec<FeatureValue>>,
}

impl Columns {
    fn new(matches: usize) -> Self {
        Columns {
            names: Vec::new(),
            rows: vec![Vec::new(); matches],
        }
    }

    fn append<T>(&mut self, names: Vec<String>, emitted: &[T], cells: impl Fn(&T) -> Vec<FeatureValue>) {
        for (row, value) in self.rows.iter_mut().zip(emitted) {
            let values = cells(value);
            debug_assert_eq!(values.len(), names.len());
            row.extend(values);
        }
        self.names.extend(names);
    }

    fn append_rolling(&mut self, output: &RollingOutput) {
        let names = sided(output.names.iter().map(String::as_str));
        self.append(names, &output.rows, |features| {
            features.home.iter().chain(&features.away).copied().collect()
        });
    }
}

/// `home_<name>` for every name, then `away_<name>`
fn sided<'a>(names: impl IntoIterator<Item = &'a str> + Clone) -> Vec<String> {
    [Side::Home, Side::Away]
        .into_iter()
        .flat_map(|side| {
            names
                .clone()
                .into_iter()
                .map(move |name| format!("{}_{}", side.prefix(), name))
        })
        .collect()
}

fn plain(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn both<T>(home: &T, away: &T, to_vec: impl Fn(&T) -> Vec<FeatureValue>) -> Vec<FeatureValue> {
    let mut values = to_vec(home);
    values.extend(to_vec(away));
    values
}

/// Builds the feature table for a season
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    config: FeatureConfig,
    attack_defence: RollingAggregator,
    consistency: RollingAggregator,
    weighted_form: RollingAggregator,
}

impl FeatureBuilder {
    pub fn new(config: &FeatureConfig) -> Result<Self> {
        config.validate()?;

        let attack_defence = RollingAggregator::new(config.form_window, Aggregation::Mean)?
            .with_scope(config.timeline)
            .with_statistics(stats::attack_defence());
        let consistency = RollingAggregator::new(config.variance_window, Aggregation::StdDev)?
            .with_min_history(config.variance_min_history)?
            .with_scope(config.timeline)
            .with_statistics(stats::consistency());
        let weights = config.weighted_form_weights.clone();
        let weighted_form =
            RollingAggregator::new(weights.len(), Aggregation::WeightedMean(weights))?
                .with_min_history(config.weighted_form_min_history)?
                .with_scope(config.timeline)
                .with_statistics(stats::weighted_form());

        Ok(FeatureBuilder {
            config: config.clone(),
            attack_defence,
            consistency,
            weighted_form,
        })
    }

    fn run<R: Reducer>(reducer: &R, matches: &[MatchRecord]) -> Vec<R::Emit> {
        fold_unchecked(reducer, matches).1
    }

    /// Composite pair features from the rolling attack and defence output
    fn composites(output: &RollingOutput) -> Vec<Vec<FeatureValue>> {
        let index = |name: &str| output.index_of(name);
        let (Some(xg), Some(sot), Some(bigch), Some(xga)) = (
            index("xG_att_90"),
            index("SoT_att_90"),
            index("BigCh_att_90"),
            index("xGA_def_90"),
        ) else {
            return vec![vec![FeatureValue::InsufficientHistory; COMPOSITE_NAMES.len()]; output.rows.len()];
        };

        output
            .rows
            .iter()
            .map(|row| {
                let inputs = [
                    row.home[xg],
                    row.away[xg],
                    row.home[sot],
                    row.away[sot],
                    row.home[bigch],
                    row.away[bigch],
                    row.home[xga],
                    row.away[xga],
                ];
                let [Some(h_xg), Some(a_xg), Some(h_sot), Some(a_sot), Some(h_bc), Some(a_bc), Some(h_xga), Some(a_xga)] =
                    inputs.map(FeatureValue::value)
                else {
                    let missing = if inputs.iter().any(|v| v.is_insufficient()) {
                        FeatureValue::InsufficientHistory
                    } else {
                        FeatureValue::Undefined
                    };
                    return vec![missing; COMPOSITE_NAMES.len()];
                };
                [
                    h_xg + a_xg + h_sot + a_sot,
                    h_sot + a_sot,
                    (h_xg - a_xga) + (a_xg - h_xga),
                    h_xg + a_xg,
                    h_xg.min(a_xg),
                    h_bc + a_bc,
                ]
                .into_iter()
                .map(FeatureValue::Value)
                .collect()
            })
            .collect()
    }

    /// Compute every feature for every match
    pub fn build(&self, matches: &[MatchRecord]) -> Result<FeatureTable> {
        validate_chronological(matches)?;
        let c = &self.config;
        let mut columns = Columns::new(matches.len());

        let attack_defence = self.attack_defence.run_unchecked(matches);
        let consistency = self.consistency.run_unchecked(matches);
        let weighted_form = self.weighted_form.run_unchecked(matches);
        let skipped =
            attack_defence.total_skipped() + consistency.total_skipped() + weighted_form.total_skipped();
        columns.append_rolling(&attack_defence);
        columns.append_rolling(&consistency);
        columns.append_rolling(&weighted_form);

        let extremes = ExtremeResults::new(
            c.extreme_window,
            c.extreme_min_history,
            ExtremeThresholds {
                blowout_margin: c.blowout_margin,
                close_margin: c.close_margin,
                high_scoring_goals: c.high_scoring_goals,
            },
        );
        columns.append(sided(Extremes::NAMES), &Self::run(&extremes, matches), |f| {
            both(&f.home, &f.away, Extremes::to_vec)
        });

        let style = StyleTracker::new(c.style_window);
        columns.append(sided(Style::NAMES), &Self::run(&style, matches), |f| {
            both(&f.home, &f.away, Style::to_vec)
        });

        columns.append(sided(StreakCounts::NAMES), &Self::run(&Streaks, matches), |f| {
            both(&f.home, &f.away, |s| {
                s.to_vec().into_iter().map(FeatureValue::Value).collect()
            })
        });

        let trajectory = FormTrajectory::new(c.trajectory_recent, c.trajectory_previous);
        columns.append(sided(Trajectory::NAMES), &Self::run(&trajectory, matches), |f| {
            both(&f.home, &f.away, Trajectory::to_vec)
        });

        let h2h = HeadToHeadTracker::new(c.h2h_window, c.high_scoring_goals);
        columns.append(plain(&HeadToHead::NAMES), &Self::run(&h2h, matches), HeadToHead::to_vec);

        let standings = Standings::new(PositionBands {
            top: c.top_positions,
            bottom: c.bottom_position,
            close_gap: c.close_position_gap,
        });
        let mut standing_names = sided(Standing::NAMES);
        standing_names.extend(plain(&MatchContext::NAMES));
        columns.append(standing_names, &Self::run(&standings, matches), |f| {
            let mut values = both(&f.home, &f.away, Standing::to_vec);
            values.extend(f.context.to_vec());
            values
        });

        let opponents = OpponentTracker::new(c.opponent_window, c.top_positions);
        columns.append(sided(OpponentQuality::NAMES), &Self::run(&opponents, matches), |f| {
            both(&f.home, &f.away, OpponentQuality::to_vec)
        });

        columns.append(plain(&RestFeatures::NAMES), &Self::run(&RestDays, matches), RestFeatures::to_vec);
        columns.append(
            plain(&LeagueAverages::NAMES),
            &Self::run(&LeagueContext, matches),
            LeagueAverages::to_vec,
        );
        columns.append(plain(&COMPOSITE_NAMES), &Self::composites(&attack_defence), |v| v.clone());

        let policy = c.history_policy;
        let rows = matches
            .iter()
            .zip(columns.rows)
            .map(|(record, values)| FeatureRow {
                match_id: record.match_id,
                round: record.round,
                home_team: record.home_team,
                away_team: record.away_team,
                values: values.into_iter().map(|v| v.resolve(policy)).collect(),
            })
            .collect();

        log::info!(
            "Built {} features for {} matches ({} malformed values skipped)",
            columns.names.len(),
            matches.len(),
            skipped
        );
        Ok(FeatureTable {
            columns: columns.names,
            rows,
            policy,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::test_support::{make_full_match, synthetic_season};
    use crate::features::TimelineScope;

    fn build(config: &FeatureConfig, matches: &[MatchRecord]) -> FeatureTable {
        FeatureBuilder::new(config).unwrap().build(matches).unwrap()
    }

    #[test]
    fn test_columns_are_unique_and_rectangular() {
        let matches = synthetic_season(6, 1);
        let table = build(&FeatureConfig::default(), &matches);

        let mut names = table.columns.clone();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), table.columns.len());
        assert_eq!(table.rows.len(), matches.len());
        assert!(table.rows.iter().all(|r| r.values.len() == table.columns.len()));
        assert!(table.column_index("home_xG_att_90").is_some());
        assert!(table.column_index("away_clean_sheet_streak").is_some());
        assert!(table.column_index("TempoSum").is_some());
        assert!(table.column_index("home_tough_schedule_pct").is_some());
    }

    #[test]
    fn test_two_runs_serialize_identically() {
        let matches = synthetic_season(8, 42);
        let builder = FeatureBuilder::new(&FeatureConfig::default()).unwrap();
        let first = serde_json::to_string(&builder.build(&matches).unwrap()).unwrap();
        let second = serde_json::to_string(&builder.build(&matches).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_table_has_no_leakage() {
        let matches = synthetic_season(8, 9);
        let config = FeatureConfig::default();
        let full = build(&config, &matches);

        for round in [0, 3, 8] {
            let prefix: Vec<_> = matches.iter().filter(|m| m.round <= round).cloned().collect();
            let partial = build(&config, &prefix);
            assert_eq!(&full.rows[..prefix.len()], &partial.rows[..]);
        }
    }

    #[test]
    fn test_history_policies() {
        let matches = synthetic_season(4, 7);
        let missing = build(&FeatureConfig::default(), &matches);
        let zero_fill = build(
            &FeatureConfig {
                history_policy: HistoryPolicy::ZeroFill,
                ..FeatureConfig::default()
            },
            &matches,
        );

        let first = &matches[0];
        assert_eq!(missing.get(first.match_id, "home_xG_att_90"), None);
        assert_eq!(zero_fill.get(first.match_id, "home_xG_att_90"), Some(0.0));
        // Streaks and standings are always defined
        assert_eq!(missing.get(first.match_id, "home_win_streak"), Some(0.0));
        assert_eq!(missing.get(first.match_id, "home_position"), Some(1.0));
        assert!(zero_fill.rows.iter().all(|r| r.values.iter().all(|v| v.is_some())));
    }

    #[test]
    fn test_undefined_ratio_is_not_zero_filled() {
        let mut first = make_full_match(0, 1, 2, (0.0, 1.0), (0.5, 1.2), (6.0, 8.0));
        first.home.big_chances = Some(0.0);
        let matches = vec![first, make_full_match(1, 1, 3, (1.0, 1.0), (1.0, 1.0), (9.0, 9.0))];
        let table = build(
            &FeatureConfig {
                history_policy: HistoryPolicy::ZeroFill,
                ..FeatureConfig::default()
            },
            &matches,
        );
        let id = matches[1].match_id;

        // Team 1 has a match behind it, but no big chances to convert
        assert_eq!(table.get(id, "home_bigch_conversion"), None);
        assert_eq!(table.get(id, "home_shots_per_xG"), Some(12.0));
        // Team 3 has no history at all and is zero filled
        assert_eq!(table.get(id, "away_bigch_conversion"), Some(0.0));
    }

    #[test]
    fn test_composites() {
        let matches = vec![
            make_full_match(0, 1, 2, (1.0, 0.0), (1.5, 0.5), (9.0, 6.0)),
            make_full_match(1, 1, 2, (0.0, 0.0), (1.0, 1.0), (3.0, 3.0)),
        ];
        let config = FeatureConfig {
            form_window: 1,
            ..FeatureConfig::default()
        };
        let table = build(&config, &matches);
        let id = matches[1].match_id;

        // Team 1 had xG 1.5, SoT 3, big chances 2, xGA 0.5; team 2 the mirror
        assert_eq!(table.get(id, "xG_att_sum"), Some(2.0));
        assert_eq!(table.get(id, "xG_att_min"), Some(0.5));
        assert_eq!(table.get(id, "SoTSum"), Some(5.0));
        assert_eq!(table.get(id, "TempoSum"), Some(7.0));
        assert_eq!(table.get(id, "AttackVsDefense"), Some(0.0));
        assert_eq!(table.get(id, "BigCh_sum"), Some(3.0));
        assert_eq!(table.get(matches[0].match_id, "TempoSum"), None);
    }

    #[test]
    fn test_venue_only_timeline() {
        let matches = vec![
            make_full_match(0, 1, 2, (1.0, 0.0), (1.5, 0.5), (9.0, 6.0)),
            make_full_match(1, 2, 1, (0.0, 0.0), (1.0, 1.0), (3.0, 3.0)),
        ];
        let config = FeatureConfig {
            form_window: 1,
            timeline: TimelineScope::VenueOnly,
            ..FeatureConfig::default()
        };
        let table = build(&config, &matches);
        // Team 2 has never played at home
        assert_eq!(table.get(matches[1].match_id, "home_xG_att_90"), None);
    }

    #[test]
    fn test_rejects_invalid_config_and_order() {
        let config = FeatureConfig {
            weighted_form_weights: vec![],
            ..FeatureConfig::default()
        };
        assert!(FeatureBuilder::new(&config).is_err());

        let mut matches = synthetic_season(4, 3);
        matches.reverse();
        let builder = FeatureBuilder::new(&FeatureConfig::default()).unwrap();
        assert!(builder.build(&matches).is_err());
    }
}
