//! Football match liveliness features
//!
//! Leakage-free rolling team features and liveliness targets computed from a
//! chronologically ordered sequence of completed league matches.

pub mod features;
pub mod target;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::features::{HistoryPolicy, TimelineScope};

/// Unique identifier for a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub i64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team({})", self.0)
    }
}

/// Which side of a fixture a team played on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }

    /// Column prefix used in feature tables
    pub fn prefix(self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Home => write!(f, "Home"),
            Side::Away => write!(f, "Away"),
        }
    }
}

/// Result of a match from one team's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Win,
    Draw,
    Loss,
}

impl MatchOutcome {
    /// League points awarded for this outcome
    pub fn points(self) -> u32 {
        match self {
            MatchOutcome::Win => 3,
            MatchOutcome::Draw => 1,
            MatchOutcome::Loss => 0,
        }
    }
}

/// Match statistics recorded for one side.
///
/// A `None` means the source did not report the value, which is not the same
/// as a reported zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SideStats {
    pub goals: Option<f64>,
    /// Expected goals
    pub xg: Option<f64>,
    pub shots: Option<f64>,
    pub shots_on_target: Option<f64>,
    pub big_chances: Option<f64>,
    pub corners: Option<f64>,
    /// Touches in the opposition box
    pub touches_opp_box: Option<f64>,
    pub yellow_cards: Option<f64>,
    pub red_cards: Option<f64>,
}

impl SideStats {
    /// Yellow plus red cards, treating unreported cards as none shown
    pub fn cards(&self) -> f64 {
        self.yellow_cards.unwrap_or(0.0) + self.red_cards.unwrap_or(0.0)
    }
}

/// A single completed league match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: i64,
    /// Chronological key: zero-based league round
    pub round: u32,
    pub date: Option<NaiveDate>,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_name: String,
    pub away_name: String,
    pub home: SideStats,
    pub away: SideStats,
}

impl MatchRecord {
    /// Team that played on the given side
    pub fn team(&self, side: Side) -> TeamId {
        match side {
            Side::Home => self.home_team,
            Side::Away => self.away_team,
        }
    }

    /// Statistics recorded for the given side
    pub fn stats(&self, side: Side) -> &SideStats {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// Side a team played on, or None if it did not take part
    pub fn side_of(&self, team: TeamId) -> Option<Side> {
        if team == self.home_team {
            Some(Side::Home)
        } else if team == self.away_team {
            Some(Side::Away)
        } else {
            None
        }
    }

    /// Get the opponent for a given team
    pub fn opponent(&self, team: TeamId) -> Option<TeamId> {
        self.side_of(team).map(|side| self.team(side.opposite()))
    }

    pub fn goals_for(&self, side: Side) -> Option<f64> {
        self.stats(side).goals
    }

    pub fn goals_against(&self, side: Side) -> Option<f64> {
        self.stats(side.opposite()).goals
    }

    /// Outcome for the given side, or None if either score is unknown
    pub fn outcome(&self, side: Side) -> Option<MatchOutcome> {
        let scored = self.goals_for(side)?;
        let conceded = self.goals_against(side)?;
        Some(if scored > conceded {
            MatchOutcome::Win
        } else if scored < conceded {
            MatchOutcome::Loss
        } else {
            MatchOutcome::Draw
        })
    }

    /// League points earned by the given side
    pub fn points(&self, side: Side) -> Option<f64> {
        self.outcome(side).map(|o| o.points() as f64)
    }

    pub fn total_goals(&self) -> Option<f64> {
        Some(self.home.goals? + self.away.goals?)
    }

    /// Absolute goal difference
    pub fn goal_margin(&self) -> Option<f64> {
        Some((self.home.goals? - self.away.goals?).abs())
    }

    /// Sum of a statistic over both sides
    pub fn total(&self, stat: impl Fn(&SideStats) -> Option<f64>) -> Option<f64> {
        Some(stat(&self.home)? + stat(&self.away)?)
    }

    /// Smaller of a statistic over both sides
    pub fn min_side(&self, stat: impl Fn(&SideStats) -> Option<f64>) -> Option<f64> {
        Some(stat(&self.home)?.min(stat(&self.away)?))
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum FootyError {
    #[error(
        "Matches out of chronological order at index {index}: round {current} follows round {previous}"
    )]
    Unsorted {
        index: usize,
        previous: u32,
        current: u32,
    },

    #[error("Invalid window for {name}: window {window}, min history {min_history}")]
    InvalidWindow {
        name: String,
        window: usize,
        min_history: usize,
    },

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FootyError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub features: FeatureConfig,
    pub target: TargetConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub form_window: usize,
    pub history_policy: HistoryPolicy,
    pub timeline: TimelineScope,
    pub variance_window: usize,
    pub variance_min_history: usize,
    /// Most recent match first
    pub weighted_form_weights: Vec<f64>,
    pub weighted_form_min_history: usize,
    pub h2h_window: usize,
    pub extreme_window: usize,
    pub extreme_min_history: usize,
    pub trajectory_recent: usize,
    pub trajectory_previous: usize,
    pub opponent_window: usize,
    pub style_window: usize,
    pub top_positions: u32,
    pub bottom_position: u32,
    pub close_position_gap: u32,
    pub high_scoring_goals: f64,
    pub blowout_margin: f64,
    pub close_margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub xg_weight: f64,
    pub shots_on_target_weight: f64,
    pub big_chances_weight: f64,
    pub corners_weight: f64,
    pub touches_opp_box_weight: f64,
    /// First round that gets a rolling SLS-F+ score
    pub rolling_min_round: u32,
    pub scale_center: f64,
    pub scale_spread: f64,
    pub clip_min: f64,
    pub clip_max: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        FeatureConfig {
            form_window: 5,
            history_policy: HistoryPolicy::Missing,
            timeline: TimelineScope::AllMatches,
            variance_window: 5,
            variance_min_history: 3,
            weighted_form_weights: vec![0.4, 0.3, 0.2, 0.1],
            weighted_form_min_history: 4,
            h2h_window: 5,
            extreme_window: 10,
            extreme_min_history: 3,
            trajectory_recent: 3,
            trajectory_previous: 5,
            opponent_window: 5,
            style_window: 5,
            top_positions: 6,
            bottom_position: 15,
            close_position_gap: 3,
            high_scoring_goals: 4.0,
            blowout_margin: 3.0,
            close_margin: 1.0,
        }
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        TargetConfig {
            xg_weight: 0.50,
            shots_on_target_weight: 0.20,
            big_chances_weight: 0.10,
            corners_weight: 0.10,
            touches_opp_box_weight: 0.10,
            rolling_min_round: 2,
            scale_center: 50.0,
            scale_spread: 15.0,
            clip_min: 0.0,
            clip_max: 100.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            features: FeatureConfig::default(),
            target: TargetConfig::default(),
        }
    }
}

impl FeatureConfig {
    /// Check every window and weight vector before a pass
    pub fn validate(&self) -> Result<()> {
        let windows = [
            ("form", self.form_window, self.form_window),
            ("variance", self.variance_window, self.variance_min_history),
            (
                "weighted_form",
                self.weighted_form_weights.len(),
                self.weighted_form_min_history,
            ),
            ("h2h", self.h2h_window, 1),
            ("extreme", self.extreme_window, self.extreme_min_history),
            (
                "trajectory",
                self.trajectory_recent + self.trajectory_previous,
                self.trajectory_recent,
            ),
            ("opponent", self.opponent_window, 1),
            ("style", self.style_window, 1),
        ];
        for (name, window, min_history) in windows {
            features::window::check_window(name, window, min_history)?;
        }
        if self.trajectory_recent == 0 {
            return Err(FootyError::InvalidWindow {
                name: "trajectory_recent".to_string(),
                window: 0,
                min_history: 0,
            });
        }
        features::aggregate::check_weights(&self.weighted_form_weights)
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FootyError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| FootyError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.features.validate()
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FootyError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_match(home_goals: f64, away_goals: f64) -> MatchRecord {
        MatchRecord {
            match_id: 1,
            round: 0,
            date: None,
            home_team: TeamId(1),
            away_team: TeamId(2),
            home_name: "Arsenal".to_string(),
            away_name: "Chelsea".to_string(),
            home: SideStats {
                goals: Some(home_goals),
                xg: Some(1.2),
                ..SideStats::default()
            },
            away: SideStats {
                goals: Some(away_goals),
                xg: Some(0.7),
                ..SideStats::default()
            },
        }
    }

    #[test]
    fn test_outcome_and_points() {
        let record = make_match(2.0, 1.0);
        assert_eq!(record.outcome(Side::Home), Some(MatchOutcome::Win));
        assert_eq!(record.outcome(Side::Away), Some(MatchOutcome::Loss));
        assert_eq!(record.points(Side::Home), Some(3.0));

        let draw = make_match(1.0, 1.0);
        assert_eq!(draw.points(Side::Away), Some(1.0));
    }

    #[test]
    fn test_missing_goals_has_no_outcome() {
        let mut record = make_match(2.0, 1.0);
        record.away.goals = None;
        assert_eq!(record.outcome(Side::Home), None);
        assert_eq!(record.total_goals(), None);
    }

    #[test]
    fn test_sides_and_opponents() {
        let record = make_match(0.0, 0.0);
        assert_eq!(record.side_of(TeamId(2)), Some(Side::Away));
        assert_eq!(record.side_of(TeamId(9)), None);
        assert_eq!(record.opponent(TeamId(1)), Some(TeamId(2)));
        assert_eq!(Side::Home.opposite(), Side::Away);
    }

    #[test]
    fn test_totals() {
        let record = make_match(3.0, 1.0);
        assert_eq!(record.goal_margin(), Some(2.0));
        let xg_total = record.total(|s| s.xg).unwrap();
        assert!((xg_total - 1.9).abs() < 1e-9);
        let xg_min = record.min_side(|s| s.xg).unwrap();
        assert!((xg_min - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_config_roundtrip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
        assert!(parsed.features.validate().is_ok());
    }

    #[test]
    fn test_config_save_and_load() {
        let path = std::env::temp_dir().join(format!("footy_config_{}.toml", std::process::id()));
        let path = path.to_str().unwrap();

        let mut config = Config::default();
        config.features.form_window = 7;
        config.features.history_policy = HistoryPolicy::ZeroFill;
        config.save(path).unwrap();
        assert_eq!(Config::load(path).unwrap(), config);

        // An invalid file is rejected on load
        config.features.variance_min_history = 9;
        config.save(path).unwrap();
        assert!(matches!(
            Config::load(path),
            Err(FootyError::InvalidWindow { .. })
        ));

        std::fs::remove_file(path).unwrap();
        assert!(matches!(Config::load(path), Err(FootyError::Config(_))));
    }

    #[test]
    fn test_config_rejects_bad_window() {
        let mut config = FeatureConfig::default();
        config.variance_min_history = 7;
        assert!(matches!(
            config.validate(),
            Err(FootyError::InvalidWindow { .. })
        ));
    }
}
