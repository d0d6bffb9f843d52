//! League standings before each match
//!
//! A running league table folded over the season, plus the contextual
//! comparisons between the two teams' places in it.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::features::aggregate::{ratio, FeatureValue};
use crate::features::reducer::Reducer;
use crate::{MatchOutcome, MatchRecord, Side, TeamId};

/// Cumulative league record for a team
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TeamRecord {
    pub matches_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: f64,
    pub goals_against: f64,
    pub points: u32,
    /// Points earned in home matches
    pub home_points: u32,
    /// Points earned in away matches
    pub away_points: u32,
}

impl TeamRecord {
    /// Update the record with a match the team played on `side`
    pub fn update(&mut self, record: &MatchRecord, side: Side) {
        let (Some(outcome), Some(scored), Some(conceded)) = (
            record.outcome(side),
            record.goals_for(side),
            record.goals_against(side),
        ) else {
            return;
        };

        self.matches_played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        match outcome {
            MatchOutcome::Win => self.wins += 1,
            MatchOutcome::Draw => self.draws += 1,
            MatchOutcome::Loss => self.losses += 1,
        }

        let points = outcome.points();
        self.points += points;
        match side {
            Side::Home => self.home_points += points,
            Side::Away => self.away_points += points,
        }
    }

    pub fn goal_difference(&self) -> f64 {
        self.goals_for - self.goals_against
    }
}

/// Running league table of every team seen so far
#[derive(Debug, Clone, Default)]
pub struct LeagueTable {
    records: HashMap<TeamId, TeamRecord>,
}

impl LeagueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a match to both teams' records. Teams enter the table on their
    /// first match even when its score is unknown.
    pub fn update(&mut self, record: &MatchRecord) {
        for side in [Side::Home, Side::Away] {
            self.records
                .entry(record.team(side))
                .or_default()
                .update(record, side);
        }
    }

    /// Build a table from a sequence of matches
    pub fn from_matches(matches: &[MatchRecord]) -> Self {
        let mut table = LeagueTable::new();
        for record in matches {
            table.update(record);
        }
        table
    }

    pub fn get(&self, team: TeamId) -> Option<&TeamRecord> {
        self.records.get(&team)
    }

    pub fn get_or_default(&self, team: TeamId) -> TeamRecord {
        self.records.get(&team).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Points, then goal difference, then goals scored; team ID breaks ties
    fn compare(a: (TeamId, &TeamRecord), b: (TeamId, &TeamRecord)) -> Ordering {
        b.1.points
            .cmp(&a.1.points)
            .then_with(|| b.1.goal_difference().total_cmp(&a.1.goal_difference()))
            .then_with(|| b.1.goals_for.total_cmp(&a.1.goals_for))
            .then_with(|| a.0.cmp(&b.0))
    }

    /// 1-based position of a team. A team not yet in the table is ranked as
    /// if it had an empty record.
    pub fn position(&self, team: TeamId) -> u32 {
        let own = self.get_or_default(team);
        let above = self
            .records
            .iter()
            .filter(|(id, _)| **id != team)
            .filter(|(id, rec)| Self::compare((**id, rec), (team, &own)) == Ordering::Less)
            .count();
        above as u32 + 1
    }

    /// Teams in table order
    pub fn ranking(&self) -> Vec<TeamId> {
        let mut teams: Vec<(TeamId, &TeamRecord)> =
            self.records.iter().map(|(id, rec)| (*id, rec)).collect();
        teams.sort_by(|a, b| Self::compare(*a, *b));
        teams.into_iter().map(|(id, _)| id).collect()
    }
}

/// One team's standing going into a match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub position: f64,
    pub points: f64,
    pub goal_difference: f64,
    pub wins: f64,
    pub home_points: f64,
    pub away_points: f64,
}

impl Standing {
    pub const DIM: usize = 6;
    pub const NAMES: [&'static str; Self::DIM] = [
        "position",
        "points_before",
        "gd_before",
        "wins_before",
        "home_points",
        "away_points",
    ];

    fn from_table(table: &LeagueTable, team: TeamId) -> Self {
        let rec = table.get_or_default(team);
        Standing {
            position: table.position(team) as f64,
            points: rec.points as f64,
            goal_difference: rec.goal_difference(),
            wins: rec.wins as f64,
            home_points: rec.home_points as f64,
            away_points: rec.away_points as f64,
        }
    }

    pub fn to_vec(&self) -> Vec<FeatureValue> {
        [
            self.position,
            self.points,
            self.goal_difference,
            self.wins,
            self.home_points,
            self.away_points,
        ]
        .into_iter()
        .map(FeatureValue::Value)
        .collect()
    }
}

/// How the two teams' standings compare
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchContext {
    /// Home position minus away position
    pub position_diff: f64,
    pub points_diff: f64,
    pub gd_diff: f64,
    /// Home team's home points over its total points + 1
    pub home_strength_ratio: FeatureValue,
    /// Away team's away points over its total points + 1
    pub away_strength_ratio: FeatureValue,
    pub both_top: bool,
    pub both_bottom: bool,
    pub close_positions: bool,
}

impl MatchContext {
    pub const DIM: usize = 8;
    pub const NAMES: [&'static str; Self::DIM] = [
        "position_diff",
        "points_diff",
        "gd_diff",
        "home_strength_ratio",
        "away_strength_ratio",
        "both_top",
        "both_bottom",
        "close_positions",
    ];

    pub fn to_vec(&self) -> Vec<FeatureValue> {
        let flag = |b: bool| FeatureValue::Value(if b { 1.0 } else { 0.0 });
        vec![
            FeatureValue::Value(self.position_diff),
            FeatureValue::Value(self.points_diff),
            FeatureValue::Value(self.gd_diff),
            self.home_strength_ratio,
            self.away_strength_ratio,
            flag(self.both_top),
            flag(self.both_bottom),
            flag(self.close_positions),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandingsFeatures {
    pub home: Standing,
    pub away: Standing,
    pub context: MatchContext,
}

/// Position bands used by the contextual flags
#[derive(Debug, Clone, Copy)]
pub struct PositionBands {
    /// Positions at or above this are "top"
    pub top: u32,
    /// Positions at or below this are "bottom"
    pub bottom: u32,
    /// Largest position gap still counted as close
    pub close_gap: u32,
}

/// Folds the league table and emits each match's standings
#[derive(Debug, Clone, Copy)]
pub struct Standings {
    bands: PositionBands,
}

impl Standings {
    pub fn new(bands: PositionBands) -> Self {
        Standings { bands }
    }

    fn context(&self, home: &Standing, away: &Standing) -> MatchContext {
        let position_diff = home.position - away.position;
        let b = self.bands;
        MatchContext {
            position_diff,
            points_diff: home.points - away.points,
            gd_diff: home.goal_difference - away.goal_difference,
            home_strength_ratio: FeatureValue::or_undefined(ratio(home.home_points, home.points + 1.0)),
            away_strength_ratio: FeatureValue::or_undefined(ratio(away.away_points, away.points + 1.0)),
            both_top: home.position <= b.top as f64 && away.position <= b.top as f64,
            both_bottom: home.position >= b.bottom as f64 && away.position >= b.bottom as f64,
            close_positions: position_diff.abs() <= b.close_gap as f64,
        }
    }
}

impl Reducer for Standings {
    type State = LeagueTable;
    type Emit = StandingsFeatures;

    fn emit(&self, state: &LeagueTable, record: &MatchRecord) -> StandingsFeatures {
        let home = Standing::from_table(state, record.home_team);
        let away = Standing::from_table(state, record.away_team);
        StandingsFeatures {
            home,
            away,
            context: self.context(&home, &away),
        }
    }

    fn absorb(&self, mut state: LeagueTable, record: &MatchRecord) -> LeagueTable {
        state.update(record);
        state
    }
}
