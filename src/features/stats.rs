//! Per-side statistic extractors
//!
//! "For" extractors read the team's own side of a match, "against" extractors
//! read the opponent's side.

use crate::features::rolling::Statistic;
use crate::{MatchRecord, Side};

pub fn xg_for(record: &MatchRecord, side: Side) -> Option<f64> {
    record.stats(side).xg
}

pub fn xg_against(record: &MatchRecord, side: Side) -> Option<f64> {
    record.stats(side.opposite()).xg
}

pub fn shots_on_target_for(record: &MatchRecord, side: Side) -> Option<f64> {
    record.stats(side).shots_on_target
}

pub fn shots_on_target_against(record: &MatchRecord, side: Side) -> Option<f64> {
    record.stats(side.opposite()).shots_on_target
}

pub fn big_chances_for(record: &MatchRecord, side: Side) -> Option<f64> {
    record.stats(side).big_chances
}

pub fn big_chances_against(record: &MatchRecord, side: Side) -> Option<f64> {
    record.stats(side.opposite()).big_chances
}

pub fn corners_for(record: &MatchRecord, side: Side) -> Option<f64> {
    record.stats(side).corners
}

pub fn touches_opp_box_for(record: &MatchRecord, side: Side) -> Option<f64> {
    record.stats(side).touches_opp_box
}

pub fn goals_for(record: &MatchRecord, side: Side) -> Option<f64> {
    record.goals_for(side)
}

pub fn points(record: &MatchRecord, side: Side) -> Option<f64> {
    record.points(side)
}

pub fn cards_for(record: &MatchRecord, side: Side) -> Option<f64> {
    Some(record.stats(side).cards())
}

/// Rolling attacking and defensive output, per 90 minutes
pub fn attack_defence() -> Vec<Statistic> {
    vec![
        Statistic::new("xG_att_90", xg_for),
        Statistic::new("SoT_att_90", shots_on_target_for),
        Statistic::new("BigCh_att_90", big_chances_for),
        Statistic::new("Corn_att_90", corners_for),
        Statistic::new("ToB_att_90", touches_opp_box_for),
        Statistic::new("xGA_def_90", xg_against),
        Statistic::new("SoT_agst_90", shots_on_target_against),
        Statistic::new("BigCh_agst_90", big_chances_against),
    ]
}

/// Spread of recent output and results
pub fn consistency() -> Vec<Statistic> {
    vec![
        Statistic::new("xG_variance", xg_for),
        Statistic::new("goals_variance", goals_for),
        Statistic::new("xGA_variance", xg_against),
        Statistic::new("result_consistency", points),
    ]
}

/// Recency-weighted form
pub fn weighted_form() -> Vec<Statistic> {
    vec![
        Statistic::new("weighted_xG", xg_for),
        Statistic::new("weighted_goals", goals_for),
        Statistic::new("weighted_points", points),
    ]
}
