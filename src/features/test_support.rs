//! Match builders shared by feature tests

use crate::{MatchRecord, SideStats, TeamId};

/// Match with goals only
pub fn make_match(round: u32, home: i64, away: i64, home_goals: f64, away_goals: f64) -> MatchRecord {
    MatchRecord {
        match_id: (round as i64) * 1000 + home * 10 + away,
        round,
        date: None,
        home_team: TeamId(home),
        away_team: TeamId(away),
        home_name: format!("Team {}", home),
        away_name: format!("Team {}", away),
        home: SideStats {
            goals: Some(home_goals),
            ..SideStats::default()
        },
        away: SideStats {
            goals: Some(away_goals),
            ..SideStats::default()
        },
    }
}

/// Match with a full set of side statistics derived from a few inputs
pub fn make_full_match(
    round: u32,
    home: i64,
    away: i64,
    goals: (f64, f64),
    xg: (f64, f64),
    shots: (f64, f64),
) -> MatchRecord {
    let side = |goals: f64, xg: f64, shots: f64| SideStats {
        goals: Some(goals),
        xg: Some(xg),
        shots: Some(shots),
        shots_on_target: Some((shots / 3.0).round()),
        big_chances: Some(goals + 1.0),
        corners: Some(shots / 2.0),
        touches_opp_box: Some(shots * 2.0),
        yellow_cards: Some(1.0),
        red_cards: Some(0.0),
    };
    let mut record = make_match(round, home, away, goals.0, goals.1);
    record.home = side(goals.0, xg.0, shots.0);
    record.away = side(goals.1, xg.1, shots.1);
    record
}

/// Deterministic synthetic season: every team meets every other team twice
pub fn synthetic_season(teams: i64, seed: u64) -> Vec<MatchRecord> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(seed);
    let mut matches = Vec::new();
    let mut round = 0;
    for leg in 0..2 {
        for offset in 1..teams {
            for home in 1..=teams {
                let away = (home - 1 + offset) % teams + 1;
                if (home < away) == (leg == 0) {
                    let goals = (rng.gen_range(0..5) as f64, rng.gen_range(0..4) as f64);
                    let xg = (rng.gen_range(0.2..3.0), rng.gen_range(0.1..2.5));
                    let shots = (rng.gen_range(4..22) as f64, rng.gen_range(3..18) as f64);
                    let mut record = make_full_match(round, home, away, goals, xg, shots);
                    record.match_id = matches.len() as i64;
                    record.date = chrono::NaiveDate::from_ymd_opt(2024, 8, 16)
                        .map(|start| start + chrono::Duration::days(7 * round as i64));
                    matches.push(record);
                }
            }
            round += 1;
        }
    }
    matches
}
