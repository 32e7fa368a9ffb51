//! SQL queries for the leaderboard. All read-only.
use anyhow::{Context, Result};
use common::stats::round2;
use common::types::{Queen, QueenStats};
use rusqlite::{Connection, Row};

/// Hard cap on ranked rows returned to the dashboard.
pub const LEADERBOARD_LIMIT: i64 = 100;

/// Top queens by stake with their five nested collections built as JSON
/// arrays by correlated sub-selects. Equal stakes are ordered by id.
const TOP_QUEENS_SQL: &str = r#"
SELECT
    u.id,
    u.wallet_address,
    u.username,
    u.dp_link,
    u.total_staking,
    u.total_votes,
    u.staking_earnings,
    u.subnet_earnings,
    u.created_at,
    u.updated_at,
    u.referral_code,
    COALESCE(
        (SELECT json_group_array(json_object(
            'subnet_id', v.subnet_id,
            'votes', v.votes,
            'created_at', v.created_at
        )) FROM votes v WHERE v.user_id = u.id),
        '[]'
    ) AS voting_history,
    COALESCE(
        (SELECT json_group_array(json_object(
            'rewards', srh.rewards,
            'votes_casted', srh.votes_casted,
            'date', srh.date
        )) FROM staking_reward_history srh WHERE srh.user_id = u.id),
        '[]'
    ) AS staking_rewards,
    COALESCE(
        (SELECT json_group_array(json_object(
            'subnet_id', s.id,
            'name', s.name,
            'rewards', snrh.rewards,
            'votes', snrh.votes,
            'date', snrh.date
        )) FROM subnet_reward_history snrh
           JOIN subnets s ON s.id = snrh.subnet_id
          WHERE snrh.user_id = u.id),
        '[]'
    ) AS subnet_rewards,
    COALESCE(
        (SELECT json_group_array(json_object(
            'referrer_id', r.referrer_id,
            'created_at', r.created_at
        )) FROM referrals r WHERE r.referee_id = u.id),
        '[]'
    ) AS referrals_received,
    COALESCE(
        (SELECT json_group_array(json_object(
            'referee_id', r.referee_id,
            'created_at', r.created_at
        )) FROM referrals r WHERE r.referrer_id = u.id),
        '[]'
    ) AS referrals_given
FROM users u
WHERE u.total_staking > 0
ORDER BY u.total_staking DESC, u.id ASC
LIMIT ?1
"#;

/// Statistics over every positive-stake user, not just the ranked page.
/// Averages come back unrounded; `round2` applies decimal half-up rounding.
const QUEEN_STATS_SQL: &str = r#"
SELECT
    COUNT(DISTINCT u.id),
    COALESCE(SUM(u.total_staking), 0),
    COALESCE(SUM(u.staking_earnings + u.subnet_earnings), 0),
    COALESCE(AVG(u.total_staking), 0),
    COALESCE(AVG(u.staking_earnings + u.subnet_earnings), 0),
    COALESCE(SUM(u.total_votes), 0),
    COALESCE(AVG(u.total_votes), 0)
FROM users u
WHERE u.total_staking > 0
"#;

/// Raw row before the JSON columns are decoded.
struct QueenRow {
    queen: Queen,
    voting_history: String,
    staking_rewards: String,
    subnet_rewards: String,
    referrals_received: String,
    referrals_given: String,
}

fn read_queen_row(row: &Row<'_>) -> rusqlite::Result<QueenRow> {
    Ok(QueenRow {
        queen: Queen {
            id: row.get(0)?,
            wallet_address: row.get(1)?,
            username: row.get(2)?,
            dp_link: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            total_staking: row.get(4)?,
            total_votes: row.get(5)?,
            staking_earnings: row.get(6)?,
            subnet_earnings: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
            referral_code: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
            voting_history: Vec::new(),
            staking_rewards: Vec::new(),
            subnet_rewards: Vec::new(),
            referrals_received: Vec::new(),
            referrals_given: Vec::new(),
        },
        voting_history: row.get(11)?,
        staking_rewards: row.get(12)?,
        subnet_rewards: row.get(13)?,
        referrals_received: row.get(14)?,
        referrals_given: row.get(15)?,
    })
}

fn decode<T: serde::de::DeserializeOwned>(raw: &str, column: &str, id: i64) -> Result<Vec<T>> {
    serde_json::from_str(raw).with_context(|| format!("bad {column} JSON for user {id}"))
}

impl QueenRow {
    fn into_queen(self) -> Result<Queen> {
        let mut queen = self.queen;
        let id = queen.id;
        queen.voting_history = decode(&self.voting_history, "voting_history", id)?;
        queen.staking_rewards = decode(&self.staking_rewards, "staking_rewards", id)?;
        queen.subnet_rewards = decode(&self.subnet_rewards, "subnet_rewards", id)?;
        queen.referrals_received = decode(&self.referrals_received, "referrals_received", id)?;
        queen.referrals_given = decode(&self.referrals_given, "referrals_given", id)?;
        Ok(queen)
    }
}

pub fn top_queens(conn: &Connection, limit: i64) -> Result<Vec<Queen>> {
    let mut stmt = conn.prepare(TOP_QUEENS_SQL)?;
    let rows = stmt
        .query_map([limit], read_queen_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    rows.into_iter().map(QueenRow::into_queen).collect()
}

pub fn queen_stats(conn: &Connection) -> Result<QueenStats> {
    let stats = conn.query_row(QUEEN_STATS_SQL, [], |r| {
        Ok(QueenStats {
            total_queens: r.get(0)?,
            total_staked: r.get(1)?,
            total_earnings: r.get(2)?,
            avg_stake: round2(r.get(3)?),
            avg_earnings: round2(r.get(4)?),
            total_votes: r.get(5)?,
            avg_votes: round2(r.get(6)?),
        })
    })?;
    Ok(stats)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use rusqlite::params;

    #[test]
    fn test_top_queens_empty_db() {
        let conn = test_db();
        assert!(top_queens(&conn, LEADERBOARD_LIMIT).unwrap().is_empty());
    }

    #[test]
    fn test_zero_stake_users_are_excluded() {
        let conn = test_db();
        insert_user(&conn, "0xzero", 0.0, 40);
        insert_user(&conn, "0xstaker", 5.0, 1);
        let queens = top_queens(&conn, LEADERBOARD_LIMIT).unwrap();
        assert_eq!(queens.len(), 1);
        assert_eq!(queens[0].wallet_address, "0xstaker");
    }

    #[test]
    fn test_queen_without_activity_has_empty_collections() {
        let conn = test_db();
        insert_user(&conn, "0xlonely", 3.0, 0);
        let queen = &top_queens(&conn, LEADERBOARD_LIMIT).unwrap()[0];
        assert!(queen.voting_history.is_empty());
        assert!(queen.staking_rewards.is_empty());
        assert!(queen.subnet_rewards.is_empty());
        assert!(queen.referrals_received.is_empty());
        assert!(queen.referrals_given.is_empty());
    }

    #[test]
    fn test_nested_collections_are_attached() {
        let conn = test_db();
        let alice = insert_user(&conn, "0xalice", 50.0, 12);
        let bob = insert_user(&conn, "0xbob", 20.0, 3);
        let carol = insert_user(&conn, "0xcarol", 10.0, 1);
        let subnet = insert_subnet(&conn, "Honeycomb");

        insert_vote(&conn, alice, subnet, 7, "2024-03-02 09:00:00");
        insert_vote(&conn, alice, subnet, 5, "2024-03-01 09:00:00");
        conn.execute(
            "INSERT INTO staking_reward_history (user_id, rewards, votes_casted, date)
             VALUES (?1, 1.25, 12, '2024-03-03')",
            params![alice],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO subnet_reward_history (subnet_id, user_id, rewards, votes, date)
             VALUES (?1, ?2, 0.75, 7, '2024-03-03')",
            params![subnet, alice],
        )
        .unwrap();
        insert_referral(&conn, alice, bob);
        insert_referral(&conn, alice, carol);
        insert_referral(&conn, carol, alice);

        let queens = top_queens(&conn, LEADERBOARD_LIMIT).unwrap();
        let queen = queens.iter().find(|q| q.id == alice).unwrap();

        assert_eq!(queen.voting_history.len(), 2);
        assert_eq!(queen.voting_history.iter().map(|v| v.votes).sum::<i64>(), 12);
        assert_eq!(queen.staking_rewards.len(), 1);
        assert_eq!(queen.staking_rewards[0].votes_casted, 12);
        assert_eq!(queen.subnet_rewards.len(), 1);
        assert_eq!(queen.subnet_rewards[0].name, "Honeycomb");
        assert_eq!(queen.subnet_rewards[0].subnet_id, subnet);
        assert_eq!(queen.referrals_given.len(), 2);
        assert_eq!(queen.referrals_received.len(), 1);
        assert_eq!(queen.referrals_received[0].referrer_id, carol);

        let bob_row = queens.iter().find(|q| q.id == bob).unwrap();
        assert_eq!(bob_row.referrals_received[0].referrer_id, alice);
        assert!(bob_row.referrals_given.is_empty());
    }

    #[test]
    fn test_ordered_by_stake_then_id_and_capped() {
        let conn = test_db();
        for i in 0..150 {
            // Stakes repeat every 40 rows to force ties.
            insert_user(&conn, &format!("0x{i:04}"), f64::from(i % 40 + 1), i64::from(i));
        }
        let queens = top_queens(&conn, LEADERBOARD_LIMIT).unwrap();
        assert_eq!(queens.len(), 100);
        for pair in queens.windows(2) {
            assert!(pair[0].total_staking >= pair[1].total_staking);
            if (pair[0].total_staking - pair[1].total_staking).abs() < f64::EPSILON {
                assert!(pair[0].id < pair[1].id);
            }
        }
        assert!(queens.iter().all(|q| q.total_staking > 0.0));
    }

    #[test]
    fn test_stats_cover_full_population_not_just_top_page() {
        let conn = test_db();
        for i in 0..150 {
            insert_user(&conn, &format!("0x{i:04}"), 2.0, 3);
        }
        insert_user(&conn, "0xidle", 0.0, 99);

        let stats = queen_stats(&conn).unwrap();
        assert_eq!(stats.total_queens, 150);
        assert!((stats.total_staked - 300.0).abs() < 1e-9);
        // earnings per user = 0.2 + 0.1
        assert!((stats.total_earnings - 45.0).abs() < 1e-6);
        assert!((stats.avg_stake - 2.0).abs() < 1e-9);
        assert!((stats.avg_earnings - 0.3).abs() < 1e-9);
        assert_eq!(stats.total_votes, 450);
        assert!((stats.avg_votes - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_stats_round_averages_to_two_places() {
        let conn = test_db();
        insert_user(&conn, "0xa", 1.0, 1);
        insert_user(&conn, "0xb", 1.0, 1);
        insert_user(&conn, "0xc", 2.0, 2);
        let stats = queen_stats(&conn).unwrap();
        assert!((stats.avg_stake - 1.33).abs() < 1e-9);
        assert!((stats.avg_votes - 1.33).abs() < 1e-9);
    }

    #[test]
    fn test_stats_round_exact_midpoints_half_up() {
        let conn = test_db();
        insert_user(&conn, "0xmid", 0.285, 1);
        let stats = queen_stats(&conn).unwrap();
        assert!((stats.avg_stake - 0.29).abs() < 1e-9);

        let conn = test_db();
        insert_user(&conn, "0xmid", 1.005, 1);
        let stats = queen_stats(&conn).unwrap();
        assert!((stats.avg_stake - 1.01).abs() < 1e-9);
    }

    #[test]
    fn test_stats_empty_population_is_zero() {
        let conn = test_db();
        insert_user(&conn, "0xidle", 0.0, 5);
        let stats = queen_stats(&conn).unwrap();
        assert_eq!(stats, QueenStats::default());
    }

    #[test]
    fn test_missing_table_is_an_error() {
        let conn = test_db();
        conn.execute_batch("DROP TABLE referrals").unwrap();
        assert!(top_queens(&conn, LEADERBOARD_LIMIT).is_err());
        assert!(queen_stats(&conn).is_ok());
    }
}
