//! View models for dashboard templates.
//! Typed structs the askama templates render. No DB access here.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use common::scoring::activity_score;
use common::types::{Queen, QueenStats, VotingHistory};
use serde::Serialize;

use crate::view::{Snapshot, SnapshotSource};

/// Summary card at the top of the leaderboard
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    /// CSS gradient for the card background
    pub gradient: &'static str,
}

/// Row in the ranked table
pub struct QueenRow {
    pub rank: usize,
    pub id: i64,
    pub username: String,
    pub dp_link: String,
    pub wallet_short: String,
    pub stake_display: String,
    pub votes_display: String,
    pub earnings_display: String,
    pub joined: String,
}

/// Everything the leaderboard partial shows for a loaded snapshot
pub struct LeaderboardView {
    pub cards: Vec<StatCard>,
    pub avg_stake: String,
    pub avg_votes: String,
    pub avg_earnings: String,
    pub rows: Vec<QueenRow>,
    /// Set when serving the static snapshot
    pub fallback_banner: Option<String>,
}

/// One point of the voting-activity chart
#[derive(Debug, Serialize)]
pub struct ChartPoint {
    pub date: String,
    pub votes: i64,
    pub subnet: String,
}

/// Entry in the voting timeline list (newest first)
pub struct TimelineEntry {
    pub subnet: String,
    pub votes: i64,
    pub date: String,
}

pub struct RewardEntry {
    pub label: String,
    pub rewards: String,
    pub votes: i64,
    pub date: String,
}

/// Detail modal for one queen
pub struct QueenProfile {
    pub id: i64,
    pub username: String,
    pub dp_link: String,
    pub wallet_address: String,
    pub joined: String,
    pub referral_code: String,
    pub activity_score: u8,
    pub stake_display: String,
    pub votes_display: String,
    pub earnings_display: String,
    pub chart: Vec<ChartPoint>,
    /// `chart` serialized for the inline chart script
    pub chart_json: String,
    pub timeline: Vec<TimelineEntry>,
    pub staking_rewards: Vec<RewardEntry>,
    pub subnet_rewards: Vec<RewardEntry>,
    pub referrals_given: usize,
    pub referrals_received: usize,
}

/// Parse the timestamp shapes the store and the snapshot use.
pub fn parse_timestamp(ts: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(ts, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Format a timestamp with a chrono pattern, or echo it back if unparseable.
pub fn format_timestamp(ts: &str, pattern: &str) -> String {
    parse_timestamp(ts).map_or_else(|| ts.to_string(), |dt| dt.format(pattern).to_string())
}

/// Thousands separators and at most three fraction digits, trailing zeros dropped.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((&rounded, ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && (grouped != "0" || !frac_part.is_empty()) {
        "-"
    } else {
        ""
    };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

pub fn format_gp(value: f64) -> String {
    format!("{} GP", format_number(value))
}

/// First eight characters of a wallet followed by an ellipsis.
pub fn shorten_wallet(addr: &str) -> String {
    match addr.char_indices().nth(8) {
        Some((cut, _)) => format!("{}...", &addr[..cut]),
        None => addr.to_string(),
    }
}

fn subnet_label(subnet_id: i64) -> String {
    format!("Subnet {subnet_id}")
}

/// Sort key for voting history: parsed time, then the raw text. Unparseable
/// timestamps sort first.
fn time_key(vote: &VotingHistory) -> (Option<NaiveDateTime>, String) {
    (parse_timestamp(&vote.created_at), vote.created_at.clone())
}

pub fn stat_cards(stats: &QueenStats) -> Vec<StatCard> {
    vec![
        StatCard {
            title: "Total Queens",
            value: stats.total_queens.to_string(),
            gradient: "linear-gradient(to right, #6366f1, #8b5cf6)",
        },
        StatCard {
            title: "Total Staked",
            value: format_gp(stats.total_staked),
            gradient: "linear-gradient(to right, #3b82f6, #06b6d4)",
        },
        StatCard {
            title: "Total Earnings",
            value: format_gp(stats.total_earnings),
            gradient: "linear-gradient(to right, #10b981, #14b8a6)",
        },
        StatCard {
            title: "Average Stake",
            value: format_gp(stats.avg_stake),
            gradient: "linear-gradient(to right, #f59e0b, #f97316)",
        },
    ]
}

impl QueenRow {
    pub fn new(rank: usize, queen: &Queen) -> Self {
        Self {
            rank,
            id: queen.id,
            username: queen.username.clone(),
            dp_link: queen.dp_link.clone(),
            wallet_short: shorten_wallet(&queen.wallet_address),
            stake_display: format_gp(queen.total_staking),
            votes_display: format_number(queen.total_votes as f64),
            earnings_display: format_gp(queen.total_earnings()),
            joined: format_timestamp(&queen.created_at, "%b %d, %Y"),
        }
    }
}

impl LeaderboardView {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let fallback_banner = match &snapshot.source {
            SnapshotSource::Live => None,
            SnapshotSource::Fallback { declared } => Some(format!(
                "Offline snapshot: showing top {} of {} queens",
                snapshot.queens.len(),
                declared.total_queens
            )),
        };
        Self {
            cards: stat_cards(&snapshot.stats),
            avg_stake: format_gp(snapshot.stats.avg_stake),
            avg_votes: format_number(snapshot.stats.avg_votes),
            avg_earnings: format_gp(snapshot.stats.avg_earnings),
            rows: snapshot
                .queens
                .iter()
                .enumerate()
                .map(|(i, q)| QueenRow::new(i + 1, q))
                .collect(),
            fallback_banner,
        }
    }
}

impl QueenProfile {
    pub fn new(queen: &Queen) -> Self {
        let mut ascending = queen.voting_history.clone();
        ascending.sort_by_cached_key(time_key);

        let chart: Vec<ChartPoint> = ascending
            .iter()
            .map(|v| ChartPoint {
                date: format_timestamp(&v.created_at, "%b %d"),
                votes: v.votes,
                subnet: subnet_label(v.subnet_id),
            })
            .collect();
        // Embedded in a <script> block, so a stray "</" must not close it.
        let chart_json = serde_json::to_string(&chart)
            .map_or_else(|_| "[]".to_string(), |json| json.replace("</", "<\\/"));

        let timeline = ascending
            .iter()
            .rev()
            .map(|v| TimelineEntry {
                subnet: subnet_label(v.subnet_id),
                votes: v.votes,
                date: format_timestamp(&v.created_at, "%b %d, %Y"),
            })
            .collect();

        let staking_rewards = queen
            .staking_rewards
            .iter()
            .map(|r| RewardEntry {
                label: "Staking".to_string(),
                rewards: format_gp(r.rewards),
                votes: r.votes_casted,
                date: format_timestamp(&r.date, "%b %d, %Y"),
            })
            .collect();
        let subnet_rewards = queen
            .subnet_rewards
            .iter()
            .map(|r| RewardEntry {
                label: r.name.clone(),
                rewards: format_gp(r.rewards),
                votes: r.votes,
                date: format_timestamp(&r.date, "%b %d, %Y"),
            })
            .collect();

        Self {
            id: queen.id,
            username: queen.username.clone(),
            dp_link: queen.dp_link.clone(),
            wallet_address: queen.wallet_address.clone(),
            joined: format_timestamp(&queen.created_at, "%B %d, %Y"),
            referral_code: queen.referral_code.clone(),
            activity_score: activity_score(queen),
            stake_display: format_gp(queen.total_staking),
            votes_display: format_number(queen.total_votes as f64),
            earnings_display: format_gp(queen.total_earnings()),
            chart,
            chart_json,
            timeline,
            staking_rewards,
            subnet_rewards,
            referrals_given: queen.referrals_given.len(),
            referrals_received: queen.referrals_received.len(),
        }
    }
}
