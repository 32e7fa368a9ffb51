use serde::{Deserialize, Deserializer, Serialize};

/// A top staker with the nested history the dashboard renders.
///
/// Same shape on the wire for `/api/queens` and inside the static snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Queen {
    pub id: i64,
    pub wallet_address: String,
    pub username: String,
    #[serde(default)]
    pub dp_link: String,
    pub total_staking: f64,
    pub total_votes: i64,
    pub staking_earnings: f64,
    pub subnet_earnings: f64,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub referral_code: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub voting_history: Vec<VotingHistory>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub staking_rewards: Vec<StakingReward>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subnet_rewards: Vec<SubnetReward>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub referrals_received: Vec<ReferralReceived>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub referrals_given: Vec<ReferralGiven>,
}

impl Queen {
    /// Staking plus subnet earnings, the figure shown in the "Earnings" column.
    pub fn total_earnings(&self) -> f64 {
        self.staking_earnings + self.subnet_earnings
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotingHistory {
    pub subnet_id: i64,
    pub votes: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakingReward {
    pub rewards: f64,
    pub votes_casted: i64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubnetReward {
    pub subnet_id: i64,
    pub name: String,
    pub rewards: f64,
    pub votes: i64,
    pub date: String,
}

/// Edge where this queen is the referee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralReceived {
    pub referrer_id: i64,
    pub created_at: String,
}

/// Edge where this queen is the referrer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralGiven {
    pub referee_id: i64,
    pub created_at: String,
}

/// Aggregate statistics over the positive-stake population.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueenStats {
    pub total_queens: i64,
    pub total_staked: f64,
    pub total_earnings: f64,
    pub avg_stake: f64,
    pub avg_earnings: f64,
    pub total_votes: i64,
    pub avg_votes: f64,
}

/// Body of a successful `GET /api/queens`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub queens: Vec<Queen>,
    pub stats: QueenStats,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE_QUEEN: &str = r#"{
        "id": 7,
        "wallet_address": "0xabcdef0123456789",
        "username": "hive",
        "total_staking": 12.5,
        "total_votes": 3,
        "staking_earnings": 1.5,
        "subnet_earnings": 2.0,
        "created_at": "2024-03-01T10:00:00Z",
        "voting_history": null
    }"#;

    #[test]
    fn test_missing_and_null_collections_become_empty() {
        let queen: Queen = serde_json::from_str(BARE_QUEEN).unwrap();
        assert!(queen.voting_history.is_empty());
        assert!(queen.staking_rewards.is_empty());
        assert!(queen.subnet_rewards.is_empty());
        assert!(queen.referrals_received.is_empty());
        assert!(queen.referrals_given.is_empty());
        assert_eq!(queen.dp_link, "");
    }

    #[test]
    fn test_collections_always_serialize_as_arrays() {
        let queen: Queen = serde_json::from_str(BARE_QUEEN).unwrap();
        let json = serde_json::to_value(&queen).unwrap();
        for field in [
            "voting_history",
            "staking_rewards",
            "subnet_rewards",
            "referrals_received",
            "referrals_given",
        ] {
            assert_eq!(json[field], serde_json::json!([]), "{field} must be []");
        }
    }

    #[test]
    fn test_total_earnings_sums_both_sources() {
        let queen: Queen = serde_json::from_str(BARE_QUEEN).unwrap();
        assert!((queen.total_earnings() - 3.5).abs() < f64::EPSILON);
    }
}
