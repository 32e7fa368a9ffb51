//! Aggregate statistics computed in-process.
//!
//! The live path gets these numbers from SQL over every positive-stake row;
//! this module is used when only an in-memory list of queens is available
//! (the static snapshot). Formulas match the SQL ones.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{Queen, QueenStats};

/// Round half-up to two decimal places on the decimal value, so `0.285`
/// becomes `0.29` even though its binary form sits just below the midpoint.
/// Non-finite input yields `0.0`.
pub fn round2(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(0.0)
}

impl QueenStats {
    /// Stats over exactly the queens given. An empty slice yields all zeros.
    pub fn from_queens(queens: &[Queen]) -> Self {
        if queens.is_empty() {
            return Self::default();
        }
        let count = queens.len() as f64;
        let total_staked: f64 = queens.iter().map(|q| q.total_staking).sum();
        let total_earnings: f64 = queens.iter().map(Queen::total_earnings).sum();
        let total_votes: i64 = queens.iter().map(|q| q.total_votes).sum();

        Self {
            total_queens: queens.len() as i64,
            total_staked,
            total_earnings,
            avg_stake: round2(total_staked / count),
            avg_earnings: round2(total_earnings / count),
            total_votes,
            avg_votes: round2(total_votes as f64 / count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queen(id: i64, stake: f64, votes: i64, staking: f64, subnet: f64) -> Queen {
        Queen {
            id,
            wallet_address: format!("0x{id:040}"),
            username: format!("queen-{id}"),
            dp_link: String::new(),
            total_staking: stake,
            total_votes: votes,
            staking_earnings: staking,
            subnet_earnings: subnet,
            created_at: "2024-01-01 00:00:00".to_string(),
            updated_at: String::new(),
            referral_code: String::new(),
            voting_history: vec![],
            staking_rewards: vec![],
            subnet_rewards: vec![],
            referrals_received: vec![],
            referrals_given: vec![],
        }
    }

    #[test]
    fn test_round2_half_up() {
        assert!((round2(0.285) - 0.29).abs() < 1e-9);
        assert!((round2(1.005) - 1.01).abs() < 1e-9);
        assert!((round2(2.345) - 2.35).abs() < 1e-9);
        assert!((round2(2.344) - 2.34).abs() < 1e-9);
        assert!((round2(-1.005) + 1.01).abs() < 1e-9);
        assert!((round2(10.0) - 10.0).abs() < 1e-9);
        assert!(round2(f64::NAN).abs() < 1e-9);
    }

    #[test]
    fn test_averages_round_exact_midpoints_up() {
        let stats = QueenStats::from_queens(&[queen(1, 0.285, 1, 1.005, 0.0)]);
        assert!((stats.avg_stake - 0.29).abs() < 1e-9);
        assert!((stats.avg_earnings - 1.01).abs() < 1e-9);
    }

    #[test]
    fn test_empty_slice_is_all_zero() {
        assert_eq!(QueenStats::from_queens(&[]), QueenStats::default());
    }

    #[test]
    fn test_sums_and_averages() {
        let queens = vec![
            queen(1, 100.0, 10, 1.0, 2.0),
            queen(2, 50.0, 5, 0.5, 0.5),
            queen(3, 25.0, 1, 0.0, 0.0),
        ];
        let stats = QueenStats::from_queens(&queens);
        assert_eq!(stats.total_queens, 3);
        assert!((stats.total_staked - 175.0).abs() < 1e-9);
        assert!((stats.total_earnings - 4.0).abs() < 1e-9);
        assert!((stats.avg_stake - 58.33).abs() < 1e-9);
        assert!((stats.avg_earnings - 1.33).abs() < 1e-9);
        assert_eq!(stats.total_votes, 16);
        assert!((stats.avg_votes - 5.33).abs() < 1e-9);
    }
}
