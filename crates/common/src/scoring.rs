use crate::types::Queen;

pub const MAX_ACTIVITY_SCORE: u8 = 100;

const VOTE_WEIGHT: f64 = 0.4;
const REFERRAL_WEIGHT: f64 = 10.0;
const STAKE_WEIGHT: f64 = 5.0;

/// Raw inputs of the activity score, split out so the formula can be
/// exercised without building a whole [`Queen`].
#[derive(Debug, Clone, Copy)]
pub struct ActivityInput {
    pub total_votes: i64,
    pub referrals_given: usize,
    pub total_staking: f64,
}

impl From<&Queen> for ActivityInput {
    fn from(queen: &Queen) -> Self {
        Self {
            total_votes: queen.total_votes,
            referrals_given: queen.referrals_given.len(),
            total_staking: queen.total_staking,
        }
    }
}

/// `min(100, round(votes * 0.4 + referrals_given * 10 + stake * 5))`.
pub fn score(input: ActivityInput) -> u8 {
    let raw = input.total_votes as f64 * VOTE_WEIGHT
        + input.referrals_given as f64 * REFERRAL_WEIGHT
        + input.total_staking * STAKE_WEIGHT;
    if raw.is_nan() {
        return 0;
    }
    // Inputs are non-negative in practice; the lower clamp only guards bad rows.
    raw.round().clamp(0.0, f64::from(MAX_ACTIVITY_SCORE)) as u8
}

pub fn activity_score(queen: &Queen) -> u8 {
    score(ActivityInput::from(queen))
}
