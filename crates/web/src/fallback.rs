//! Adapter for the pre-baked `queens_data.json` snapshot.
//!
//! The snapshot predates the live endpoint and uses its own field names for
//! the aggregate block, so it is parsed into [`StaticSnapshot`] and remapped
//! here rather than sharing the live wire type.

use anyhow::{Context, Result};
use common::types::{Queen, QueenStats};
use serde::Deserialize;
use std::path::Path;

use crate::queries::LEADERBOARD_LIMIT;
use crate::view::{Snapshot, SnapshotSource};

#[derive(Debug, Clone, Deserialize)]
pub struct StaticSnapshot {
    pub queens: Vec<Queen>,
    pub total_queens: i64,
    pub statistics: StaticStatistics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaticStatistics {
    pub total_staked_amount: f64,
    pub total_earnings: f64,
    pub average_stake_per_queen: f64,
    pub average_earnings_per_queen: f64,
}

impl StaticSnapshot {
    pub fn from_json(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw).context("failed to parse static queens snapshot")
    }

    pub async fn read(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read static snapshot: {}", path.display()))?;
        Self::from_json(&raw)
    }

    /// The snapshot's own aggregate block in the live field names.
    ///
    /// The snapshot carries no vote totals, so those are zero.
    pub fn declared_stats(&self) -> QueenStats {
        QueenStats {
            total_queens: self.total_queens,
            total_staked: self.statistics.total_staked_amount,
            total_earnings: self.statistics.total_earnings,
            avg_stake: self.statistics.average_stake_per_queen,
            avg_earnings: self.statistics.average_earnings_per_queen,
            total_votes: 0,
            avg_votes: 0.0,
        }
    }

    /// Keep the first 100 queens and compute stats over those only.
    ///
    /// Unlike the live path, which aggregates every positive-stake user, these
    /// stats describe the visible page. The snapshot's own aggregate block is
    /// kept as `declared` for the banner.
    pub fn into_snapshot(self) -> Snapshot {
        let declared = self.declared_stats();
        let mut queens = self.queens;
        queens.truncate(LEADERBOARD_LIMIT as usize);
        let stats = QueenStats::from_queens(&queens);
        Snapshot {
            queens,
            stats,
            source: SnapshotSource::Fallback { declared },
        }
    }
}
