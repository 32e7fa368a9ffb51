//! Leaderboard aggregation and the live-then-fallback loader.

use common::db::AsyncDb;
use common::error::{DashboardError, DashboardResult};
use common::types::{DashboardData, Queen, QueenStats};
use std::path::Path;

use crate::fallback::StaticSnapshot;
use crate::queries::{self, LEADERBOARD_LIMIT};
use crate::view::Snapshot;

async fn read_top_queens(db_path: &Path) -> anyhow::Result<Vec<Queen>> {
    let db = AsyncDb::open_readonly(db_path).await?;
    db.call_named("queens.top", |conn| {
        queries::top_queens(conn, LEADERBOARD_LIMIT)
    })
    .await
}

async fn read_stats(db_path: &Path) -> anyhow::Result<QueenStats> {
    let db = AsyncDb::open_readonly(db_path).await?;
    db.call_named("queens.stats", |conn| queries::queen_stats(conn))
        .await
}

/// Top queens plus population stats. The two reads run in parallel on their
/// own connections; if either fails nothing is returned.
#[tracing::instrument(skip_all)]
pub async fn fetch_leaderboard(db_path: &Path) -> DashboardResult<DashboardData> {
    let (queens, stats) = tokio::try_join!(read_top_queens(db_path), read_stats(db_path))
        .map_err(DashboardError::Aggregation)?;
    tracing::debug!(
        queens = queens.len(),
        total_queens = stats.total_queens,
        "leaderboard fetched"
    );
    Ok(DashboardData { queens, stats })
}

/// Live data when the store answers, otherwise the static snapshot.
pub async fn load_snapshot(db_path: &Path, fallback_path: &Path) -> DashboardResult<Snapshot> {
    match fetch_leaderboard(db_path).await {
        Ok(data) => Ok(Snapshot::from(data)),
        Err(err) => {
            tracing::warn!(error = %err, "live leaderboard unavailable; using static snapshot");
            metrics::counter!("queens_fallback_total").increment(1);
            let snapshot = StaticSnapshot::read(fallback_path)
                .await
                .map_err(DashboardError::FallbackUnavailable)?;
            Ok(snapshot.into_snapshot())
        }
    }
}
