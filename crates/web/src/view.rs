use common::error::DashboardError;
use common::types::{DashboardData, Queen, QueenStats};

/// Where the rendered data came from.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotSource {
    Live,
    /// Static snapshot; `declared` is its own aggregate block, remapped.
    Fallback { declared: QueenStats },
}

/// One immutable fetch result. Nothing mutates it after it is built.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub queens: Vec<Queen>,
    pub stats: QueenStats,
    pub source: SnapshotSource,
}

impl From<DashboardData> for Snapshot {
    fn from(data: DashboardData) -> Self {
        Self {
            queens: data.queens,
            stats: data.stats,
            source: SnapshotSource::Live,
        }
    }
}

impl Snapshot {
    pub fn find(&self, id: i64) -> Option<&Queen> {
        self.queens.iter().find(|q| q.id == id)
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, SnapshotSource::Fallback { .. })
    }
}

/// Dashboard view state. `Loading` is the shell served before the fetch;
/// the other three are settled from the fetch outcome.
#[derive(Debug)]
pub enum ViewState {
    Loading,
    Loaded(Snapshot),
    Empty,
    Error,
}

impl ViewState {
    pub fn settle(outcome: Result<Snapshot, DashboardError>) -> Self {
        match outcome {
            Ok(snapshot) if snapshot.queens.is_empty() => Self::Empty,
            Ok(snapshot) => Self::Loaded(snapshot),
            Err(_) => Self::Error,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Loaded(_) => "loaded",
            Self::Empty => "empty",
            Self::Error => "error",
        }
    }
}
