//! Analysis result cache
//!
//! Keyed by track id with constant-time lookup. The cache is an
//! explicit object the orchestrator owns and hands to the engine; there
//! is deliberately no process-wide instance. Entries are replaced only
//! by re-analysis and otherwise live for the process lifetime.

use segue_common::types::TrackAnalysis;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Cloneable handle to the shared analysis store
#[derive(Clone, Default)]
pub struct AnalysisCache {
    entries: Arc<RwLock<HashMap<Uuid, Arc<TrackAnalysis>>>>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Look up the analysis for a track
    pub async fn get(&self, track_id: Uuid) -> Option<Arc<TrackAnalysis>> {
        self.entries.read().await.get(&track_id).cloned()
    }

    /// Store an analysis, replacing any previous entry for the track
    pub async fn insert(&self, analysis: TrackAnalysis) -> Arc<TrackAnalysis> {
        let entry = Arc::new(analysis);
        self.entries
            .write()
            .await
            .insert(entry.track_id, Arc::clone(&entry));
        entry
    }

    /// Drop a track's analysis (e.g. when its file changed on disk).
    /// Returns whether an entry existed.
    pub async fn remove(&self, track_id: Uuid) -> bool {
        self.entries.write().await.remove(&track_id).is_some()
    }

    pub async fn contains(&self, track_id: Uuid) -> bool {
        self.entries.read().await.contains_key(&track_id)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
