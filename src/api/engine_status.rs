use serde::{Deserialize, Serialize};

use crate::logic::features::{layout_hash, FEATURE_COUNT, FEATURE_VERSION};
use crate::logic::model::MODEL_KIND;
use crate::logic::session::Session;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub feature_version: u8,
    pub layout_hash: u32,
    pub feature_count: usize,

    pub sample_count: usize,
    pub window_event_count: usize,
    pub deferred_count: usize,
    pub model: ModelStatus,
    /// Keys waiting for the next write-back flush
    pub storage_pending_keys: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub kind: String,
    pub model_id: String,
    pub available: bool,
    pub training: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<i64>,
}

impl EngineStatus {
    pub fn collect(session: &Session) -> Self {
        let orchestrator = session.orchestrator();
        let meta = orchestrator.meta();

        Self {
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            sample_count: session.sample_count(),
            window_event_count: session.events().len(),
            deferred_count: session.deferred().len(),
            model: ModelStatus {
                kind: MODEL_KIND.to_string(),
                model_id: orchestrator.model().model_id().to_string(),
                available: meta.is_trained(),
                training: orchestrator.is_training(),
                trained_at: meta.trained_at,
            },
            storage_pending_keys: session.pending_storage_keys(),
        }
    }
}
