//! Shared server state.
//!
//! Uploads and finished reports live in two in-memory stores keyed by random
//! 32-character hex ids. Nothing is evicted and nothing survives a restart.
//!
//! Both stores wrap an `Arc<RwLock<HashMap>>` from `parking_lot`. Locks are
//! only held for the duration of a map operation, never across an `.await`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use insightlens::AnalysisSummary;
use parking_lot::RwLock;

use crate::config::ServerConfig;

/// Generate a new store id.
pub fn new_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}

// ============================================================================
// UPLOADS
// ============================================================================

/// Raw bytes of an uploaded file plus the name it was sent with.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub filename: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct UploadStore {
    inner: Arc<RwLock<HashMap<String, StoredUpload>>>,
}

impl UploadStore {
    /// Store an upload and return its id.
    pub fn insert(&self, filename: String, bytes: Bytes) -> String {
        let id = new_id();
        self.inner
            .write()
            .insert(id.clone(), StoredUpload { filename, bytes });
        id
    }

    pub fn get(&self, id: &str) -> Option<StoredUpload> {
        self.inner.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// REPORTS
// ============================================================================

/// A finished analysis, kept as both the summary and its rendered HTML.
#[derive(Debug, Clone)]
pub struct StoredReport {
    pub summary: AnalysisSummary,
    pub html: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReportStore {
    inner: Arc<RwLock<HashMap<String, Arc<StoredReport>>>>,
}

impl ReportStore {
    /// Store a report and return its id.
    pub fn insert(&self, report: StoredReport) -> String {
        let id = new_id();
        self.inner.write().insert(id.clone(), Arc::new(report));
        id
    }

    pub fn get(&self, id: &str) -> Option<Arc<StoredReport>> {
        self.inner.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// APP STATE
// ============================================================================

/// State handed to every handler. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub uploads: UploadStore,
    pub reports: ReportStore,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            uploads: UploadStore::default(),
            reports: ReportStore::default(),
        }
    }
}
