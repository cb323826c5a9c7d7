//! Wiring of the job service from configuration.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use docscrub_core::config::AppConfig;
use docscrub_core::result::AppResult;
use docscrub_core::traits::{Clock, StatusStore, SystemClock, Transformer};
use docscrub_storage::{ArtifactPaths, LocalArtifactStore};
use docscrub_worker::transform;
use docscrub_worker::{
    ActiveJobs, ArtifactReaper, CleanupScheduler, LifecycleMetrics, MemoryStatusStore, StatusLedger,
    TimeoutExecutor,
};

use crate::job::{JobService, UploadPolicy};

/// Builds a [`JobService`], with optional overrides for its collaborators.
#[derive(Debug)]
pub struct JobServiceBuilder {
    /// Application configuration.
    config: AppConfig,
    /// Transformer override.
    transformer: Option<Arc<dyn Transformer>>,
    /// Clock override.
    clock: Option<Arc<dyn Clock>>,
    /// Status store override.
    status_store: Option<Arc<dyn StatusStore>>,
}

impl JobServiceBuilder {
    /// Start from configuration.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            transformer: None,
            clock: None,
            status_store: None,
        }
    }

    /// Use `transformer` instead of the configured one.
    pub fn transformer(mut self, transformer: Arc<dyn Transformer>) -> Self {
        self.transformer = Some(transformer);
        self
    }

    /// Use `clock` for artifact age comparisons.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use `store` for recorded statuses.
    pub fn status_store(mut self, store: Arc<dyn StatusStore>) -> Self {
        self.status_store = Some(store);
        self
    }

    /// Create the artifact directories and assemble the service.
    ///
    /// Background cleanup stops when `shutdown` flips to `true`.
    pub async fn build(self, shutdown: watch::Receiver<bool>) -> AppResult<JobService> {
        let Self {
            config,
            transformer,
            clock,
            status_store,
        } = self;

        let paths = ArtifactPaths::from_config(&config.storage);
        paths.ensure_directories().await?;
        let artifacts = LocalArtifactStore::new(paths);

        let metrics = Arc::new(LifecycleMetrics::new());
        let store = status_store
            .unwrap_or_else(|| Arc::new(MemoryStatusStore::from_config(&config.cleanup)));
        let ledger = StatusLedger::new(store, artifacts.clone(), Arc::clone(&metrics));

        let transformer = transformer.unwrap_or_else(|| transform::from_config(&config.processing));
        let executor = TimeoutExecutor::new(
            Arc::clone(&transformer),
            ledger.clone(),
            artifacts.clone(),
            config.processing.timeout(),
            Arc::clone(&metrics),
        );

        let active = ActiveJobs::new();
        let clock = clock.unwrap_or_else(|| Arc::new(SystemClock));
        let reaper = Arc::new(ArtifactReaper::new(
            artifacts.clone(),
            ledger.clone(),
            active.clone(),
            clock,
            Arc::clone(&metrics),
        ));
        let scheduler = CleanupScheduler::new(
            Arc::clone(&reaper),
            &config.cleanup,
            shutdown,
            Arc::clone(&metrics),
        );

        info!(
            transformer = transformer.name(),
            timeout_secs = config.processing.timeout_seconds,
            "Job service initialized"
        );

        Ok(JobService::new(
            artifacts,
            ledger,
            executor,
            reaper,
            scheduler,
            UploadPolicy::from_config(&config.storage),
            config.cleanup,
            active,
            metrics,
        ))
    }
}
