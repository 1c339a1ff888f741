//! Background reclamation of expired files in the storage directory.
//!
//! Each sweep cycle lists the directory, computes every regular file's age from
//! its modification time and deletes it once the age exceeds the threshold of
//! its retention class: originals (registered in the [`FileRegistry`]) live for
//! `original_max_age`, everything else for `derived_max_age`.
//!
//! Sweeping is best effort. Listing and deletion failures are logged and
//! counted, never propagated, and the next cycle simply tries again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::RetentionConfig;
use crate::metrics::{SWEEP_CYCLES, SWEEP_ERRORS, SWEEP_FILES_DELETED};
use crate::registry::FileRegistry;
use crate::storage::Storage;

/// Outcome of a single sweep cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Regular files examined.
    pub scanned: usize,
    /// Files deleted because they expired.
    pub deleted: usize,
    /// Listing or deletion errors.
    pub errors: usize,
}

/// Periodic sweeper over the storage directory.
pub struct RetentionSweeper {
    storage: Storage,
    registry: Arc<FileRegistry>,
    config: RetentionConfig,

    // Runtime state
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl RetentionSweeper {
    pub fn new(storage: Storage, registry: Arc<FileRegistry>, config: RetentionConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            storage,
            registry,
            config,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            task: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Start the sweep loop. The first cycle runs immediately.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Retention sweeper already running");
            return;
        }

        let storage = self.storage.clone();
        let registry = Arc::clone(&self.registry);
        let config = self.config.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let handle = tokio::spawn(async move {
            let period = config.sweep_interval();
            info!("Retention sweeper started (interval: {:?})", period);

            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Retention sweeper received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        let report =
                            Self::sweep_dir(&storage, &registry, &config, SystemTime::now()).await;
                        if report.deleted > 0 || report.errors > 0 {
                            info!(
                                "Sweep completed: {} scanned, {} deleted, {} errors",
                                report.scanned, report.deleted, report.errors
                            );
                        } else {
                            debug!("Sweep completed: {} scanned, nothing expired", report.scanned);
                        }
                    }
                }
            }

            info!("Retention sweeper stopped");
        });

        *self.task.lock().await = Some(handle);
    }

    /// Stop the sweep loop and wait for it to exit.
    ///
    /// A cycle already in progress runs to completion first.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Retention sweeper not running");
            return;
        }

        let _ = self.shutdown_tx.send(());

        if let Some(handle) = self.task.lock().await.take() {
            if let Err(e) = handle.await {
                error!("Retention sweeper task failed: {}", e);
            }
        }
    }

    /// Run one sweep cycle now.
    pub async fn sweep_once(&self) -> SweepReport {
        self.sweep_at(SystemTime::now()).await
    }

    /// Run one sweep cycle, computing ages relative to `now`.
    pub async fn sweep_at(&self, now: SystemTime) -> SweepReport {
        Self::sweep_dir(&self.storage, &self.registry, &self.config, now).await
    }

    async fn sweep_dir(
        storage: &Storage,
        registry: &FileRegistry,
        config: &RetentionConfig,
        now: SystemTime,
    ) -> SweepReport {
        let mut report = SweepReport::default();

        let mut entries = match tokio::fs::read_dir(storage.dir()).await {
            Ok(entries) => entries,
            Err(e) => {
                error!("Error listing {}: {}", storage.dir().display(), e);
                SWEEP_ERRORS.inc();
                report.errors += 1;
                return report;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    error!("Error in cleanup task: {}", e);
                    SWEEP_ERRORS.inc();
                    report.errors += 1;
                    break;
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();

            // Vanished between listing and stat: deleted by a request.
            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!("Error reading metadata of {}: {}", name, e);
                    SWEEP_ERRORS.inc();
                    report.errors += 1;
                    continue;
                }
            };

            if !metadata.is_file() {
                continue;
            }
            report.scanned += 1;

            let age = match metadata.modified() {
                Ok(modified) => now.duration_since(modified).unwrap_or(Duration::ZERO),
                Err(e) => {
                    warn!("Error reading modification time of {}: {}", name, e);
                    SWEEP_ERRORS.inc();
                    report.errors += 1;
                    continue;
                }
            };

            let is_original = registry.is_original(&name);
            let (max_age, class) = if is_original {
                (config.original_max_age(), "original")
            } else {
                (config.derived_max_age(), "derived")
            };

            if age <= max_age {
                continue;
            }

            match Storage::remove_if_exists(&entry.path()).await {
                Ok(removed) => {
                    registry.forget(&name);
                    if removed {
                        report.deleted += 1;
                        SWEEP_FILES_DELETED.with_label_values(&[class]).inc();
                        info!("Cleaned up old {} file: {} (age {:?})", class, name, age);
                    }
                }
                Err(e) => {
                    error!("Error removing {}: {}", name, e);
                    SWEEP_ERRORS.inc();
                    report.errors += 1;
                }
            }
        }

        SWEEP_CYCLES.inc();
        report
    }
}
