//! Daily cleanup sweep on a cron schedule.

use crate::events::EventBus;
use crate::logic::{run_sweep, Retention, SweepOptions};
use crate::store::Store;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Handle to the running scheduler. Call `stop` on shutdown.
pub struct SweepScheduler {
    scheduler: JobScheduler,
}

impl SweepScheduler {
    /// Register the sweep job on `cron` and start ticking.
    ///
    /// Each run is a live, non-verbose sweep. Failures are logged and left for the next
    /// tick. When `data_file` is set the store is snapshotted after a successful run.
    pub async fn start(
        store: Arc<Store>,
        events: EventBus,
        retention: Retention,
        cron: &str,
        data_file: Option<PathBuf>,
    ) -> Result<Self, JobSchedulerError> {
        let scheduler = JobScheduler::new().await?;

        let job = Job::new_async(cron, move |_uuid, _lock| {
            let store = store.clone();
            let events = events.clone();
            let data_file = data_file.clone();
            Box::pin(async move {
                let options = SweepOptions {
                    dry_run: false,
                    verbose: false,
                    retention,
                };
                match run_sweep(&store, &events, &options).await {
                    Ok(report) => {
                        if let Some(path) = data_file {
                            if let Err(e) = store.save(&path).await {
                                log::error!("Failed to save snapshot after sweep: {}", e);
                            }
                        }
                        log::info!("Scheduled sweep done, {} change(s)", report.total_changes());
                    }
                    Err(e) => log::error!("Scheduled sweep failed: {}", e),
                }
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;
        log::info!("Cleanup sweep scheduled ({})", cron);

        Ok(Self { scheduler })
    }

    pub async fn stop(mut self) -> Result<(), JobSchedulerError> {
        self.scheduler.shutdown().await?;
        log::info!("Cleanup sweep scheduler stopped");
        Ok(())
    }
}
