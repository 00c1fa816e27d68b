//! Guildlink runtime: configuration, telemetry, and service assembly.
//!
//! The embedding platform adapter (the presentation layer's process)
//! bootstraps a [`GuildlinkRuntime`] from configuration plus its gateway
//! implementations, invokes the workflow services per user action, and
//! leaves the reconciliation schedule to the runtime.
//!
//! ```no_run
//! use guildlink_runtime::{GuildlinkRuntime, PlatformAdapters, RuntimeConfig};
//! # async fn bootstrap(adapters: PlatformAdapters) -> Result<(), Box<dyn std::error::Error>> {
//! let config = RuntimeConfig::load(Some("guildlink.toml".as_ref()))?;
//! let runtime = GuildlinkRuntime::bootstrap(config, adapters).await?;
//! runtime.start_scheduler().await;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

mod config;
mod error;
mod telemetry;

pub use config::{
    CrosscheckSettings, DatabaseConfig, IntakeConfig, InteractionConfig, LogConfig,
    ModerationConfig, RetrySettings, RosterConfig, RuntimeConfig, ScheduleConfig,
};
pub use error::RuntimeError;
pub use telemetry::init_tracing;

use chrono::Utc;
use guildlink_identity::{LinkingService, ProfileService};
use guildlink_intake::{IntakeService, StagingStore};
use guildlink_moderation::{BanService, WarningService, WatchlistService};
use guildlink_reconciler::{next_run_delay, CrosscheckConfig, Reconciler};
use guildlink_roster::{HttpRosterSource, RetryPolicy, RosterSource};
use guildlink_store::{IdentityStore, SqliteIdentityStore};
use guildlink_types::{Announcer, CommunityGateway, EventSink, RoleManager};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The externally provided collaborators.
pub struct PlatformAdapters {
    pub community: Arc<dyn CommunityGateway>,
    pub roles: Arc<dyn RoleManager>,
    pub announcer: Arc<dyn Announcer>,
    pub events: Arc<dyn EventSink>,
}

/// Assembled engine: one service handle per workflow plus the scheduled
/// reconciler.
pub struct GuildlinkRuntime {
    pub linking: Arc<LinkingService>,
    pub profiles: Arc<ProfileService>,
    pub warnings: Arc<WarningService>,
    pub watchlist: Arc<WatchlistService>,
    pub bans: Arc<BanService>,
    pub intake: Arc<IntakeService>,
    pub reconciler: Arc<Reconciler>,
    crosscheck: CrosscheckConfig,
    schedule_hour: u32,
    scheduler: Mutex<Option<JoinHandle<()>>>,
}

impl GuildlinkRuntime {
    /// Open the configured SQLite store and assemble the services.
    pub async fn bootstrap(
        config: RuntimeConfig,
        adapters: PlatformAdapters,
    ) -> Result<Arc<Self>, RuntimeError> {
        config.validate()?;
        let store: Arc<dyn IdentityStore> =
            Arc::new(SqliteIdentityStore::connect(&config.database.path).await?);
        let roster: Arc<dyn RosterSource> = Arc::new(
            HttpRosterSource::new(
                &config.roster.base_url,
                &config.roster.community_id,
                config.roster.bearer_token.clone(),
            )?
            .with_retry_policy(RetryPolicy {
                max_attempts: config.roster.retry.max_attempts,
                base_delay: Duration::from_millis(config.roster.retry.base_delay_ms),
                max_delay: Duration::from_millis(config.roster.retry.max_delay_ms),
            }),
        );
        Ok(Self::assemble(config, adapters, store, roster))
    }

    /// Assemble over explicit store and roster implementations; used by
    /// embedders and tests.
    pub fn assemble(
        config: RuntimeConfig,
        adapters: PlatformAdapters,
        store: Arc<dyn IdentityStore>,
        roster: Arc<dyn RosterSource>,
    ) -> Arc<Self> {
        let linking = Arc::new(LinkingService::new(
            store.clone(),
            roster.clone(),
            adapters.roles.clone(),
            adapters.events.clone(),
        ));
        let profiles = Arc::new(ProfileService::new(
            store.clone(),
            roster.clone(),
            adapters.roles.clone(),
        ));
        let warnings = Arc::new(
            WarningService::new(store.clone(), adapters.events.clone()).with_retention(
                chrono::Duration::days(config.moderation.warning_retention_days),
            ),
        );
        let watchlist = Arc::new(WatchlistService::new(store.clone()));
        let bans = Arc::new(BanService::new(store.clone(), adapters.community.clone()));
        let intake = Arc::new(IntakeService::new(
            store.clone(),
            StagingStore::new(Duration::from_secs(config.intake.staging_ttl_secs)),
        ));
        let reconciler = Arc::new(Reconciler::new(
            store,
            roster,
            adapters.community,
            adapters.roles,
            adapters.announcer,
        ));

        Arc::new(Self {
            linking,
            profiles,
            warnings,
            watchlist,
            bans,
            intake,
            reconciler,
            crosscheck: CrosscheckConfig {
                excluded_ranks: config.crosscheck.excluded_ranks,
                page_size: config.crosscheck.page_size,
            },
            schedule_hour: config.schedule.daily_hour_utc,
            scheduler: Mutex::new(None),
        })
    }

    pub fn crosscheck_config(&self) -> &CrosscheckConfig {
        &self.crosscheck
    }

    /// Run a reconciliation cycle now, then keep running daily at the
    /// configured hour. Idempotent: a second call leaves the running
    /// schedule in place.
    pub async fn start_scheduler(self: &Arc<Self>) {
        let mut scheduler = self.scheduler.lock().await;
        if scheduler.is_some() {
            return;
        }

        let runtime = self.clone();
        *scheduler = Some(tokio::spawn(async move {
            runtime.run_and_log().await;
            loop {
                let delay = next_run_delay(Utc::now(), runtime.schedule_hour);
                info!(delay_secs = delay.as_secs(), "next reconciliation scheduled");
                tokio::time::sleep(delay).await;
                runtime.run_and_log().await;
            }
        }));
    }

    async fn run_and_log(&self) {
        match self.reconciler.run_cycle().await {
            Ok(report) if report.partial => {
                error!(
                    provisioned = report.provisioned,
                    pruned = report.pruned,
                    "reconciliation cycle partially failed"
                );
            }
            Ok(_) => {}
            Err(err) => error!(error = %err, "reconciliation cycle failed"),
        }
    }

    /// Stop the schedule; an in-flight cycle is cancelled at the next await
    /// point.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.scheduler.lock().await.take() {
            handle.abort();
        }
    }
}
