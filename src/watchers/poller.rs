use crate::config::{DashboardConfig, PollIntervals, PoolFormat};
use crate::error::AppError;
use crate::parsers::minipool_report::parse_minipool_report;
use crate::plugin_api::PluginApi;
use crate::state::{Snapshot, Source, SourceValue};
use crate::status;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

enum Command {
    Start(Source),
    Stop(Source),
}

/// Reply of one fetch task
struct Fetched {
    source: Source,
    generation: u64,
    result: Result<SourceValue, AppError>,
}

struct Schedule {
    interval: Duration,
    next_due: Instant,
    /// Cleared by `stop`; a stopped source is never polled regardless of enablement
    started: bool,
    in_flight: bool,
    /// Bumped on `stop` so replies of torn-down polls are dropped
    generation: u64,
}

/// Handle to the background polling task.
///
/// The task owns the [`Snapshot`] and republishes it after every change; readers
/// get copies through [`Poller::snapshot`] or a [`watch`] subscription. Dropping
/// the handle stops polling.
pub struct Poller {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<Snapshot>,
    task: JoinHandle<()>,
}

impl Poller {
    /// Start polling every source that fits the configured plugin.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(api: Arc<dyn PluginApi>, config: &DashboardConfig) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let (publisher, snapshot) = watch::channel(Snapshot::default());

        let now = Instant::now();
        let schedules = Source::ALL
            .into_iter()
            .map(|source| {
                let started = match (source, config.api.pool_format) {
                    (Source::Minipools, PoolFormat::StakingPools) => false,
                    (Source::StakingPools, PoolFormat::MinipoolReport) => false,
                    _ => true,
                };
                let schedule = Schedule {
                    interval: interval_for(&config.polling, source),
                    next_due: now,
                    started,
                    in_flight: false,
                    generation: 0,
                };
                (source, schedule)
            })
            .collect();

        let mut driver = Driver {
            api,
            schedules,
            snapshot: Snapshot::default(),
            publisher,
            results_tx,
        };
        driver.recompute();
        driver.publish();

        // `tokio::time::interval` panics on a zero period
        if config.polling.tick_ms == 0 {
            tracing::warn!("polling.tick_ms is 0, using 1 ms");
        }
        let tick = Duration::from_millis(config.polling.tick_ms.max(1));
        let task = tokio::spawn(driver.run(command_rx, results_rx, tick));

        Self {
            commands: command_tx,
            snapshot,
            task,
        }
    }

    /// Resume polling a source previously stopped. It is fetched right away if enabled.
    pub fn start(&self, source: Source) {
        let _ = self.commands.send(Command::Start(source));
    }

    /// Stop polling a source and forget its value. A reply still in flight is discarded.
    pub fn stop(&self, source: Source) {
        let _ = self.commands.send(Command::Stop(source));
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    pub fn latest(&self, source: Source) -> Option<SourceValue> {
        self.snapshot.borrow().latest(source).cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.clone()
    }

    /// Stop every source for good and wait for the polling task to exit.
    pub async fn shutdown(self) {
        let Self { commands, task, .. } = self;
        drop(commands);
        if let Err(e) = task.await {
            tracing::warn!("Poller task ended abnormally: {e}");
        }
    }
}

fn interval_for(polling: &PollIntervals, source: Source) -> Duration {
    let ms = match source {
        Source::Status => polling.status_ms,
        Source::Wallet => polling.wallet_ms,
        Source::SyncProgress => polling.sync_progress_ms,
        Source::Minipools => polling.minipools_ms,
        Source::StakingPools => polling.staking_pools_ms,
        Source::NodeInfo => polling.node_info_ms,
    };
    Duration::from_millis(ms)
}

async fn fetch(api: &dyn PluginApi, source: Source) -> Result<SourceValue, AppError> {
    match source {
        Source::Status => api.status().await.map(SourceValue::Status),
        Source::Wallet => api.wallet().await.map(SourceValue::Wallet),
        Source::SyncProgress => api.sync_progress().await.map(SourceValue::SyncProgress),
        Source::Minipools => api
            .minipool_report()
            .await
            .map(|report| SourceValue::Minipools(parse_minipool_report(&report))),
        Source::StakingPools => api.staking_pools().await.map(SourceValue::StakingPools),
        Source::NodeInfo => api.node_info().await.map(SourceValue::NodeInfo),
    }
}

struct Driver {
    api: Arc<dyn PluginApi>,
    schedules: BTreeMap<Source, Schedule>,
    snapshot: Snapshot,
    publisher: watch::Sender<Snapshot>,
    results_tx: mpsc::UnboundedSender<Fetched>,
}

impl Driver {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut results: mpsc::UnboundedReceiver<Fetched>,
        tick: Duration,
    ) {
        let mut ticker = tokio::time::interval(tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!("Poller started");

        loop {
            tokio::select! {
                _ = ticker.tick() => self.dispatch_due(),
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                Some(fetched) = results.recv() => self.apply(fetched),
            }
        }

        tracing::info!("Poller stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Start(source) => {
                let Some(schedule) = self.schedules.get_mut(&source) else {
                    return;
                };
                if !schedule.started {
                    schedule.started = true;
                    schedule.next_due = Instant::now();
                    tracing::info!("Polling {source} started");
                }
                self.dispatch_due();
            }
            Command::Stop(source) => {
                let Some(schedule) = self.schedules.get_mut(&source) else {
                    return;
                };
                schedule.started = false;
                schedule.in_flight = false;
                schedule.generation += 1;
                tracing::info!("Polling {source} stopped");

                if self.snapshot.clear(source) {
                    self.recompute();
                    self.publish();
                }
            }
        }
    }

    fn is_due(&self, source: Source, now: Instant) -> bool {
        self.schedules.get(&source).is_some_and(|s| {
            s.started && !s.in_flight && now >= s.next_due && self.snapshot.is_enabled(source)
        })
    }

    fn dispatch_due(&mut self) {
        let now = Instant::now();
        for source in Source::ALL {
            if self.is_due(source, now) {
                self.dispatch(source, now);
            }
        }
    }

    /// Spawn one fetch. A status poll fetches the wallet first while the wallet
    /// has never resolved.
    fn dispatch(&mut self, source: Source, now: Instant) {
        let prefetch_wallet = source == Source::Status
            && self.snapshot.enablement.wallet_prefetch
            && self
                .schedules
                .get(&Source::Wallet)
                .is_some_and(|s| s.started && !s.in_flight);

        let Some(generation) = self.mark_in_flight(source, now) else {
            return;
        };
        let wallet_generation = if prefetch_wallet {
            self.mark_in_flight(Source::Wallet, now)
        } else {
            None
        };

        tracing::debug!("Polling {source}");

        let api = self.api.clone();
        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            if let Some(generation) = wallet_generation {
                let result = api.wallet().await.map(SourceValue::Wallet);
                let _ = tx.send(Fetched {
                    source: Source::Wallet,
                    generation,
                    result,
                });
            }
            let result = fetch(api.as_ref(), source).await;
            // Receiver is gone after shutdown
            let _ = tx.send(Fetched {
                source,
                generation,
                result,
            });
        });
    }

    fn mark_in_flight(&mut self, source: Source, now: Instant) -> Option<u64> {
        let schedule = self.schedules.get_mut(&source)?;
        schedule.in_flight = true;
        schedule.next_due = now + schedule.interval;
        Some(schedule.generation)
    }

    fn apply(&mut self, fetched: Fetched) {
        let source = fetched.source;
        let Some(schedule) = self.schedules.get_mut(&source) else {
            return;
        };
        if !schedule.started || schedule.generation != fetched.generation {
            tracing::debug!("Discarding {source} reply from a stopped poll");
            return;
        }
        schedule.in_flight = false;

        // Only enabled sources hold values
        if !self.snapshot.is_enabled(source) {
            tracing::debug!("Discarding {source} reply, source disabled meanwhile");
            return;
        }

        let value = match fetched.result {
            Ok(value) => value,
            Err(e) if e.is_transient() => {
                tracing::warn!("Polling {source} failed: {e}");
                return;
            }
            Err(e) => {
                tracing::error!("Polling {source} failed: {e}");
                return;
            }
        };

        let value = self.keep_wallet_address(value);
        self.snapshot.insert(value);
        self.recompute();
        self.publish();
        self.dispatch_due();
    }

    /// A wallet address, once seen, stays for the rest of the session.
    fn keep_wallet_address(&self, value: SourceValue) -> SourceValue {
        match value {
            SourceValue::Wallet(mut wallet) if wallet.address.is_none() => {
                if let Some(known) = self.snapshot.raw_wallet().and_then(|w| w.address.clone()) {
                    tracing::debug!("Wallet reply without address, keeping {known}");
                    wallet.address = Some(known);
                }
                SourceValue::Wallet(wallet)
            }
            other => other,
        }
    }

    /// Re-derive enablement and state from the stored status, wallet and sync
    /// values. Newly enabled sources become due now; newly disabled ones lose
    /// their value.
    fn recompute(&mut self) {
        let status = match self.snapshot.stored(Source::Status) {
            Some(SourceValue::Status(status)) => Some(status),
            _ => None,
        };
        let running = status.is_some_and(|s| s.is_running());
        let sync = match self.snapshot.stored(Source::SyncProgress) {
            Some(SourceValue::SyncProgress(sync)) if running => Some(sync),
            _ => None,
        };
        let wallet = self.snapshot.raw_wallet();

        let enablement = status::enablement(status, wallet, sync);
        let state = status::derive_state(status, wallet, sync);

        let previous = self.snapshot.enablement;
        let now = Instant::now();
        for source in Source::ALL {
            match (previous.allows(source), enablement.allows(source)) {
                (false, true) => {
                    if let Some(schedule) = self.schedules.get_mut(&source) {
                        schedule.next_due = now;
                    }
                    tracing::debug!("{source} enabled");
                }
                (true, false) => {
                    if self.snapshot.clear(source) {
                        tracing::debug!("{source} disabled, value cleared");
                    }
                }
                _ => {}
            }
        }

        if state != self.snapshot.state {
            match state {
                Some(state) => tracing::info!("Dashboard state: {}", state.display_name()),
                None => tracing::info!("Dashboard state: loading"),
            }
        }

        self.snapshot.enablement = enablement;
        self.snapshot.state = state;
    }

    fn publish(&self) {
        self.publisher.send_if_modified(|current| {
            if *current == self.snapshot {
                false
            } else {
                *current = self.snapshot.clone();
                true
            }
        });
    }
}
