//! Poll loop: one `/predict` per interval, debounced `/deposit`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::classifier::Classifier;
use super::debounce::{DepositDebouncer, Transition, DEFAULT_DEPOSIT_DELAY};
use crate::core::model::{DepositReceipt, DepositRequest, DepositResponse, Prediction};
use crate::error::EcoResult;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Called once for every deposit the backend accepts.
#[async_trait]
pub trait DepositListener: Send + Sync {
    async fn on_deposit(&self, receipt: &DepositReceipt);
}

#[async_trait]
impl<F> DepositListener for F
where
    F: Fn(&DepositReceipt) + Send + Sync,
{
    async fn on_deposit(&self, receipt: &DepositReceipt) { (self)(receipt) }
}

#[derive(Debug, Clone)]
pub struct DepositConfig {
    pub poll_interval: Duration,
    pub deposit_delay: Duration,
}

impl Default for DepositConfig {
    fn default() -> Self {
        Self { poll_interval: DEFAULT_POLL_INTERVAL, deposit_delay: DEFAULT_DEPOSIT_DELAY }
    }
}

impl DepositConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self { self.poll_interval = interval; self }
    pub fn with_deposit_delay(mut self, delay: Duration) -> Self { self.deposit_delay = delay; self }
}

pub struct DepositService {
    classifier: Arc<dyn Classifier>,
    wallet: Option<String>,
    config: DepositConfig,
    listeners: Vec<Arc<dyn DepositListener>>,
}

type Settled = (String, EcoResult<DepositResponse>);

impl DepositService {
    pub fn new(classifier: Arc<dyn Classifier>, config: DepositConfig) -> Self {
        Self { classifier, wallet: None, config, listeners: Vec::new() }
    }

    pub fn with_wallet(mut self, address: impl Into<String>) -> Self {
        let address = address.into();
        self.wallet = Some(address).filter(|a| !a.trim().is_empty());
        self
    }

    pub fn add_listener(mut self, listener: Arc<dyn DepositListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Spawn the loop as a tokio task. It stops on the shutdown signal.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let poll = self.config.poll_interval;
        let mut debouncer = DepositDebouncer::new(self.config.deposit_delay);
        let mut ticker = time::interval_at(Instant::now() + poll, poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let (settled_tx, mut settled_rx) = mpsc::channel::<Settled>(4);
        let (polled_tx, mut polled_rx) = mpsc::channel::<EcoResult<Prediction>>(1);
        let mut polling = false;

        info!(
            wallet = self.wallet.as_deref().unwrap_or("-"),
            poll_ms = poll.as_millis() as u64,
            delay_ms = self.config.deposit_delay.as_millis() as u64,
            "deposit loop started"
        );

        loop {
            let due = debouncer.next_due().map(Instant::from_std);
            let wake = due.unwrap_or_else(|| Instant::now() + poll);

            tokio::select! {
                _ = shutdown.recv() => break,
                _ = ticker.tick() => {
                    if polling {
                        debug!("previous predict still running, tick skipped");
                    } else {
                        polling = true;
                        self.poll(&polled_tx);
                    }
                }
                Some(result) = polled_rx.recv() => {
                    polling = false;
                    let prediction = result.unwrap_or_else(|e| {
                        debug!(error = %e, "predict failed");
                        Prediction::empty()
                    });
                    let transition = debouncer.observe(prediction, self.wallet.is_some(), Instant::now().into_std());
                    log_transition(&transition);
                }
                _ = time::sleep_until(wake), if due.is_some() => {
                    self.submit_due(&mut debouncer, &settled_tx);
                }
                Some((material, result)) = settled_rx.recv() => {
                    self.settle(&mut debouncer, material, result).await;
                }
            }
        }

        info!("deposit loop stopped");
    }

    /// `/predict` runs off the loop so the deposit timer fires on time even
    /// while a slow poll is outstanding.
    fn poll(&self, polled: &mpsc::Sender<EcoResult<Prediction>>) {
        let classifier = self.classifier.clone();
        let polled = polled.clone();
        tokio::spawn(async move {
            let _ = polled.send(classifier.predict().await).await;
        });
    }

    fn submit_due(&self, debouncer: &mut DepositDebouncer, settled: &mpsc::Sender<Settled>) {
        let Some(wallet) = self.wallet.clone() else { return };
        let Some(material) = debouncer.take_due(Instant::now().into_std()) else { return };

        info!(%material, %wallet, "submitting deposit");
        let classifier = self.classifier.clone();
        let settled = settled.clone();
        tokio::spawn(async move {
            let request = DepositRequest { material, wallet };
            let result = classifier.deposit(&request).await;
            let _ = settled.send((request.material, result)).await;
        });
    }

    async fn settle(&self, debouncer: &mut DepositDebouncer, material: String, result: EcoResult<DepositResponse>) {
        match result {
            Ok(response) if response.success => {
                debouncer.complete(&material, true);
                let receipt = DepositReceipt {
                    wallet: self.wallet.clone().unwrap_or_default(),
                    amount: response.amount,
                    material,
                };
                info!(material = %receipt.material, amount = receipt.amount, "deposit accepted");
                for listener in &self.listeners {
                    listener.on_deposit(&receipt).await;
                }
            }
            Ok(_) => {
                debouncer.complete(&material, false);
                warn!(%material, "deposit rejected by backend");
            }
            Err(e) => {
                debouncer.complete(&material, false);
                warn!(%material, error = %e, "deposit failed");
            }
        }
    }
}

fn log_transition(transition: &Transition) {
    match transition {
        Transition::Unchanged => {}
        Transition::Scheduled { material, .. } => debug!(%material, "deposit scheduled"),
        Transition::Cancelled { material } => debug!(%material, "pending deposit cancelled"),
        Transition::Replaced { cancelled, material, .. } => {
            debug!(%cancelled, %material, "pending deposit replaced")
        }
    }
}
