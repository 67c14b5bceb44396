//! Deposit loop under a paused tokio clock.
//!
//! Poll interval 1s, deposit delay 3s. Polls happen at t = 1, 2, 3, ...
//! and the scripted classifier answers one entry per poll, repeating the
//! last entry once the script runs out.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ecochain::core::model::{DepositReceipt, DepositRequest, DepositResponse, Prediction};
use ecochain::deposit::{Classifier, DepositConfig, DepositListener, DepositService};
use ecochain::{EcoError, EcoResult};
use tokio::sync::broadcast;
use tokio::time::sleep;

const WALLET: &str = "0x1eeeee08c989155ca0aa46a3b37d611622e94c1d";

/// `None` entries make `/predict` fail.
struct ScriptedClassifier {
    script: Mutex<VecDeque<Option<&'static str>>>,
    last: Mutex<Option<&'static str>>,
    accept: bool,
    deposits: Mutex<Vec<DepositRequest>>,
}

impl ScriptedClassifier {
    fn new(script: &[Option<&'static str>]) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.iter().copied().collect()),
            last: Mutex::new(None),
            accept: true,
            deposits: Mutex::new(Vec::new()),
        })
    }

    fn rejecting(script: &[Option<&'static str>]) -> Arc<Self> {
        let mut classifier = Self::new(script);
        Arc::get_mut(&mut classifier).expect("unique").accept = false;
        classifier
    }

    fn deposited(&self) -> Vec<String> {
        self.deposits.lock().unwrap().iter().map(|d| d.material.clone()).collect()
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn predict(&self) -> EcoResult<Prediction> {
        let next = self.script.lock().unwrap().pop_front();
        let entry = match next {
            Some(entry) => {
                *self.last.lock().unwrap() = entry;
                entry
            }
            None => *self.last.lock().unwrap(),
        };
        match entry {
            Some("") => Ok(Prediction::empty()),
            Some(material) => Ok(Prediction::of(material, 0.9)),
            None => Err(EcoError::api(500, "camera offline")),
        }
    }

    async fn deposit(&self, request: &DepositRequest) -> EcoResult<DepositResponse> {
        self.deposits.lock().unwrap().push(request.clone());
        Ok(DepositResponse { success: self.accept, amount: if self.accept { 1.5 } else { 0.0 } })
    }
}

fn config() -> DepositConfig {
    DepositConfig::default()
        .with_poll_interval(Duration::from_secs(1))
        .with_deposit_delay(Duration::from_secs(3))
}

struct Running {
    shutdown: broadcast::Sender<()>,
    handle: tokio::task::JoinHandle<()>,
}

impl Running {
    async fn stop(self) {
        let _ = self.shutdown.send(());
        self.handle.await.expect("deposit loop panicked");
    }
}

fn start(service: DepositService) -> Running {
    let (shutdown, rx) = broadcast::channel(1);
    let handle = service.spawn(rx);
    Running { shutdown, handle }
}

#[tokio::test(start_paused = true)]
async fn steady_material_is_deposited_exactly_once() {
    let classifier = ScriptedClassifier::new(&[Some("plastic")]);
    let receipts = Arc::new(Mutex::new(Vec::<DepositReceipt>::new()));
    let sink = receipts.clone();
    let listener = move |receipt: &DepositReceipt| sink.lock().unwrap().push(receipt.clone());

    let running = start(
        DepositService::new(classifier.clone(), config())
            .with_wallet(WALLET)
            .add_listener(Arc::new(listener)),
    );

    sleep(Duration::from_millis(3500)).await;
    assert!(classifier.deposited().is_empty(), "nothing before the delay elapses");

    sleep(Duration::from_secs(10)).await;
    running.stop().await;

    let deposits = classifier.deposits.lock().unwrap().clone();
    assert_eq!(deposits, vec![DepositRequest { material: "plastic".into(), wallet: WALLET.into() }]);

    let receipts = receipts.lock().unwrap();
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0].amount, 1.5);
    assert_eq!(receipts[0].wallet, WALLET);
}

#[tokio::test(start_paused = true)]
async fn material_label_is_posted_verbatim() {
    let classifier = ScriptedClassifier::new(&[Some("Plastic Bottle ")]);
    let running = start(DepositService::new(classifier.clone(), config()).with_wallet(WALLET));

    sleep(Duration::from_secs(6)).await;
    running.stop().await;

    assert_eq!(classifier.deposited(), ["Plastic Bottle "]);
}

#[tokio::test(start_paused = true)]
async fn material_change_within_delay_cancels_earlier_material() {
    let classifier = ScriptedClassifier::new(&[Some("plastic"), Some("glass")]);
    let running = start(DepositService::new(classifier.clone(), config()).with_wallet(WALLET));

    // plastic would have been due at t=4; glass was scheduled at t=2
    sleep(Duration::from_millis(4500)).await;
    assert!(classifier.deposited().is_empty());

    sleep(Duration::from_secs(5)).await;
    running.stop().await;

    assert_eq!(classifier.deposited(), ["glass"]);
}

#[tokio::test(start_paused = true)]
async fn alternating_materials_deposit_each_run() {
    let mut script = vec![Some("plastic"); 5];
    script.extend([Some("glass"); 5]);
    script.push(Some("plastic"));
    let classifier = ScriptedClassifier::new(&script);
    let running = start(DepositService::new(classifier.clone(), config()).with_wallet(WALLET));

    sleep(Duration::from_secs(16)).await;
    running.stop().await;

    assert_eq!(classifier.deposited(), ["plastic", "glass", "plastic"]);
}

#[tokio::test(start_paused = true)]
async fn no_wallet_means_no_deposit() {
    let classifier = ScriptedClassifier::new(&[Some("plastic")]);
    let running = start(DepositService::new(classifier.clone(), config()).with_wallet("  "));

    sleep(Duration::from_secs(10)).await;
    running.stop().await;

    assert!(classifier.deposited().is_empty());
}

#[tokio::test(start_paused = true)]
async fn predict_failure_reads_as_nothing_detected() {
    // t=1 schedules plastic, t=2 fails and cancels, t=3 schedules again (due t=6)
    let classifier = ScriptedClassifier::new(&[Some("plastic"), None, Some("plastic")]);
    let running = start(DepositService::new(classifier.clone(), config()).with_wallet(WALLET));

    sleep(Duration::from_millis(5500)).await;
    assert!(classifier.deposited().is_empty());

    sleep(Duration::from_secs(4)).await;
    running.stop().await;

    assert_eq!(classifier.deposited(), ["plastic"]);
}

#[tokio::test(start_paused = true)]
async fn rejected_deposit_is_not_retried_for_same_detection() {
    let classifier = ScriptedClassifier::rejecting(&[Some("plastic")]);
    let running = start(DepositService::new(classifier.clone(), config()).with_wallet(WALLET));

    sleep(Duration::from_secs(15)).await;
    running.stop().await;

    assert_eq!(classifier.deposited(), ["plastic"]);
}

#[tokio::test(start_paused = true)]
async fn rejected_material_retries_after_detection_changes() {
    // plastic rejected at t=4, nothing at t=5, plastic again from t=6 (due t=9)
    let mut script = vec![Some("plastic"); 4];
    script.push(Some(""));
    script.push(Some("plastic"));
    let classifier = ScriptedClassifier::rejecting(&script);
    let running = start(DepositService::new(classifier.clone(), config()).with_wallet(WALLET));

    sleep(Duration::from_secs(12)).await;
    running.stop().await;

    assert_eq!(classifier.deposited(), ["plastic", "plastic"]);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_pending_deposit() {
    let classifier = ScriptedClassifier::new(&[Some("plastic")]);
    let running = start(DepositService::new(classifier.clone(), config()).with_wallet(WALLET));

    sleep(Duration::from_millis(2500)).await;
    running.stop().await;
    sleep(Duration::from_secs(10)).await;

    assert!(classifier.deposited().is_empty());
}

struct Counter(Mutex<usize>);

#[async_trait]
impl DepositListener for Counter {
    async fn on_deposit(&self, _receipt: &DepositReceipt) {
        *self.0.lock().unwrap() += 1;
    }
}

#[tokio::test(start_paused = true)]
async fn every_listener_is_notified() {
    let classifier = ScriptedClassifier::new(&[Some("metal")]);
    let first = Arc::new(Counter(Mutex::new(0)));
    let second = Arc::new(Counter(Mutex::new(0)));
    let running = start(
        DepositService::new(classifier.clone(), config())
            .with_wallet(WALLET)
            .add_listener(first.clone())
            .add_listener(second.clone()),
    );

    sleep(Duration::from_secs(6)).await;
    running.stop().await;

    assert_eq!(*first.0.lock().unwrap(), 1);
    assert_eq!(*second.0.lock().unwrap(), 1);
}

/// Answers each poll after a per-entry latency, repeating the last entry.
struct LaggingClassifier {
    script: Mutex<VecDeque<(Duration, &'static str)>>,
    last: Mutex<(Duration, &'static str)>,
    deposits: Mutex<Vec<(Duration, String)>>,
    started: tokio::time::Instant,
}

#[async_trait]
impl Classifier for LaggingClassifier {
    async fn predict(&self) -> EcoResult<Prediction> {
        let (latency, material) = {
            let next = self.script.lock().unwrap().pop_front();
            let mut last = self.last.lock().unwrap();
            if let Some(entry) = next {
                *last = entry;
            }
            *last
        };
        sleep(latency).await;
        Ok(Prediction::of(material, 0.9))
    }

    async fn deposit(&self, request: &DepositRequest) -> EcoResult<DepositResponse> {
        let at = self.started.elapsed();
        self.deposits.lock().unwrap().push((at, request.material.clone()));
        Ok(DepositResponse { success: true, amount: 1.0 })
    }
}

#[tokio::test(start_paused = true)]
async fn slow_predict_does_not_hold_back_due_deposit() {
    // plastic is due at t=4 while the t=3 poll is still waiting on a 2s reply
    let instant = Duration::ZERO;
    let classifier = Arc::new(LaggingClassifier {
        script: Mutex::new(VecDeque::from([
            (instant, "plastic"),
            (instant, "plastic"),
            (Duration::from_secs(2), "glass"),
            (instant, "glass"),
        ])),
        last: Mutex::new((instant, "")),
        deposits: Mutex::new(Vec::new()),
        started: tokio::time::Instant::now(),
    });
    let running = start(DepositService::new(classifier.clone(), config()).with_wallet(WALLET));

    sleep(Duration::from_millis(4500)).await;
    {
        let deposits = classifier.deposits.lock().unwrap();
        assert_eq!(deposits.len(), 1, "plastic goes out when its timer fires");
        assert_eq!(deposits[0].1, "plastic");
        assert!(deposits[0].0 < Duration::from_secs(5), "sent before the slow poll returned");
    }

    sleep(Duration::from_secs(10)).await;
    running.stop().await;

    let materials: Vec<String> = classifier.deposits.lock().unwrap().iter().map(|(_, m)| m.clone()).collect();
    assert_eq!(materials, ["plastic", "glass"]);
}
