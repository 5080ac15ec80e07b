use crate::analysis::{AnalysisEvent, AnalysisRequest};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Owns the single pending debounce timer.
///
/// Arming replaces any previous timer. When a timer survives its full delay it
/// delivers [`AnalysisEvent::DebounceFired`] with the snapshot taken at arm
/// time. Cancellation only reaches timers that have not fired yet.
pub struct Debouncer {
    delay: Duration,
    tx: mpsc::Sender<AnalysisEvent>,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration, tx: mpsc::Sender<AnalysisEvent>) -> Self {
        Self {
            delay,
            tx,
            pending: None,
        }
    }

    pub fn arm(&mut self, request: AnalysisRequest) {
        self.cancel();
        debug!(
            generation = request.generation,
            delay_ms = self.delay.as_millis() as u64,
            "debounce armed"
        );
        let delay = self.delay;
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(AnalysisEvent::DebounceFired(request)).await;
        }));
    }

    /// Returns whether a not-yet-fired timer was stopped.
    pub fn cancel(&mut self) -> bool {
        let Some(handle) = self.pending.take() else {
            return false;
        };
        let live = !handle.is_finished();
        handle.abort();
        live
    }

    pub fn is_armed(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fired_generation(event: AnalysisEvent) -> u64 {
        match event {
            AnalysisEvent::DebounceFired(request) => request.generation,
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_arms_fires_once_with_last_snapshot() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut debouncer = Debouncer::new(Duration::from_millis(100), tx);

        for (generation, content) in [(1, "a"), (2, "ab"), (3, "abc")] {
            debouncer.arm(AnalysisRequest::new(generation, content));
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let event = rx.recv().await.expect("fired");
        match event {
            AnalysisEvent::DebounceFired(request) => {
                assert_eq!(request.generation, 3);
                assert_eq!(&*request.content, "abc");
            }
            other => panic!("unexpected event: {other:?}"),
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_fire_before_the_delay() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut debouncer = Debouncer::new(Duration::from_millis(100), tx);
        debouncer.arm(AnalysisRequest::new(1, "a"));

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert!(rx.try_recv().is_err());
        assert!(debouncer.is_armed());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(fired_generation(rx.recv().await.expect("fired")), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_a_pending_timer() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut debouncer = Debouncer::new(Duration::from_millis(100), tx);
        debouncer.arm(AnalysisRequest::new(1, "a"));
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        assert!(!debouncer.is_armed());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_fire_cannot_recall_the_event() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut debouncer = Debouncer::new(Duration::from_millis(100), tx);
        debouncer.arm(AnalysisRequest::new(1, "a"));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!debouncer.cancel());
        assert_eq!(fired_generation(rx.recv().await.expect("fired")), 1);
    }
}
