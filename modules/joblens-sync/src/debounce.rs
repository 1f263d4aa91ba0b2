use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Stabilizes a rapidly-changing value.
///
/// `observe` restarts the quiet-period timer; only when it elapses without a
/// newer value does the stabilized output update. Pure input shaping — no
/// network, no state side effects. Dropping the debouncer aborts any pending
/// timer, so a disposed view never sees a late update.
pub struct Debouncer<T: Clone + Send + Sync + 'static> {
    delay: Duration,
    tx: watch::Sender<T>,
    rx: watch::Receiver<T>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Clone + Send + Sync + 'static> Debouncer<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        let (tx, rx) = watch::channel(initial);
        Self {
            delay,
            tx,
            rx,
            pending: Mutex::new(None),
        }
    }

    /// Feed a new raw value, restarting the quiet-period timer.
    pub fn observe(&self, value: T) {
        let mut pending = self.pending.lock().unwrap();
        if let Some(timer) = pending.take() {
            timer.abort();
        }
        let tx = self.tx.clone();
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tx.send_replace(value);
        }));
    }

    /// Current stabilized value.
    pub fn stabilized(&self) -> T {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T: Clone + Send + Sync + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(timer) = self.pending.lock().unwrap().take() {
            timer.abort();
        }
    }
}
