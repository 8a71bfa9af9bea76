use std::sync::Arc;

use tokio::sync::{Notify, Semaphore};

/// One-shot checkpoint: the code under test parks at it until the test releases it.
pub struct Gate {
    entered: Notify,
    released: Semaphore,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entered: Notify::new(),
            released: Semaphore::new(0),
        })
    }

    /// Resolves once something has reached the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.released.add_permits(1);
    }

    pub(crate) async fn pass(&self) {
        self.entered.notify_one();
        if let Ok(permit) = self.released.acquire().await {
            permit.forget();
        }
    }
}
