use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::lifecycle::TaskLifecycle;
use crate::ports::{AccountStore, TransactionSender, WalletIdentity};

/// Periodically refetches the owner's tasks so the published snapshot follows
/// the chain, independently of any create or resolve in progress. A failed
/// fetch is logged and retried on the next tick.
pub fn spawn_reconciler<A, S, C>(
    lifecycle: Arc<TaskLifecycle<A, S, C>>,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()>
where
    A: AccountStore + 'static,
    S: TransactionSender + WalletIdentity + 'static,
    C: Clock + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("reconciler stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match lifecycle.refresh().await {
                        Ok(snapshot) => debug!(
                            tasks = snapshot.tasks.len(),
                            sequence = snapshot.fetch_sequence,
                            "reconciled tasks"
                        ),
                        Err(err) => warn!(error = %err, "failed to reconcile tasks"),
                    }
                }
            }
        }
    })
}
