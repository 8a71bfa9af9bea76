//! Presentation helpers. Nothing here feeds a lifecycle guard.

use solana_sdk::pubkey::Pubkey;

use crate::accounts::{Task, TaskAccount};
use crate::constants::LAMPORTS_PER_SOL;
use crate::types::TaskStatus;

// 2020-01-01T00:00:00Z. Task ids below this are not treated as creation timestamps.
const EARLIEST_PLAUSIBLE_CREATION: i64 = 1_577_836_800;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskView {
    pub address: Pubkey,
    pub task: Task,
    /// Set on a local prediction made after a confirmed transaction; the next
    /// fetch replaces the whole view.
    pub predicted: bool,
    /// Approximate creation time, reconstructed from a millisecond task id.
    pub created_at: Option<i64>,
    /// Approximate duration in seconds, `expires_at - created_at`.
    pub duration: Option<i64>,
}

impl TaskView {
    pub fn from_account(account: TaskAccount) -> Self {
        let created_at = reconstruct_created_at(&account.task);
        Self {
            address: account.address,
            duration: created_at.map(|created_at| account.task.expires_at - created_at),
            created_at,
            task: account.task,
            predicted: false,
        }
    }

    pub fn remaining_secs(&self, now: i64) -> i64 {
        (self.task.expires_at - now).max(0)
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.task.expires_at
    }

    pub fn can_resolve(&self, identity: &Pubkey, now: i64) -> bool {
        self.task.is_pending() && self.task.owner == *identity && self.is_expired(now)
    }

    /// Countdown label, `EXPIRED` once the deadline has passed.
    pub fn countdown(&self, now: i64) -> String {
        format_remaining(self.remaining_secs(now))
    }
}

fn reconstruct_created_at(task: &Task) -> Option<i64> {
    let created_at = i64::try_from(task.task_id / 1000).ok()?;
    (EARLIEST_PLAUSIBLE_CREATION..=task.expires_at)
        .contains(&created_at)
        .then_some(created_at)
}

pub fn format_remaining(secs: i64) -> String {
    if secs <= 0 {
        return "EXPIRED".to_string();
    }

    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else {
        format!("{minutes}m {seconds}s")
    }
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Tasks grouped by status, in the order they were given.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskBuckets {
    pub pending: Vec<TaskView>,
    pub completed: Vec<TaskView>,
    pub failed: Vec<TaskView>,
}

impl TaskBuckets {
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.completed.is_empty() && self.failed.is_empty()
    }
}

impl FromIterator<TaskView> for TaskBuckets {
    fn from_iter<I: IntoIterator<Item = TaskView>>(iter: I) -> Self {
        let mut buckets = Self::default();
        for view in iter {
            match view.task.status {
                TaskStatus::Pending => buckets.pending.push(view),
                TaskStatus::Completed => buckets.completed.push(view),
                TaskStatus::Failed => buckets.failed.push(view),
            }
        }
        buckets
    }
}
