use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use discipline_client::reconciler::spawn_reconciler;
use discipline_client::rpc::{KeypairSender, RpcClient};
use discipline_client::view::{format_remaining, lamports_to_sol, TaskBuckets};
use discipline_client::{
    ClientConfig, CreateTaskRequest, DisciplineError, TaskLifecycle, TaskSnapshot, TaskView,
};
use mockable::DefaultClock;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::args::{Cli, Command};

type Lifecycle = TaskLifecycle<RpcClient, KeypairSender, DefaultClock>;

pub async fn run(cli: Cli) -> Result<()> {
    let mut config =
        ClientConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(url) = cli.rpc_url {
        config.rpc_url = url;
    }

    let keypair_path = match cli.keypair {
        Some(path) => path,
        None => default_keypair_path()?,
    };
    debug!(rpc_url = %config.rpc_url, keypair = %keypair_path.display(), "starting");

    let rpc = Arc::new(RpcClient::new(config.rpc_url.clone(), config.commitment));
    let sender = Arc::new(KeypairSender::from_file(rpc.clone(), &keypair_path, &config)?);
    let lifecycle = Arc::new(TaskLifecycle::new(
        rpc,
        sender,
        Arc::new(DefaultClock),
        &config,
    ));

    match cli.command {
        Command::List => list(&lifecycle).await,
        Command::Create {
            description,
            duration,
            stake,
        } => create(&lifecycle, CreateTaskRequest::new(description, duration, stake)).await,
        Command::Resolve { task_id, outcome } => {
            resolve(&lifecycle, task_id, outcome.completed).await
        }
        Command::Stats => stats(&lifecycle).await,
        Command::Watch => watch(lifecycle, config.poll_interval()).await,
    }
}

fn default_keypair_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".config").join("solana").join("id.json"))
        .ok_or_else(|| anyhow!("cannot locate the home directory, pass --keypair"))
}

async fn list(lifecycle: &Lifecycle) -> Result<()> {
    let snapshot = lifecycle.refresh().await?;
    print!("{}", render(&snapshot, lifecycle.now()));
    Ok(())
}

async fn create(lifecycle: &Lifecycle, request: CreateTaskRequest) -> Result<()> {
    let created = lifecycle.create_task(request).await?;

    println!("Created task {}", created.task_id);
    println!("  task:      {}", created.task_address);
    println!("  vault:     {}", created.vault_address);
    println!("  signature: {}", created.signature);
    Ok(())
}

async fn resolve(lifecycle: &Lifecycle, task_id: u64, completed: bool) -> Result<()> {
    match lifecycle.resolve_task(task_id, completed).await {
        Ok(resolved) => {
            println!("Task {} is now {}", resolved.task_id, resolved.status);
            println!("  signature: {}", resolved.signature);
            Ok(())
        }
        Err(DisciplineError::NotYetExpired {
            expires_at, now, ..
        }) => Err(anyhow!(
            "task {task_id} cannot be resolved for another {}",
            format_remaining(expires_at - now)
        )),
        Err(err) => Err(err.into()),
    }
}

async fn stats(lifecycle: &Lifecycle) -> Result<()> {
    let snapshot = lifecycle.refresh().await?;
    let buckets: TaskBuckets = snapshot.tasks.into_iter().collect();

    match snapshot.total_donated {
        Some(total) => println!("Total donated to charity: {} SOL", lamports_to_sol(total)),
        None => println!("Total donated to charity: program not initialized"),
    }
    println!(
        "Your tasks: {} pending, {} completed, {} failed",
        buckets.pending.len(),
        buckets.completed.len(),
        buckets.failed.len()
    );
    Ok(())
}

async fn watch(lifecycle: Arc<Lifecycle>, poll_interval: Duration) -> Result<()> {
    let shutdown = CancellationToken::new();
    let reconciler = spawn_reconciler(lifecycle.clone(), poll_interval, shutdown.clone());
    let receiver = lifecycle.subscribe();

    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for ctrl-c")?;
                break;
            }
            _ = ticker.tick() => {
                let snapshot = receiver.borrow().clone();
                // Clear the screen and home the cursor before each frame.
                print!("\x1b[2J\x1b[H{}", render(&snapshot, lifecycle.now()));
            }
        }
    }

    shutdown.cancel();
    reconciler.await.context("reconciler task failed")?;
    Ok(())
}

fn render(snapshot: &TaskSnapshot, now: i64) -> String {
    let mut out = String::new();
    if snapshot.fetch_sequence == 0 && snapshot.tasks.is_empty() {
        out.push_str("Loading tasks...\n");
        return out;
    }

    let buckets: TaskBuckets = snapshot.tasks.iter().cloned().collect();
    if buckets.is_empty() {
        out.push_str("No tasks yet.\n");
        return out;
    }

    for (title, views) in [
        ("Pending", &buckets.pending),
        ("Completed", &buckets.completed),
        ("Failed", &buckets.failed),
    ] {
        if views.is_empty() {
            continue;
        }
        out.push_str(&format!("{title} ({})\n", views.len()));
        for view in views {
            out.push_str(&render_task(view, now));
        }
    }
    out
}

fn render_task(view: &TaskView, now: i64) -> String {
    let task = &view.task;
    let timing = if task.is_pending() {
        let countdown = view.countdown(now);
        if view.is_expired(now) {
            format!("{countdown}, ready to resolve")
        } else {
            countdown
        }
    } else {
        task.status.to_string()
    };
    let marker = if view.predicted { " *" } else { "" };

    format!(
        "  {:>14}  {:>8.3} SOL  {:<24}  {}{marker}\n",
        task.task_id,
        lamports_to_sol(task.stake_amount),
        timing,
        task.description
    )
}
