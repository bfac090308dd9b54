use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Context, Result};

use ctxlog::config::default_log_dir;
use ctxlog::{ContextId, LogConfig, LogRegistry, Source};

const WORKERS: usize = 3;

struct Worker;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ctxlog=info,ctxlog_demo=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Optional base folder as the only argument
    let folder = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(default_log_dir);

    let registry = Arc::new(LogRegistry::with_config(LogConfig::new(&folder, true)));

    let writes = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&writes);
    registry.add_write_observer(move |_: &str, _: &str| {
        counter.fetch_add(1, Ordering::Relaxed);
    });

    let workers = (1..=WORKERS)
        .map(|n| {
            let registry = Arc::clone(&registry);
            let folder = folder.clone();
            thread::Builder::new()
                .name(format!("worker-{}", n))
                .spawn(move || run_worker(&registry, folder, n))
                .context("Failed to spawn worker thread")
        })
        .collect::<Result<Vec<_>>>()?;

    for worker in workers {
        worker
            .join()
            .map_err(|_| anyhow!("Worker thread panicked"))?;
    }

    let main_ctx = ContextId::current_thread();
    registry.info(&main_ctx, Source::from("main"), format!("{} entries written", writes.load(Ordering::Relaxed)));
    let disposed = registry.shutdown();

    tracing::info!(folder = %folder.display(), disposed, "Logs flushed");
    Ok(())
}

fn run_worker(registry: &LogRegistry, folder: PathBuf, n: usize) -> Option<PathBuf> {
    let ctx = ContextId::current_thread();
    registry.initialize(&ctx, folder, true);

    registry.info(&ctx, Source::of::<Worker>(), "starting");
    registry.debug(&ctx, Source::of::<Worker>(), format!("detail={}", n * 14));
    if n % 2 == 0 {
        registry.error(&ctx, Source::of::<Worker>(), "boom");
    }

    let path = registry.dispose(&ctx);
    if let Some(path) = &path {
        tracing::info!(context = %ctx, path = %path.display(), "Worker log written");
    }
    path
}
