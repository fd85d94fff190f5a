//! Tests for the Tokio-backed reload scheduler.

use anyhow::{Context, Result, ensure};
use paddock::bundle::BundleStore;
use paddock::locale::Locale;
use paddock::settings::LocaleSettings;
use paddock::sync::{LocaleSynchronizer, ReloadHook, ReloadScheduler, TokioReloadScheduler};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use test_support::MemoryBrowser;

fn counting_hook() -> (ReloadHook, Arc<AtomicUsize>) {
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let hook: ReloadHook = Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (hook, fired)
}

#[tokio::test(start_paused = true)]
async fn reload_fires_after_the_delay() -> Result<()> {
    let (hook, fired) = counting_hook();
    let mut scheduler = TokioReloadScheduler::current(hook).context("inside a runtime")?;

    scheduler.schedule_reload(Duration::from_millis(150));
    ensure!(scheduler.pending_reloads() == 1, "reload should be armed");

    tokio::time::sleep(Duration::from_millis(149)).await;
    ensure!(fired.load(Ordering::SeqCst) == 0, "reload fired early");

    tokio::time::sleep(Duration::from_millis(2)).await;
    ensure!(fired.load(Ordering::SeqCst) == 1, "reload did not fire");
    ensure!(scheduler.pending_reloads() == 0, "no reload left pending");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn overlapping_changes_fire_two_reloads() -> Result<()> {
    let (hook, fired) = counting_hook();
    let scheduler = TokioReloadScheduler::current(hook).context("inside a runtime")?;
    let bundles = Arc::new(BundleStore::embedded()?);
    let mut sync = LocaleSynchronizer::new(
        Locale::Es,
        MemoryBrowser::new(),
        scheduler,
        bundles,
        LocaleSettings::default(),
    );

    sync.request_change(Locale::En);
    sync.request_change(Locale::De);
    ensure!(sync.scheduler().pending_reloads() == 2, "both timers armed");

    tokio::time::sleep(Duration::from_millis(500)).await;
    ensure!(fired.load(Ordering::SeqCst) == 2, "both reloads fire");
    Ok(())
}

#[test]
fn scheduler_requires_a_runtime() {
    let (hook, _) = counting_hook();
    assert!(TokioReloadScheduler::current(hook).is_err());
}
