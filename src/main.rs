mod gui;
mod hotkeys;
mod meter;
mod poller;
mod remote;
mod shared_state;
mod window_control;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use crate::gui::OverlayApp;
use crate::hotkeys::HotkeyAction;
use crate::remote::PlatformRemote;
use crate::shared_state::SharedState;

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}

/// Local-offset RFC 3339 log timestamps. Offset lookup can fail once other
/// threads exist, so this runs first thing in main; UTC is the fallback.
fn log_timer() -> tracing_subscriber::fmt::time::OffsetTime<time::format_description::well_known::Rfc3339>
{
    tracing_subscriber::fmt::time::OffsetTime::local_rfc_3339().unwrap_or_else(|_| {
        tracing_subscriber::fmt::time::OffsetTime::new(
            time::UtcOffset::UTC,
            time::format_description::well_known::Rfc3339,
        )
    })
}

/// File logging under the platform data dir; stderr-only when that fails.
/// The returned guard must stay alive until exit or buffered lines are lost.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let timer = log_timer();

    if let Some(dirs) = directories::ProjectDirs::from("", "", "GainSight") {
        let log_dir = dirs.data_local_dir().join("logs");
        if std::fs::create_dir_all(&log_dir).is_ok() {
            let appender = tracing_appender::rolling::daily(&log_dir, "gainsight.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_timer(timer)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            return Some(guard);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_timer(timer)
        .init();
    None
}

fn main() -> anyhow::Result<()> {
    let _log_guard = init_logging();
    tracing::info!("=== GainSight - Voicemeeter gain overlay ===");

    // Create shared state; the first-run hint doubles as the login banner slot
    let shared_state = Arc::new(Mutex::new(SharedState::new()));
    {
        let mut state = shared_state.lock().unwrap();
        state.notice = Some(
            "GainSight: F8 show/hide, F9 click-through, F10 layout. \
             Use the Settings tab to rebind."
                .to_string(),
        );
    }

    // Shutdown signal for the poller thread
    let shutdown = Arc::new(AtomicBool::new(false));

    // Connect to Voicemeeter. Login failure is informational only: the
    // overlay keeps running and just shows its default readings.
    let poller_thread = match PlatformRemote::open() {
        Ok(remote) => Some(poller::spawn_poller(
            remote,
            shared_state.clone(),
            shutdown.clone(),
        )),
        Err(e) => {
            tracing::error!("[Main] Voicemeeter login failed: {}", e);
            let mut state = shared_state.lock().unwrap();
            state.notice = Some(format!("Voicemeeter login failed: {e}"));
            None
        }
    };

    // Global hotkeys, seeded from the default bindings
    let initial_binds = {
        let state = shared_state.lock().unwrap();
        vec![
            (HotkeyAction::ToggleVisibility, state.config.show_hide_key),
            (
                HotkeyAction::ToggleClickThrough,
                state.config.click_through_key,
            ),
            (HotkeyAction::ToggleLayout, state.config.layout_key),
        ]
    };
    let (hotkeys, hotkey_thread) = hotkeys::spawn_hotkey_listener(initial_binds);

    tracing::info!("[Main] Starting GUI...");

    let viewport_builder = egui::ViewportBuilder::default()
        .with_inner_size([750.0, 350.0])
        .with_position([600.0, 40.0])
        .with_title("GainSight")
        .with_resizable(true)
        .with_transparent(true)
        .with_decorations(false)
        .with_always_on_top();

    let options = eframe::NativeOptions {
        viewport: viewport_builder,
        ..Default::default()
    };

    // Blocks until the window closes
    eframe::run_native(
        "GainSight",
        options,
        Box::new(|_cc| Ok(Box::new(OverlayApp::new(shared_state.clone(), hotkeys)))),
    )
    .map_err(|e| anyhow!("GUI failed: {e}"))?;

    // Wind down the poller; dropping the remote logs out of Voicemeeter.
    // The hotkey listener got its Shutdown from on_exit; joining it here
    // lets the unregister teardown finish before the process exits.
    tracing::info!("[Main] Shutting down...");
    shutdown.store(true, Ordering::Relaxed);
    if let Some(handle) = poller_thread {
        let _ = handle.join();
    }
    if let Some(handle) = hotkey_thread {
        let _ = handle.join();
    }

    tracing::info!("[Main] Shutdown complete");
    Ok(())
}
