//! Headless demo: record a synthetic screen with camera overlay and mixed
//! audio, take a screenshot, then trim and re-encode the result at 2x.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipstage_engine::{Engine, SyntheticDevices};
use clipstage_export::{ExportSettings, Exporter, LoadedAsset, METADATA_DEADLINE};
use clipstage_ipc::{
    command_channel, event_channel, AudioSourceKind, QualityPreset, RecordingSettings,
    SessionCommand, SessionEvent,
};
use clipstage_store::{AssetStore, FsStore};

fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "clipstage=info,clipstage_engine=info,clipstage_export=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn drain_events(rx: &crossbeam_channel::Receiver<SessionEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            SessionEvent::StateChanged { previous, current } => {
                info!("State: {} -> {}", previous.name(), current.name());
            }
            SessionEvent::Warning(warning) => info!("Warning: {}", warning.message()),
            SessionEvent::RecordingSaved {
                id,
                duration_secs,
                byte_size,
            } => info!("Recording {id}: {duration_secs:.2}s, {byte_size} bytes"),
            SessionEvent::ScreenshotSaved { id } => info!("Screenshot {id}"),
            SessionEvent::Error {
                recoverable,
                message,
            } => info!("Error (recoverable={recoverable}): {message}"),
            SessionEvent::Ready => info!("Engine ready"),
            SessionEvent::Shutdown => info!("Engine shut down"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let store = Arc::new(FsStore::open_default().context("opening asset store")?);
    let (command_tx, command_rx) = command_channel();
    let (event_tx, event_rx) = event_channel();

    let engine_store = Arc::clone(&store) as Arc<dyn AssetStore>;
    let engine_handle = thread::spawn(move || {
        let mut engine = Engine::new(
            command_rx,
            event_tx,
            Arc::new(SyntheticDevices::all_granted()),
            engine_store,
        );
        engine.run();
    });

    // Record ~3 seconds with overlay and both audio branches, pausing in
    // the middle.
    let mut settings = RecordingSettings {
        audio_source: AudioSourceKind::Both,
        quality: QualityPreset::Hd720,
        ..Default::default()
    };
    settings.overlay.enabled = true;

    command_tx.send(SessionCommand::Start { settings })?;
    thread::sleep(Duration::from_millis(1500));
    command_tx.send(SessionCommand::Screenshot)?;
    command_tx.send(SessionCommand::Pause)?;
    thread::sleep(Duration::from_millis(500));
    command_tx.send(SessionCommand::Resume)?;
    thread::sleep(Duration::from_millis(1500));
    command_tx.send(SessionCommand::Stop)?;
    thread::sleep(Duration::from_millis(300));
    command_tx.send(SessionCommand::Shutdown)?;
    engine_handle.join().ok();
    drain_events(&event_rx);

    // Re-encode the newest recording: trim the first half second off both
    // ends, double the speed.
    let recordings = store.load_recordings()?;
    let source = recordings.first().context("no recording persisted")?;
    info!(
        "Exporting {} ({:.2}s, {} bytes)",
        source.id, source.duration_secs, source.byte_size
    );

    let asset = LoadedAsset::load(source, METADATA_DEADLINE)?;
    let mut export_settings = ExportSettings::for_asset(&asset);
    export_settings.trim.set_start(0.5);
    export_settings
        .trim
        .set_end(asset.duration_secs() - 0.5);
    export_settings.speed = 2.0;

    let exporter = Exporter::new(Arc::clone(&store) as Arc<dyn AssetStore>);
    let exported = exporter.export(source, &export_settings, |percent| {
        if percent % 25.0 < 1.0 {
            info!("Export progress: {percent:.0}%");
        }
    })?;
    info!(
        "Exported {} ({:.2}s, {} bytes)",
        exported.id, exported.duration_secs, exported.byte_size
    );

    for recording in store.load_recordings()? {
        info!(
            "  {}  {:>8} bytes  {:.2}s  {}",
            recording.id, recording.byte_size, recording.duration_secs, recording.resolution
        );
    }
    for screenshot in store.load_screenshots()? {
        info!("  {}  {:>8} bytes  screenshot", screenshot.id, screenshot.payload.len());
    }

    Ok(())
}
