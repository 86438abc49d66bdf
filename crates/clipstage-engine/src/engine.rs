//! Engine command loop.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, error, info, instrument, warn};

use clipstage_ipc::{SessionCommand, SessionEvent, SessionState};
use clipstage_store::AssetStore;

use crate::devices::MediaDevices;
use crate::session::RecordingSession;

/// Command poll interval; also how often source-end detection runs.
const COMMAND_POLL: Duration = Duration::from_millis(100);

/// Command-driven wrapper around a [`RecordingSession`].
pub struct Engine {
    command_rx: Receiver<SessionCommand>,
    event_tx: Sender<SessionEvent>,
    session: RecordingSession,
}

impl Engine {
    pub fn new(
        command_rx: Receiver<SessionCommand>,
        event_tx: Sender<SessionEvent>,
        devices: Arc<dyn MediaDevices>,
        store: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            command_rx,
            event_tx,
            session: RecordingSession::new(devices, store),
        }
    }

    /// Run the engine (blocking).
    #[instrument(name = "engine_run", skip(self))]
    pub fn run(&mut self) {
        info!("Engine starting");
        self.send_event(SessionEvent::Ready);

        loop {
            match self.command_rx.recv_timeout(COMMAND_POLL) {
                Ok(command) => {
                    if !self.handle_command(command) {
                        break;
                    }
                }
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                    // The share can be revoked from outside at any time.
                    if !self.session.state().is_idle() && self.session.source_ended() {
                        info!("Screen share ended, stopping implicitly");
                        self.stop_session();
                    }
                }
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                    info!("Command channel disconnected, shutting down");
                    break;
                }
            }
        }

        // Never leave an orphaned recording behind.
        self.stop_session();
        info!("Engine stopped");
    }

    /// Handle a command. Returns false if the engine should stop.
    fn handle_command(&mut self, command: SessionCommand) -> bool {
        debug!(?command, "Handling command");

        match command {
            SessionCommand::Start { settings } => {
                let previous = self.session.state();
                match self.session.start(&settings) {
                    Ok(warnings) => {
                        self.emit_transition(previous);
                        for warning in warnings {
                            self.send_event(SessionEvent::Warning(warning));
                        }
                    }
                    Err(e) => {
                        error!("Start failed: {e}");
                        self.send_event(SessionEvent::Error {
                            recoverable: true,
                            message: e.to_string(),
                        });
                    }
                }
            }
            SessionCommand::Pause => {
                let previous = self.session.state();
                self.session.pause();
                self.emit_transition(previous);
            }
            SessionCommand::Resume => {
                let previous = self.session.state();
                self.session.resume();
                self.emit_transition(previous);
            }
            SessionCommand::Stop => self.stop_session(),
            SessionCommand::Screenshot => self.take_screenshot(),
            SessionCommand::GetState => {
                let state = self.session.state();
                self.send_event(SessionEvent::StateChanged {
                    previous: state,
                    current: state,
                });
            }
            SessionCommand::Shutdown => {
                self.stop_session();
                self.send_event(SessionEvent::Shutdown);
                return false;
            }
        }

        true
    }

    fn stop_session(&mut self) {
        let previous = self.session.state();
        match self.session.stop() {
            Ok(Some(recording)) => {
                self.emit_transition(previous);
                self.send_event(SessionEvent::RecordingSaved {
                    id: recording.id,
                    duration_secs: recording.duration_secs,
                    byte_size: recording.byte_size,
                });
            }
            Ok(None) => {}
            Err(e) => {
                error!("Stop failed: {e}");
                self.emit_transition(previous);
                self.send_event(SessionEvent::Error {
                    recoverable: true,
                    message: e.to_string(),
                });
            }
        }
    }

    fn take_screenshot(&mut self) {
        match self.session.screenshot() {
            Ok(Some(shot)) => self.send_event(SessionEvent::ScreenshotSaved { id: shot.id }),
            Ok(None) => debug!("No composited frame to capture"),
            Err(e) => {
                error!("Screenshot failed: {e}");
                self.send_event(SessionEvent::Error {
                    recoverable: true,
                    message: e.to_string(),
                });
            }
        }
    }

    fn emit_transition(&self, previous: SessionState) {
        let current = self.session.state();
        if previous != current {
            debug!(previous = previous.name(), current = current.name(), "State transition");
            self.send_event(SessionEvent::StateChanged { previous, current });
        }
    }

    fn send_event(&self, event: SessionEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("Failed to send event: {e}");
        }
    }
}

/// Convenience accessor used by embedders that drive the session directly.
impl Engine {
    pub fn session(&mut self) -> &mut RecordingSession {
        &mut self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    use clipstage_ipc::{command_channel, event_channel, RecordingSettings};
    use clipstage_store::MemoryStore;

    use crate::devices::SyntheticDevices;

    #[test]
    fn command_loop_runs_a_full_session() {
        let (cmd_tx, cmd_rx) = command_channel();
        let (evt_tx, evt_rx) = event_channel();
        let store = Arc::new(MemoryStore::new());

        let store_for_engine = Arc::clone(&store) as Arc<dyn AssetStore>;
        let handle = thread::spawn(move || {
            let mut engine = Engine::new(
                cmd_rx,
                evt_tx,
                Arc::new(SyntheticDevices::all_granted()),
                store_for_engine,
            );
            engine.run();
        });

        cmd_tx
            .send(SessionCommand::Start {
                settings: RecordingSettings::default(),
            })
            .unwrap();
        thread::sleep(Duration::from_millis(300));
        cmd_tx.send(SessionCommand::Stop).unwrap();
        cmd_tx.send(SessionCommand::Shutdown).unwrap();
        handle.join().unwrap();

        let events: Vec<SessionEvent> = evt_rx.try_iter().collect();
        assert!(matches!(events.first(), Some(SessionEvent::Ready)));
        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::StateChanged {
                current: SessionState::Recording,
                ..
            }
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::RecordingSaved { .. })));
        assert!(matches!(events.last(), Some(SessionEvent::Shutdown)));

        assert_eq!(store.load_recordings().unwrap().len(), 1);
    }

    #[test]
    fn start_failure_surfaces_an_error_event() {
        let (cmd_tx, cmd_rx) = command_channel();
        let (evt_tx, evt_rx) = event_channel();

        let handle = thread::spawn(move || {
            let mut engine = Engine::new(
                cmd_rx,
                evt_tx,
                Arc::new(SyntheticDevices {
                    grant_screen: false,
                    ..SyntheticDevices::all_granted()
                }),
                Arc::new(MemoryStore::new()),
            );
            engine.run();
        });

        cmd_tx
            .send(SessionCommand::Start {
                settings: RecordingSettings::default(),
            })
            .unwrap();
        cmd_tx.send(SessionCommand::Shutdown).unwrap();
        handle.join().unwrap();

        let events: Vec<SessionEvent> = evt_rx.try_iter().collect();
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::Error { recoverable: true, .. })));
    }

    #[test]
    fn revoked_share_stops_implicitly() {
        let (cmd_tx, cmd_rx) = command_channel();
        let (evt_tx, evt_rx) = event_channel();

        let handle = thread::spawn(move || {
            let mut engine = Engine::new(
                cmd_rx,
                evt_tx,
                Arc::new(SyntheticDevices {
                    screen_frame_limit: Some(5),
                    fps: 60,
                    ..SyntheticDevices::all_granted()
                }),
                Arc::new(MemoryStore::new()),
            );
            engine.run();
        });

        cmd_tx
            .send(SessionCommand::Start {
                settings: RecordingSettings::default(),
            })
            .unwrap();
        // Give the source time to run out and the poll to notice.
        thread::sleep(Duration::from_millis(800));
        cmd_tx.send(SessionCommand::Shutdown).unwrap();
        handle.join().unwrap();

        let events: Vec<SessionEvent> = evt_rx.try_iter().collect();
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::RecordingSaved { .. })));
        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::StateChanged {
                current: SessionState::Idle,
                ..
            }
        )));
    }
}
