//! Session state and warning types.

use serde::{Deserialize, Serialize};

/// Serialized summary of the recording session state.
///
/// The engine carries timing internally; this is the UI-facing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// No recording in progress.
    #[default]
    Idle,

    /// Actively capturing.
    Recording,

    /// Capturing suspended; sources stay open.
    Paused,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Returns a simple string representation of the state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Recording => "Recording",
            Self::Paused => "Paused",
        }
    }
}

/// Degraded-session warnings for optional sources.
///
/// None of these stop the recording; the session continues without the
/// affected input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionWarning {
    /// Camera permission denied or device missing; overlay disabled.
    CameraUnavailable,

    /// Microphone permission denied or device missing.
    MicrophoneUnavailable,

    /// The shared surface carries no audio track.
    SystemAudioUnavailable,
}

impl SessionWarning {
    /// Returns a display message for this warning.
    pub fn message(&self) -> &'static str {
        match self {
            Self::CameraUnavailable => "Camera unavailable, recording without overlay",
            Self::MicrophoneUnavailable => "Microphone unavailable, recording without mic audio",
            Self::SystemAudioUnavailable => "Shared surface has no audio, recording without system audio",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_names_are_stable() {
        assert_eq!(SessionState::Idle.name(), "Idle");
        assert_eq!(SessionState::Recording.name(), "Recording");
        assert_eq!(SessionState::Paused.name(), "Paused");
    }

    #[test]
    fn warnings_have_messages() {
        assert!(SessionWarning::MicrophoneUnavailable
            .message()
            .contains("Microphone"));
    }
}
