//! Device acquisition seam.
//!
//! The session never talks to capture backends directly; it goes through
//! [`MediaDevices`], so tests and headless runs can swap in synthetic
//! sources with scripted permission outcomes.

use clipstage_audio::{AudioSource, ToneSource};
use clipstage_capture::{CaptureError, CaptureResult, FrameSource, TestPatternSource};
use clipstage_ipc::ScreenSourceKind;
use tracing::debug;

/// Processing hints for the microphone track.
#[derive(Debug, Clone, Copy)]
pub struct MicConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain: bool,
}

impl Default for MicConstraints {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain: true,
        }
    }
}

/// A granted screen share.
///
/// System audio rides along only when the user ticked "share audio" and the
/// chosen surface actually carries a track; its absence is not an error.
pub struct ScreenCapture {
    pub video: Box<dyn FrameSource>,
    pub system_audio: Option<Box<dyn AudioSource>>,
}

/// Acquisition of capture devices, consent prompts included.
pub trait MediaDevices: Send + Sync {
    /// Open a screen share. `with_audio` asks for the surface's audio track
    /// as well; the returned capture may still lack one.
    fn open_screen(&self, kind: ScreenSourceKind, with_audio: bool)
        -> CaptureResult<ScreenCapture>;

    /// Open the camera for the overlay bubble.
    fn open_camera(&self) -> CaptureResult<Box<dyn FrameSource>>;

    /// Open the microphone with the given processing hints.
    fn open_microphone(&self, constraints: &MicConstraints)
        -> CaptureResult<Box<dyn AudioSource>>;
}

/// Synthetic devices with scripted permission outcomes.
pub struct SyntheticDevices {
    /// Grant the screen share prompt.
    pub grant_screen: bool,

    /// Grant camera access.
    pub grant_camera: bool,

    /// Grant microphone access.
    pub grant_microphone: bool,

    /// Whether the shared surface carries an audio track.
    pub share_system_audio: bool,

    /// Dimensions of the synthetic screen.
    pub screen_dimensions: (u32, u32),

    /// Frame rate of the synthetic sources.
    pub fps: u32,

    /// Stop the screen source after this many frames, simulating the user
    /// revoking the share mid-recording.
    pub screen_frame_limit: Option<u64>,
}

impl SyntheticDevices {
    /// Devices with every permission granted.
    pub fn all_granted() -> Self {
        Self {
            grant_screen: true,
            grant_camera: true,
            grant_microphone: true,
            share_system_audio: true,
            screen_dimensions: (640, 360),
            fps: 30,
            screen_frame_limit: None,
        }
    }
}

impl MediaDevices for SyntheticDevices {
    fn open_screen(
        &self,
        kind: ScreenSourceKind,
        with_audio: bool,
    ) -> CaptureResult<ScreenCapture> {
        if !self.grant_screen {
            return Err(CaptureError::PermissionDenied {
                device: "screen".into(),
            });
        }
        debug!(?kind, with_audio, "Opening synthetic screen");

        let (width, height) = self.screen_dimensions;
        let video: Box<dyn FrameSource> = match self.screen_frame_limit {
            Some(limit) => Box::new(TestPatternSource::with_frame_limit(
                width, height, self.fps, limit,
            )),
            None => Box::new(TestPatternSource::new(width, height, self.fps)),
        };

        let system_audio: Option<Box<dyn AudioSource>> =
            if with_audio && self.share_system_audio {
                Some(Box::new(ToneSource::new(220.0, 0.2)))
            } else {
                None
            };

        Ok(ScreenCapture {
            video,
            system_audio,
        })
    }

    fn open_camera(&self) -> CaptureResult<Box<dyn FrameSource>> {
        if !self.grant_camera {
            return Err(CaptureError::PermissionDenied {
                device: "camera".into(),
            });
        }
        Ok(Box::new(TestPatternSource::new(320, 240, self.fps)))
    }

    fn open_microphone(
        &self,
        constraints: &MicConstraints,
    ) -> CaptureResult<Box<dyn AudioSource>> {
        if !self.grant_microphone {
            return Err(CaptureError::PermissionDenied {
                device: "microphone".into(),
            });
        }
        debug!(?constraints, "Opening synthetic microphone");
        Ok(Box::new(ToneSource::new(440.0, 0.3)))
    }
}
