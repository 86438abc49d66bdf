//! Configuration types for starting a recording.

use serde::{Deserialize, Serialize};

/// What part of the screen the user picked in the share prompt.
///
/// Advisory only: the capture backend decides what it can actually deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScreenSourceKind {
    /// An entire display.
    #[default]
    FullScreen,

    /// A single application window.
    AppWindow,

    /// A single browser tab.
    BrowserTab,
}

/// Which audio inputs feed the mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AudioSourceKind {
    /// Silent recording.
    #[default]
    None,

    /// Microphone only.
    Microphone,

    /// System (shared-surface) audio only.
    System,

    /// Microphone and system audio mixed.
    Both,
}

impl AudioSourceKind {
    pub fn wants_microphone(self) -> bool {
        matches!(self, Self::Microphone | Self::Both)
    }

    pub fn wants_system(self) -> bool {
        matches!(self, Self::System | Self::Both)
    }
}

/// Output resolution preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QualityPreset {
    /// 1280x720.
    Hd720,

    /// 1920x1080.
    #[default]
    Hd1080,
}

impl QualityPreset {
    /// Output dimensions in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Hd720 => (1280, 720),
            Self::Hd1080 => (1920, 1080),
        }
    }
}

/// Recording frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrameRate {
    #[default]
    Fps30,
    Fps60,
}

impl FrameRate {
    pub fn value(self) -> u32 {
        match self {
            Self::Fps30 => 30,
            Self::Fps60 => 60,
        }
    }
}

/// Camera overlay settings, mirrored into the compositor config.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OverlaySettings {
    /// Whether the camera bubble is drawn at all.
    pub enabled: bool,

    /// Shape name: "circle", "rounded" or "square".
    pub shape: OverlayShapeSetting,

    /// Size class of the bubble.
    pub size: OverlaySizeSetting,

    /// Which canvas corner anchors the bubble.
    pub corner: OverlayCornerSetting,

    /// Mirror the camera horizontally.
    pub mirror: bool,

    /// Draw a border ring around the bubble.
    pub border: bool,

    /// Draw a drop shadow under the bubble.
    pub shadow: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            enabled: false,
            shape: OverlayShapeSetting::Circle,
            size: OverlaySizeSetting::Medium,
            corner: OverlayCornerSetting::BottomRight,
            mirror: true,
            border: false,
            shadow: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayShapeSetting {
    Circle,
    RoundedRect,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlaySizeSetting {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlayCornerSetting {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Configuration for starting a recording session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSettings {
    /// Screen source kind the user picked.
    pub screen_source: ScreenSourceKind,

    /// Which audio inputs to record.
    pub audio_source: AudioSourceKind,

    /// Output resolution preset.
    pub quality: QualityPreset,

    /// Output frame rate.
    pub frame_rate: FrameRate,

    /// Camera overlay settings.
    pub overlay: OverlaySettings,

    /// Video bitrate in kbps (default: 6000).
    pub video_bitrate_kbps: u32,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            screen_source: ScreenSourceKind::default(),
            audio_source: AudioSourceKind::default(),
            quality: QualityPreset::default(),
            frame_rate: FrameRate::default(),
            overlay: OverlaySettings::default(),
            video_bitrate_kbps: 6000,
        }
    }
}
