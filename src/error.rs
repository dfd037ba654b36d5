use thiserror::Error;

/// Main error type for the clipforge library
#[derive(Error, Debug)]
pub enum EditError {
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Clip error: {0}")]
    Clip(#[from] ClipError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Overlay error: {0}")]
    Overlay(#[from] OverlayError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors opening or decoding source media
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Cannot read or decode media file: {path}")]
    Unreadable { path: String },

    #[error("Unsupported media format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Failed to decode frame at {timestamp:.3}s from {path}")]
    FrameDecodeFailed { path: String, timestamp: f64 },

    #[error("Invalid stream metadata for {path}: {details}")]
    InvalidMetadata { path: String, details: String },
}

/// Errors from clip construction and time transforms
#[derive(Error, Debug)]
pub enum ClipError {
    #[error("Invalid trim range [{start:.3}, {end:.3}] for clip of {duration:.3}s")]
    InvalidRange { start: f64, end: f64, duration: f64 },

    #[error("Invalid speed factor {factor}: must be positive and finite")]
    InvalidSpeed { factor: f64 },

    #[error("Invalid clip parameters: {details}")]
    InvalidParameters { details: String },
}

/// Errors from the filter engine
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Unsupported filter: {name}")]
    Unsupported { name: String },
}

/// Errors from the text overlay compositor
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Font size {size} out of range (10-100)")]
    InvalidFontSize { size: u32 },

    #[error("Unknown anchor position: {name}")]
    UnknownAnchor { name: String },

    #[error("Unknown font family: {name}")]
    UnknownFamily { name: String },

    #[error("Invalid color value: {value}")]
    InvalidColor { value: String },

    #[error("Invalid overlay window [{start:.3}, {end:.3}]")]
    InvalidWindow { start: f64, end: f64 },

    #[error("Overlay text is empty")]
    EmptyText,

    #[error("No usable font file found for family {family}")]
    FontUnavailable { family: String },
}

/// Errors loading external audio
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to load audio file: {path}")]
    LoadFailed { path: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Invalid audio parameters: {details}")]
    InvalidParameters { details: String },
}

/// Errors from the renderer
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Encoding failed: {reason}")]
    EncodingFailed { reason: String },

    #[error("ffmpeg executable not found on PATH")]
    EncoderUnavailable,

    #[error("Render cancelled")]
    Cancelled,

    #[error("Output write failed: {path}")]
    OutputFailed { path: String },
}

/// Errors validating an edit plan
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Audio mix requested but no audio source was supplied")]
    MissingAudioSource,

    #[error("Invalid plan value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Failed to parse plan file: {path}")]
    ParseFailed { path: String },

    #[error("Plan file not found: {path}")]
    FileNotFound { path: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using EditError
pub type Result<T> = std::result::Result<T, EditError>;

impl EditError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Media(MediaError::Unreadable { path }) => {
                format!("Could not read '{}'. Please check the file exists and is a supported format.", path)
            }
            Self::Audio(AudioError::LoadFailed { path }) => {
                format!("Could not load audio file '{}'. Please check the file exists and is a supported format.", path)
            }
            Self::Render(RenderError::EncoderUnavailable) => {
                "ffmpeg was not found. Please install FFmpeg and make sure it is on your PATH.".to_string()
            }
            Self::Plan(PlanError::MissingAudioSource) => {
                "The plan enables background audio but no audio file was supplied.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
