//! Validated video metadata fields

use super::validation::ValidationError;

const MAX_TITLE_LEN: usize = 200;
const MAX_DESCRIPTION_LEN: usize = 2000;
const MAX_URL_LEN: usize = 2048;

/// Playback transformation defaults: portrait full-HD, matching what the
/// upload page requests from the media host.
pub const DEFAULT_TRANSFORM_HEIGHT: i32 = 1920;
pub const DEFAULT_TRANSFORM_WIDTH: i32 = 1080;

/// Video title, non-empty and display-sized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoTitle(String);

impl VideoTitle {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }
        if trimmed.len() > MAX_TITLE_LEN {
            return Err(ValidationError::TooLong {
                field: "title",
                max: MAX_TITLE_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Video description, non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDescription(String);

impl VideoDescription {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty {
                field: "description",
            });
        }
        if trimmed.len() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::TooLong {
                field: "description",
                max: MAX_DESCRIPTION_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An address on the media host (playback or thumbnail)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUrl(String);

impl MediaUrl {
    /// `field` names the request field for error messages
    /// (video_url / thumbnail_url).
    pub fn new(field: &'static str, raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field });
        }
        if trimmed.len() > MAX_URL_LEN {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_URL_LEN,
            });
        }
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(ValidationError::InvalidFormat {
                field,
                reason: "must be an http(s) URL",
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
