// SPDX-License-Identifier: MPL-2.0
//! Error taxonomy carried in failure envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

use crate::application::port::{
    DialogError, ExtractError, ImageError, TranscodeError, WindowError,
};
use crate::diagnostics::sanitize_message;

/// Stable, machine-readable failure tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Native file/folder picker failed or was misused.
    DialogError,
    /// Delegated encoder or transcoder failed.
    ConversionError,
    /// Probing a file's attributes failed.
    MetadataError,
    /// Extraction tool failed while describing a video.
    YoutubeInfoError,
    /// Extraction tool failed while downloading.
    YoutubeDownloadError,
    /// Payload failed re-validation.
    ValidationError,
    /// No channel with the requested name exists.
    UnknownChannel,
    /// Window controller rejected an operation.
    WindowError,
    /// Plain filesystem access failed.
    FileError,
    /// Handler panicked or produced unserializable data.
    InternalError,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::DialogError => "DIALOG_ERROR",
            ErrorCode::ConversionError => "CONVERSION_ERROR",
            ErrorCode::MetadataError => "METADATA_ERROR",
            ErrorCode::YoutubeInfoError => "YOUTUBE_INFO_ERROR",
            ErrorCode::YoutubeDownloadError => "YOUTUBE_DOWNLOAD_ERROR",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::UnknownChannel => "UNKNOWN_CHANNEL",
            ErrorCode::WindowError => "WINDOW_ERROR",
            ErrorCode::FileError => "FILE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A handler failure, normalized for the wire.
///
/// The message is sanitized on construction, so a `BridgeError` can be logged
/// or sent as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl BridgeError {
    #[must_use]
    pub fn new(code: ErrorCode, message: impl AsRef<str>) -> Self {
        Self {
            code,
            message: sanitize_message(message.as_ref()),
            details: None,
        }
    }

    /// Attaches structured context. String values inside are sanitized.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(sanitize_value(details));
        self
    }

    #[must_use]
    pub fn validation(message: impl AsRef<str>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    #[must_use]
    pub fn internal(message: impl AsRef<str>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(sanitize_message(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, sanitize_value(v)))
                .collect(),
        ),
        other => other,
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for BridgeError {}

// =============================================================================
// Collaborator errors
// =============================================================================

impl From<DialogError> for BridgeError {
    fn from(err: DialogError) -> Self {
        Self::new(ErrorCode::DialogError, err.to_string())
    }
}

impl From<WindowError> for BridgeError {
    fn from(err: WindowError) -> Self {
        Self::new(ErrorCode::WindowError, err.to_string())
    }
}

impl From<TranscodeError> for BridgeError {
    fn from(err: TranscodeError) -> Self {
        let details = match &err {
            TranscodeError::ToolMissing(tool) => Some(json!({ "tool": tool })),
            TranscodeError::Failed { status, .. } => Some(json!({ "exitCode": status })),
            TranscodeError::Probe(_) | TranscodeError::Io(_) => None,
        };
        let bridge = Self::new(ErrorCode::ConversionError, err.to_string());
        match details {
            Some(details) => bridge.with_details(details),
            None => bridge,
        }
    }
}

impl From<ImageError> for BridgeError {
    /// Conversion failures. Probing maps through [`BridgeError::metadata`].
    fn from(err: ImageError) -> Self {
        Self::new(ErrorCode::ConversionError, err.to_string())
    }
}

impl BridgeError {
    /// Image probing failure.
    #[must_use]
    pub fn metadata(err: ImageError) -> Self {
        Self::new(ErrorCode::MetadataError, err.to_string())
    }

    /// Extractor failure, tagged with the code of the operation that ran.
    #[must_use]
    pub fn extraction(code: ErrorCode, err: ExtractError) -> Self {
        let bridge = Self::new(code, err.to_string());
        match err {
            ExtractError::ToolMissing(tool) => bridge.with_details(json!({ "tool": tool })),
            ExtractError::BotDetected => bridge.with_details(json!({ "reason": "bot-detection" })),
            ExtractError::Unavailable => bridge.with_details(json!({ "reason": "unavailable" })),
            _ => bridge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn codes_serialize_screaming_snake() {
        assert_eq!(
            serde_json::to_value(ErrorCode::YoutubeInfoError).unwrap(),
            json!("YOUTUBE_INFO_ERROR")
        );
        for code in [
            ErrorCode::DialogError,
            ErrorCode::ConversionError,
            ErrorCode::MetadataError,
            ErrorCode::YoutubeDownloadError,
            ErrorCode::ValidationError,
            ErrorCode::InternalError,
        ] {
            assert_eq!(serde_json::to_value(code).unwrap(), json!(code.as_str()));
        }
    }

    #[test]
    fn message_is_sanitized_on_construction() {
        let err = BridgeError::new(ErrorCode::FileError, "missing /Users/zoe/a.png");
        assert_eq!(err.message, "missing /Users/[REDACTED]/a.png");
    }

    #[test]
    fn details_strings_are_sanitized_recursively() {
        let err = BridgeError::validation("bad").with_details(json!({
            "paths": ["/home/amy/x", 3],
            "field": "filePath"
        }));
        let details = err.details.unwrap();
        assert_eq!(details["paths"][0], "/home/[REDACTED]/x");
        assert_eq!(details["paths"][1], 3);
        assert_eq!(details["field"], "filePath");
    }

    #[test]
    fn extraction_errors_pick_code_by_operation() {
        let info = BridgeError::extraction(ErrorCode::YoutubeInfoError, ExtractError::BotDetected);
        assert_eq!(info.code, ErrorCode::YoutubeInfoError);
        assert!(info.message.contains("blocking"));
        let download = BridgeError::extraction(ErrorCode::YoutubeDownloadError, ExtractError::Failed("x".into()));
        assert_eq!(download.code, ErrorCode::YoutubeDownloadError);
        assert!(download.details.is_none());
    }

    #[test]
    fn image_errors_map_to_conversion_or_metadata() {
        let err = ImageError::Decode("bad header".into());
        assert_eq!(BridgeError::from(err.clone()).code, ErrorCode::ConversionError);
        assert_eq!(BridgeError::metadata(err).code, ErrorCode::MetadataError);
    }

    #[test]
    fn transcode_failure_carries_exit_code() {
        let err: BridgeError = TranscodeError::Failed {
            status: Some(1),
            stderr: "Invalid data found when processing input".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ConversionError);
        assert_eq!(err.details, Some(json!({ "exitCode": 1 })));
    }

    #[test]
    fn details_are_omitted_when_absent() {
        let json = serde_json::to_value(BridgeError::internal("boom")).unwrap();
        assert!(json.get("details").is_none());
        assert_eq!(json["code"], "INTERNAL_ERROR");
    }
}
