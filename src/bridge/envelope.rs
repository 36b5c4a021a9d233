// SPDX-License-Identifier: MPL-2.0
//! Request and envelope types.
//!
//! Every call carries a caller-generated [`RequestId`]; the privileged side
//! answers with exactly one [`Envelope`] echoing it. An envelope holds either
//! `data` or `error`, never both and never neither. The invariant is enforced
//! by the constructors and re-checked when an envelope is deserialized.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::error::{BridgeError, ErrorCode};
use crate::config::MAX_REQUEST_ID_LEN;

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Opaque correlation token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequestId(String);

impl RequestId {
    /// Fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RequestId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err("request id must not be empty".into());
        }
        if value.len() > MAX_REQUEST_ID_LEN {
            return Err(format!(
                "request id longer than {MAX_REQUEST_ID_LEN} bytes"
            ));
        }
        Ok(Self(value))
    }
}

impl From<RequestId> for String {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A request as it crosses the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request<P = Value> {
    pub id: RequestId,
    pub payload: P,
    /// Creation time; informational only.
    pub timestamp: i64,
}

/// Request whose payload has not been validated yet.
pub type RawRequest = Request<Value>;

impl<P> Request<P> {
    /// Wraps `payload` with a fresh id and the current time.
    pub fn new(payload: P) -> Self {
        Self {
            id: RequestId::generate(),
            payload,
            timestamp: now_millis(),
        }
    }
}

impl<P: Serialize> Request<P> {
    /// Erases the payload type for transport.
    ///
    /// # Errors
    ///
    /// Returns the serialization error if the payload cannot become JSON.
    pub fn into_raw(self) -> serde_json::Result<RawRequest> {
        Ok(Request {
            id: self.id,
            payload: serde_json::to_value(self.payload)?,
            timestamp: self.timestamp,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "WireEnvelope")]
pub struct Envelope {
    request_id: RequestId,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<BridgeError>,
    timestamp: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEnvelope {
    request_id: RequestId,
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    error: Option<BridgeError>,
    timestamp: i64,
}

impl TryFrom<WireEnvelope> for Envelope {
    type Error = String;

    fn try_from(wire: WireEnvelope) -> Result<Self, Self::Error> {
        match (wire.success, wire.data.is_some(), wire.error.is_some()) {
            (true, true, false) | (false, false, true) => Ok(Self {
                request_id: wire.request_id,
                success: wire.success,
                data: wire.data,
                error: wire.error,
                timestamp: wire.timestamp,
            }),
            _ => Err(format!(
                "malformed envelope for request {}: success={} but data/error mismatch",
                wire.request_id, wire.success
            )),
        }
    }
}

impl Envelope {
    /// Success envelope. A `null` result is sent as `{}` so `data` is always
    /// present on the wire.
    #[must_use]
    pub fn success(request_id: RequestId, data: Value) -> Self {
        let data = if data.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            data
        };
        Self {
            request_id,
            success: true,
            data: Some(data),
            error: None,
            timestamp: now_millis(),
        }
    }

    #[must_use]
    pub fn failure(request_id: RequestId, error: BridgeError) -> Self {
        Self {
            request_id,
            success: false,
            data: None,
            error: Some(error),
            timestamp: now_millis(),
        }
    }

    #[must_use]
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&BridgeError> {
        self.error.as_ref()
    }

    /// Completion time, milliseconds since the Unix epoch.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Splits the envelope into its outcome.
    ///
    /// # Errors
    ///
    /// Returns the carried [`BridgeError`] for failure envelopes.
    pub fn into_result(self) -> Result<Value, BridgeError> {
        match (self.data, self.error) {
            (Some(data), None) => Ok(data),
            (_, Some(error)) => Err(error),
            (None, None) => Err(BridgeError::internal("envelope carried neither data nor error")),
        }
    }

    /// Decodes the success data into `T`.
    ///
    /// # Errors
    ///
    /// Returns the carried error, or an `INTERNAL_ERROR` if the data does not
    /// match `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, BridgeError> {
        let data = self.into_result()?;
        serde_json::from_value(data).map_err(|err| {
            BridgeError::new(
                ErrorCode::InternalError,
                format!("unexpected response shape: {err}"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(s: &str) -> RequestId {
        RequestId::try_from(s.to_string()).unwrap()
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }

    #[test]
    fn empty_and_oversized_ids_are_rejected() {
        assert!(RequestId::try_from(String::new()).is_err());
        assert!(RequestId::try_from("x".repeat(MAX_REQUEST_ID_LEN + 1)).is_err());
        assert!(serde_json::from_value::<RequestId>(json!("")).is_err());
    }

    #[test]
    fn success_envelope_has_data_only() {
        let env = Envelope::success(id("a"), json!({"outputPath": "/x.webp"}));
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["requestId"], "a");
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn null_success_data_becomes_empty_object() {
        let env = Envelope::success(id("a"), Value::Null);
        assert_eq!(env.data(), Some(&json!({})));
    }

    #[test]
    fn failure_envelope_has_error_only() {
        let env = Envelope::failure(id("b"), BridgeError::validation("nope"));
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("data").is_none());
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[test]
    fn deserialization_rejects_mismatched_envelopes() {
        let both = json!({
            "requestId": "a", "success": true, "data": {},
            "error": {"code": "INTERNAL_ERROR", "message": "x"}, "timestamp": 1
        });
        let neither = json!({"requestId": "a", "success": false, "timestamp": 1});
        let inverted = json!({"requestId": "a", "success": false, "data": {}, "timestamp": 1});
        for bad in [both, neither, inverted] {
            assert!(serde_json::from_value::<Envelope>(bad).is_err());
        }
    }

    #[test]
    fn wire_round_trip_preserves_envelope() {
        let env = Envelope::failure(
            id("c"),
            BridgeError::new(ErrorCode::YoutubeInfoError, "blocked")
                .with_details(json!({"stage": "info"})),
        );
        let text = serde_json::to_string(&env).unwrap();
        let back: Envelope = serde_json::from_str(&text).unwrap();
        assert_eq!(back, env);
    }

    #[test]
    fn decode_returns_typed_data_or_error() {
        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Out {
            output_path: String,
        }
        let ok = Envelope::success(id("d"), json!({"outputPath": "/a.png"}));
        assert_eq!(ok.decode::<Out>().unwrap().output_path, "/a.png");

        let err = Envelope::failure(id("e"), BridgeError::validation("bad"));
        assert_eq!(err.decode::<Out>().unwrap_err().code, ErrorCode::ValidationError);
    }

    #[test]
    fn request_into_raw_keeps_id() {
        let req = Request::new(json!({"url": "https://x"}));
        let original = req.id.clone();
        let raw = req.into_raw().unwrap();
        assert_eq!(raw.id, original);
        assert_eq!(raw.payload["url"], "https://x");
    }
}
