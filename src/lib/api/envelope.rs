//! The `{status, data, message}` wrapper every backend response uses.
use reqwest::StatusCode;
use serde::Deserialize;

use super::error::ApiError;

#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope<T> {
    Success {
        data: Option<T>,
        #[serde(default)]
        message: Option<String>,
    },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

impl<T> Envelope<T> {
    /// Returns the payload, treating an absent `data` field as an error.
    pub fn into_data(self) -> Result<T, ApiError> {
        match self {
            Envelope::Success { data: Some(data), .. } => Ok(data),
            Envelope::Success { data: None, .. } => Err(ApiError::MissingData),
            Envelope::Error { message } => Err(ApiError::Rejected {
                message: message.unwrap_or_else(|| "request failed".to_owned()),
            }),
        }
    }

    /// Returns the server message of a success envelope, ignoring the payload.
    pub fn into_ack(self) -> Result<Option<String>, ApiError> {
        match self {
            Envelope::Success { message, .. } => Ok(message),
            Envelope::Error { message } => Err(ApiError::Rejected {
                message: message.unwrap_or_else(|| "request failed".to_owned()),
            }),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Maps a non-2xx response onto the error taxonomy.
///
/// 401 is handled by the caller since it has a side effect on the session.
pub fn classify_failure(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_owned()
        });
    if status.is_server_error() {
        ApiError::Server { status, message }
    } else {
        ApiError::Validation { status, message }
    }
}

/// Decodes a 2xx body into its envelope.
pub fn decode<T>(body: &str) -> Result<Envelope<T>, ApiError>
where
    T: for<'de> Deserialize<'de>,
{
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_with_data() {
        let env: Envelope<Vec<u32>> = decode(r#"{"status":"success","data":[1,2]}"#).unwrap();
        assert_eq!(env.into_data().unwrap(), vec![1, 2]);
    }

    #[test]
    fn success_without_data_is_missing_for_typed_calls() {
        let env: Envelope<Vec<u32>> = decode(r#"{"status":"success","message":"ok"}"#).unwrap();
        assert!(matches!(env.into_data(), Err(ApiError::MissingData)));
    }

    #[test]
    fn success_without_data_is_fine_as_ack() {
        let env: Envelope<serde_json::Value> =
            decode(r#"{"status":"success","message":"Saved"}"#).unwrap();
        assert_eq!(env.into_ack().unwrap(), Some("Saved".to_owned()));
    }

    #[test]
    fn error_envelope_is_rejected() {
        let env: Envelope<serde_json::Value> =
            decode(r#"{"status":"error","message":"Leave already processed"}"#).unwrap();
        match env.into_data() {
            Err(ApiError::Rejected { message }) => assert_eq!(message, "Leave already processed"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unknown_status_is_decode_error() {
        let res = decode::<serde_json::Value>(r#"{"status":"maybe"}"#);
        assert!(matches!(res, Err(ApiError::Decode(_))));
    }

    #[test]
    fn classify_client_and_server_errors() {
        match classify_failure(StatusCode::BAD_REQUEST, r#"{"status":"error","message":"bad term"}"#) {
            ApiError::Validation { status, message } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(message, "bad term");
            }
            other => panic!("unexpected {:?}", other),
        }
        match classify_failure(StatusCode::BAD_GATEWAY, "<html>oops</html>") {
            ApiError::Server { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
