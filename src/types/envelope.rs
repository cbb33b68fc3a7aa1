use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The response envelope the service wraps every JSON body in.
///
/// `code == 0` signals success; any other value is an application-level
/// failure described by `msg`. The `data` payload is absent on failures and
/// on acknowledgement-only endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Application status code; zero means success.
    pub code: i64,

    /// Service-provided message, usually only meaningful on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,

    /// The payload, present when the operation produced one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Unwraps the envelope into its payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] when `code != 0`, or a serialization error when
    /// a successful envelope unexpectedly carries no payload.
    pub fn into_result(self) -> Result<T> {
        if self.code != 0 {
            return Err(Error::api(
                self.code,
                self.msg.unwrap_or_else(|| "request failed".to_string()),
            ));
        }
        self.data.ok_or_else(|| {
            Error::serialization("response envelope is missing its data payload", None)
        })
    }

    /// Unwraps the envelope, discarding any payload.
    ///
    /// Used for endpoints that only acknowledge (update, delete).
    pub fn into_ack(self) -> Result<()> {
        if self.code != 0 {
            return Err(Error::api(
                self.code,
                self.msg.unwrap_or_else(|| "request failed".to_string()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope() {
        let env: Envelope<Vec<u64>> =
            serde_json::from_value(json!({"code": 0, "msg": "ok", "data": [1, 2]})).unwrap();
        assert_eq!(env.into_result().unwrap(), vec![1, 2]);
    }

    #[test]
    fn failure_envelope_carries_service_message() {
        let env: Envelope<Vec<u64>> =
            serde_json::from_value(json!({"code": 401, "msg": "token expired"})).unwrap();
        let err = env.into_result().unwrap_err();
        assert_eq!(err.to_string(), "token expired");
        assert_eq!(err.api_code(), Some(401));
    }

    #[test]
    fn ack_ignores_missing_data() {
        let env: Envelope<serde_json::Value> =
            serde_json::from_value(json!({"code": 0})).unwrap();
        assert!(env.into_ack().is_ok());
    }
}
