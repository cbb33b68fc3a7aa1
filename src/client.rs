use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Serialize;
use serde_json::{Map, Value};
use std::env;
use std::time::Duration;

use crate::completion_stream::CompletionStream;
use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS, STREAM_STARTS};
use crate::sse::process_frames;
use crate::types::{
    Envelope, FileAttachment, GenerationParams, ModelCatalog, RecordPage, Session, SessionId,
    SessionUpdate,
};

const DEFAULT_API_URL: &str = "https://achuanai.vip/api";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Model used when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

/// User-Agent the service's web client sends; the API rejects unadorned
/// clients, so we present the same identity.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36 Edg/143.0.0.0";
const ORIGIN: &str = "https://achuanai.vip";
const REFERER: &str = "https://achuanai.vip/chat";
const APP_VERSION: &str = "2.14.0";

/// Client for the Achuan AI chat service.
///
/// Wraps the service's session CRUD, chat history, model catalog, and
/// streaming completion endpoints. The client tracks one current session,
/// mirroring the service's single-conversation interaction model; requests
/// are made one at a time and never retried.
#[derive(Debug, Clone)]
pub struct Achuan {
    token: String,
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
    session_id: Option<SessionId>,
    params: GenerationParams,
}

impl Achuan {
    /// Create a new client.
    ///
    /// The bearer token can be provided directly or read from the
    /// `ACHUAN_TOKEN` environment variable. A missing token is not an error
    /// here; operations fail individually until one is supplied with
    /// [`set_token`](Self::set_token).
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_options(token, None, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        token: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let token = token
            .or_else(|| env::var("ACHUAN_TOKEN").ok())
            .unwrap_or_default();
        let base_url = base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        url::Url::parse(&base_url)
            .map_err(|e| Error::url(format!("invalid base URL '{base_url}': {e}"), Some(e)))?;
        let base_url = base_url.trim_end_matches('/').to_string();

        // No client-wide timeout: it would also cap completion streams,
        // which have no deadline. Non-streaming requests set it per call.
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            token,
            client,
            base_url,
            timeout,
            session_id: None,
            params: GenerationParams::new(),
        })
    }

    /// Replaces the bearer token.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    /// Returns true if a token is currently set.
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// The session subsequent completions stream into.
    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    /// Points the client at a session (or at none).
    pub fn set_session(&mut self, session_id: Option<SessionId>) {
        self.session_id = session_id;
    }

    /// The generation parameters sent with every request that accepts them.
    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Replaces the generation parameters.
    pub fn set_params(&mut self, params: GenerationParams) {
        self.params = params;
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&self.token)
                .unwrap_or_else(|_| HeaderValue::from_static("")),
        );
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        headers.insert(header::ORIGIN, HeaderValue::from_static(ORIGIN));
        headers.insert(header::REFERER, HeaderValue::from_static(REFERER));
        headers.insert("x-app-version", HeaderValue::from_static(APP_VERSION));
        headers
    }

    /// Fails fast when no token is set, before any network traffic.
    fn ensure_token(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(Error::authentication(
                "API token not set; pass one or set ACHUAN_TOKEN",
            ));
        }
        Ok(())
    }

    /// Maps reqwest request failures into the transport error taxonomy.
    fn map_request_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Reads a JSON envelope out of a successful response.
    async fn read_envelope<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<Envelope<T>> {
        if !response.status().is_success() {
            return Err(Error::http(response.status().as_u16()));
        }
        response.json::<Envelope<T>>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    async fn get_envelope<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<Envelope<T>> {
        self.ensure_token()?;
        CLIENT_REQUESTS.click();
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .headers(self.default_headers())
            .send()
            .await
            .map_err(|e| {
                CLIENT_REQUEST_ERRORS.click();
                self.map_request_error(e)
            })?;
        Self::read_envelope(response).await
    }

    /// Create a new session bound to the given model.
    ///
    /// On success the client points at the new session and its id is
    /// returned.
    pub async fn create_session(&mut self, model: &str) -> Result<SessionId> {
        self.ensure_token()?;
        CLIENT_REQUESTS.click();

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct CreateParams<'a> {
            model: &'a str,
            plugins: [Value; 0],
            mcp: [Value; 0],
            #[serde(flatten)]
            params: &'a GenerationParams,
        }

        #[derive(serde::Deserialize)]
        struct Created {
            id: SessionId,
        }

        let url = format!("{}/chat/session", self.base_url);
        let payload = CreateParams {
            model,
            plugins: [],
            mcp: [],
            params: &self.params,
        };
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .headers(self.default_headers())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                CLIENT_REQUEST_ERRORS.click();
                self.map_request_error(e)
            })?;

        let created: Created = Self::read_envelope(response).await?.into_result()?;
        self.session_id = Some(created.id);
        Ok(created.id)
    }

    /// List the account's sessions.
    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        let url = format!("{}/chat/session", self.base_url);
        self.get_envelope::<Vec<Session>>(&url).await?.into_result()
    }

    /// Fetch one page of chat records for a session, newest first.
    pub async fn chat_records(&self, session_id: SessionId, page: u32) -> Result<RecordPage> {
        let url = format!("{}/chat/record/{session_id}?page={page}", self.base_url);
        self.get_envelope::<RecordPage>(&url).await?.into_result()
    }

    /// Fetch the model catalog.
    pub async fn model_catalog(&self) -> Result<ModelCatalog> {
        let url = format!("{}/chat/tmpl", self.base_url);
        self.get_envelope::<ModelCatalog>(&url).await?.into_result()
    }

    /// Update fields of a session (name, model, pin flag).
    ///
    /// The service's PUT endpoint replaces the whole record, so `current`
    /// must be the session as last fetched: its fields are echoed back, the
    /// client's generation parameters are forced over the server's stale
    /// copies, and `update` wins over both.
    pub async fn update_session(
        &self,
        session_id: SessionId,
        update: &SessionUpdate,
        current: &Session,
    ) -> Result<()> {
        self.ensure_token()?;
        CLIENT_REQUESTS.click();

        let mut payload = match serde_json::to_value(current)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in self.params.sync_entries() {
            payload.insert(key, value);
        }
        update.apply_to(&mut payload);

        let url = format!("{}/chat/session/{session_id}", self.base_url);
        let response = self
            .client
            .put(&url)
            .timeout(self.timeout)
            .headers(self.default_headers())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                CLIENT_REQUEST_ERRORS.click();
                self.map_request_error(e)
            })?;

        Self::read_envelope::<Value>(response).await?.into_ack()
    }

    /// Flip a session's pin flag.
    pub async fn toggle_session_pin(&self, current: &Session) -> Result<bool> {
        let pinned = !current.is_pinned();
        self.update_session(current.id, &SessionUpdate::pinned(pinned), current)
            .await?;
        Ok(pinned)
    }

    /// Delete a session.
    pub async fn delete_session(&self, session_id: SessionId) -> Result<()> {
        self.ensure_token()?;
        CLIENT_REQUESTS.click();

        let url = format!("{}/chat/session/{session_id}", self.base_url);
        let response = self
            .client
            .delete(&url)
            .timeout(self.timeout)
            .headers(self.default_headers())
            .send()
            .await
            .map_err(|e| {
                CLIENT_REQUEST_ERRORS.click();
                self.map_request_error(e)
            })?;

        Self::read_envelope::<Value>(response).await?.into_ack()
    }

    /// Delete one chat record (a full user/assistant turn).
    pub async fn delete_chat_record(
        &self,
        record_id: u64,
        session_id: SessionId,
        task_id: Option<&str>,
    ) -> Result<()> {
        self.ensure_token()?;
        CLIENT_REQUESTS.click();

        let mut url = format!(
            "{}/chat/record?cid={record_id}&sid={session_id}",
            self.base_url
        );
        if let Some(task_id) = task_id.filter(|t| !t.is_empty()) {
            url.push_str("&taskId=");
            url.push_str(task_id);
        }

        let response = self
            .client
            .delete(&url)
            .timeout(self.timeout)
            .headers(self.default_headers())
            .send()
            .await
            .map_err(|e| {
                CLIENT_REQUEST_ERRORS.click();
                self.map_request_error(e)
            })?;

        if !response.status().is_success() {
            return Err(Error::http(response.status().as_u16()));
        }
        // This endpoint sometimes answers 200 with a non-JSON body; that
        // still counts as a successful delete.
        let body = response.text().await.map_err(|e| {
            Error::http_client(format!("Failed to read response: {}", e), Some(Box::new(e)))
        })?;
        match serde_json::from_str::<Envelope<Value>>(&body) {
            Ok(envelope) => envelope.into_ack(),
            Err(_) => Ok(()),
        }
    }

    /// Stream a completion into the current session.
    ///
    /// The returned stream is lazy, finite, and non-restartable. A missing
    /// token, a missing session (no network call is made in either case),
    /// and transport errors all arrive as a single `Err` item followed by
    /// the end of the stream, so the consumer has exactly one path to
    /// handle.
    pub async fn stream_completion(
        &self,
        text: &str,
        files: Vec<FileAttachment>,
    ) -> CompletionStream {
        if let Err(e) = self.ensure_token() {
            return CompletionStream::failed(e);
        }
        let Some(session_id) = self.session_id else {
            return CompletionStream::failed(Error::validation(
                "no session selected; create or open one first",
                Some("session".to_string()),
            ));
        };

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct CompletionParams<'a> {
            session_id: SessionId,
            text: &'a str,
            files: Vec<FileAttachment>,
            #[serde(flatten)]
            params: &'a GenerationParams,
        }

        let url = format!("{}/chat/completions", self.base_url);
        let payload = CompletionParams {
            session_id,
            text,
            files,
            params: &self.params,
        };

        let mut headers = self.default_headers();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );

        CLIENT_REQUESTS.click();
        let response = match self
            .client
            .post(&url)
            .headers(headers)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                CLIENT_REQUEST_ERRORS.click();
                return CompletionStream::failed(self.map_request_error(e));
            }
        };

        if !response.status().is_success() {
            return CompletionStream::failed(Error::http(response.status().as_u16()));
        }

        STREAM_STARTS.click();
        CompletionStream::new(process_frames(response.bytes_stream()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn tokenless_client() -> Achuan {
        // An explicit empty token keeps the environment out of the test.
        Achuan::new(Some(String::new())).unwrap()
    }

    #[test]
    fn client_creation() {
        let client = Achuan::new(Some("test-token".to_string())).unwrap();
        assert!(client.has_token());
        assert_eq!(client.base_url, DEFAULT_API_URL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);
        assert!(client.session_id().is_none());

        let client = Achuan::with_options(
            Some("test-token".to_string()),
            Some("https://example.com/api/".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://example.com/api");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = Achuan::with_options(
            Some("t".to_string()),
            Some("not a url".to_string()),
            None,
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn create_session_without_token_makes_no_request() {
        // The default base URL would fail DNS slowly if a request were
        // attempted; the authentication error must come back immediately.
        let mut client = tokenless_client();
        let err = client.create_session(DEFAULT_MODEL).await.unwrap_err();
        assert!(err.is_authentication());
    }

    #[tokio::test]
    async fn list_sessions_without_token_fails_up_front() {
        let client = tokenless_client();
        assert!(client.list_sessions().await.unwrap_err().is_authentication());
    }

    #[tokio::test]
    async fn stream_without_session_yields_single_error() {
        let mut client = tokenless_client();
        client.set_token("test-token");
        let mut stream = client.stream_completion("hi", Vec::new()).await;
        let first = stream.next().await.expect("one synthetic item");
        assert!(first.unwrap_err().is_validation());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn stream_without_token_yields_single_error() {
        let client = tokenless_client();
        let mut stream = client.stream_completion("hi", Vec::new()).await;
        let first = stream.next().await.expect("one synthetic item");
        assert!(first.unwrap_err().is_authentication());
        assert!(stream.next().await.is_none());
    }
}
