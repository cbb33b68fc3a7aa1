//! Core chat workspace management.
//!
//! This module provides the `ChatWorkspace` struct which ties the API client
//! to the application state and implements the operations the REPL exposes:
//! connecting, session CRUD, history loading, and streaming turns.

use futures::StreamExt;
use time::Date;

use crate::chat::state::ChatState;
use crate::client::Achuan;
use crate::error::{Error, Result};
use crate::render::Renderer;
use crate::thinking::ThinkingScanner;
use crate::types::{
    AttachmentRef, ChatMessage, FileAttachment, ModelCatalog, Session, SessionId, SessionUpdate,
};
use crate::utils::time::{day_label, today};

/// A chat workspace that manages application state and API interactions.
///
/// One request is in flight at a time; every operation is terminal on
/// failure and must be re-triggered by the user.
pub struct ChatWorkspace {
    client: Achuan,
    state: ChatState,
    default_model: String,
}

/// Aggregated stats for a workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceStats {
    /// The open session, if any.
    pub session_id: Option<SessionId>,
    /// Its display name.
    pub session_name: Option<String>,
    /// The model completions currently stream from.
    pub model: String,
    /// Messages in the conversation log.
    pub message_count: usize,
    /// Attachments staged for the next turn.
    pub staged_attachments: usize,
    /// Completion tokens of the last turn, if one finished.
    pub last_turn_tokens: Option<u32>,
    /// Whether a token is configured.
    pub has_token: bool,
}

impl ChatWorkspace {
    /// Creates a workspace around a client.
    pub fn new(client: Achuan, default_model: impl Into<String>) -> Self {
        Self {
            client,
            state: ChatState::new(),
            default_model: default_model.into(),
        }
    }

    /// Read access to the application state.
    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// Replaces the API token.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.client.set_token(token);
    }

    /// Loads the session list and opens the most recent session.
    ///
    /// Returns the opened session's name, or `None` when the account has no
    /// sessions yet.
    pub async fn connect(&mut self) -> Result<Option<String>> {
        self.refresh_sessions().await?;
        let Some(recent) = self.state.most_recent_session() else {
            return Ok(None);
        };
        let id = recent.id;
        let name = recent.display_name().to_string();
        self.open_session(id).await?;
        Ok(Some(name))
    }

    /// Refetches the session list.
    pub async fn refresh_sessions(&mut self) -> Result<()> {
        let sessions = self.client.list_sessions().await?;
        self.state.replace_sessions(sessions);
        Ok(())
    }

    /// Creates a session and makes it current.
    pub async fn new_session(&mut self, model: Option<&str>) -> Result<SessionId> {
        let model = model.unwrap_or(&self.default_model).to_string();
        let id = self.client.create_session(&model).await?;
        // Best effort: a stale list is corrected on the next refresh.
        let _ = self.refresh_sessions().await;
        self.client.set_session(Some(id));
        self.state.open_session(id, Some(model), Vec::new());
        Ok(id)
    }

    /// Opens a session and loads its first page of history.
    ///
    /// Returns the number of records loaded.
    pub async fn open_session(&mut self, session_id: SessionId) -> Result<usize> {
        let model = self
            .state
            .sessions()
            .iter()
            .find(|s| s.id == session_id)
            .and_then(|s| s.model.clone());
        let page = self.client.chat_records(session_id, 1).await?;
        let count = page.records.len();
        // Records arrive newest first; the log reads oldest first.
        let messages: Vec<ChatMessage> = page
            .records
            .iter()
            .rev()
            .flat_map(ChatMessage::from_record)
            .collect();
        self.client.set_session(Some(session_id));
        self.state.open_session(session_id, model, messages);
        Ok(count)
    }

    /// Renames the current session.
    pub async fn rename_current(&mut self, name: &str) -> Result<()> {
        let current = self.current_session_record()?;
        self.client
            .update_session(current.id, &SessionUpdate::rename(name), &current)
            .await?;
        self.state.set_session_name(current.id, name);
        Ok(())
    }

    /// Toggles the current session's pin flag. Returns the new state.
    pub async fn toggle_pin_current(&mut self) -> Result<bool> {
        let current = self.current_session_record()?;
        let pinned = self.client.toggle_session_pin(&current).await?;
        self.state.set_session_pinned(current.id, pinned);
        Ok(pinned)
    }

    /// Rebinds the current session to another model.
    pub async fn change_model(&mut self, model: &str) -> Result<()> {
        let current = self.current_session_record()?;
        self.client
            .update_session(current.id, &SessionUpdate::model(model), &current)
            .await?;
        self.state.set_session_model(current.id, model);
        Ok(())
    }

    /// Deletes a session; the current one when `session_id` is `None`.
    pub async fn delete_session(&mut self, session_id: Option<SessionId>) -> Result<SessionId> {
        let id = match session_id.or_else(|| self.state.current()) {
            Some(id) => id,
            None => {
                return Err(Error::validation(
                    "no session selected; create or open one first",
                    Some("session".to_string()),
                ));
            }
        };
        self.client.delete_session(id).await?;
        if self.state.current() == Some(id) {
            self.client.set_session(None);
            self.state.close_session();
        }
        let _ = self.refresh_sessions().await;
        Ok(id)
    }

    /// Deletes a chat record (the last assistant reply when `record_id` is
    /// `None`), then reloads the history so the log matches the server.
    ///
    /// Returns the number of records remaining.
    pub async fn delete_record(&mut self, record_id: Option<u64>) -> Result<usize> {
        let (cid, sid, task_id) = match record_id {
            Some(cid) => {
                let Some(sid) = self.state.current() else {
                    return Err(Error::validation(
                        "no session selected; create or open one first",
                        Some("session".to_string()),
                    ));
                };
                (cid, sid, None)
            }
            None => {
                let Some(message) = self.state.last_deletable_record() else {
                    return Err(Error::validation(
                        "no deletable reply in this conversation",
                        Some("record".to_string()),
                    ));
                };
                let (Some(cid), Some(sid)) = (message.record_id, message.session_id) else {
                    return Err(Error::validation(
                        "reply is missing its delete identifiers",
                        Some("record".to_string()),
                    ));
                };
                (cid, sid, message.task_id.clone())
            }
        };
        self.client
            .delete_chat_record(cid, sid, task_id.as_deref())
            .await?;
        self.reload_history().await
    }

    /// Refetches the current session's history, replacing the log.
    pub async fn reload_history(&mut self) -> Result<usize> {
        let Some(session_id) = self.state.current() else {
            return Err(Error::validation(
                "no session selected; create or open one first",
                Some("session".to_string()),
            ));
        };
        let page = self.client.chat_records(session_id, 1).await?;
        let count = page.records.len();
        let messages: Vec<ChatMessage> = page
            .records
            .iter()
            .rev()
            .flat_map(ChatMessage::from_record)
            .collect();
        self.state.replace_messages(messages);
        Ok(count)
    }

    /// Stages a file for the next message.
    pub fn attach(&mut self, path: &str) -> Result<String> {
        let attachment = FileAttachment::from_path(path)?;
        let name = attachment.name.clone();
        self.state.stage_attachment(attachment);
        Ok(name)
    }

    /// Drops all staged attachments.
    pub fn clear_attachments(&mut self) {
        self.state.clear_staged();
    }

    /// Fetches the model catalog.
    pub async fn model_catalog(&self) -> Result<ModelCatalog> {
        self.client.model_catalog().await
    }

    /// The session list grouped for display: pinned sessions first, then by
    /// day, newest group first.
    pub fn sessions_by_day(&self) -> Vec<(String, Vec<&Session>)> {
        group_sessions(self.state.sessions(), today())
    }

    /// Sends a user message and streams the response.
    ///
    /// This method:
    /// 1. Appends the user message (with staged attachments) to the log
    /// 2. Streams the completion, splitting reasoning from answer text
    /// 3. Renders committed chunks as they arrive
    /// 4. Folds the finished reply into the log with its token count
    ///
    /// A partial reply that arrived before a failure stays in the log, since
    /// the server recorded it; the error is still returned.
    pub async fn send_streaming(
        &mut self,
        text: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        if self.state.current().is_none() {
            return Err(Error::validation(
                "no session selected; create or open one first",
                Some("session".to_string()),
            ));
        }

        let files = self.state.take_staged();
        let file_refs: Vec<AttachmentRef> = files
            .iter()
            .map(|f| AttachmentRef {
                name: f.name.clone(),
                url: None,
            })
            .collect();
        self.state
            .push_message(ChatMessage::user(text).with_files(file_refs));

        let mut stream = self.client.stream_completion(text, files).await;
        let mut scanner = ThinkingScanner::new();
        let mut raw = String::new();
        let mut shown_answer = 0usize;
        let mut shown_thinking = 0usize;
        let mut failure: Option<Error> = None;

        while let Some(item) = stream.next().await {
            if renderer.should_interrupt() {
                renderer.print_interrupted();
                break;
            }
            match item {
                Ok(chunk) => {
                    raw.push_str(&chunk);
                    scanner.push(&chunk);
                    render_progress(&scanner, renderer, &mut shown_answer, &mut shown_thinking);
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        scanner.finish();
        render_progress(&scanner, renderer, &mut shown_answer, &mut shown_thinking);
        renderer.finish_response();

        let metadata = stream.metadata().cloned();
        if !raw.is_empty() {
            let mut reply = ChatMessage::assistant(raw).with_tokens(stream.tokens_used());
            reply.record_id = metadata.as_ref().and_then(|m| m.id);
            reply.session_id = self.state.current();
            reply.updated = metadata.as_ref().and_then(|m| m.updated.clone());
            reply.model = Some(self.state.current_model().to_string());
            self.state.push_message(reply);
        }
        self.state.set_last_turn(metadata);

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Returns the current workspace statistics snapshot.
    pub fn stats(&self) -> WorkspaceStats {
        WorkspaceStats {
            session_id: self.state.current(),
            session_name: self
                .state
                .current_session()
                .map(|s| s.display_name().to_string()),
            model: self.state.current_model().to_string(),
            message_count: self.state.messages().len(),
            staged_attachments: self.state.staged().len(),
            last_turn_tokens: self.state.last_turn().and_then(|m| m.completion_tokens),
            has_token: self.client.has_token(),
        }
    }

    fn current_session_record(&self) -> Result<Session> {
        self.state.current_session().cloned().ok_or_else(|| {
            Error::validation(
                "no session selected; create or open one first",
                Some("session".to_string()),
            )
        })
    }
}

/// Prints the newly committed portions of the scanner's views.
///
/// Committed text never retracts, so the renderer only ever sees each byte
/// once; text still ambiguous (a possible marker prefix at the tail) is held
/// back until the next chunk or the end of the stream.
fn render_progress(
    scanner: &ThinkingScanner,
    renderer: &mut dyn Renderer,
    shown_answer: &mut usize,
    shown_thinking: &mut usize,
) {
    let committed = scanner.committed();
    let thinking = committed.thinking_text();
    if thinking.len() > *shown_thinking {
        renderer.print_thinking(&thinking[*shown_thinking..]);
        *shown_thinking = thinking.len();
    }
    if committed.answer.len() > *shown_answer {
        renderer.print_text(&committed.answer[*shown_answer..]);
        *shown_answer = committed.answer.len();
    }
}

/// Groups sessions for display: pinned sessions lead, the rest bucket by the
/// day they were created, newest first.
fn group_sessions(sessions: &[Session], today: Date) -> Vec<(String, Vec<&Session>)> {
    let mut pinned: Vec<&Session> = Vec::new();
    let mut rest: Vec<&Session> = Vec::new();
    for session in sessions {
        if session.is_pinned() {
            pinned.push(session);
        } else {
            rest.push(session);
        }
    }
    rest.sort_by(|a, b| b.created.cmp(&a.created));

    let mut groups: Vec<(String, Vec<&Session>)> = Vec::new();
    if !pinned.is_empty() {
        groups.push(("Pinned".to_string(), pinned));
    }
    for session in rest {
        let label = session
            .created
            .as_deref()
            .and_then(|created| day_label(created, today))
            .unwrap_or_else(|| "Undated".to_string());
        match groups.last_mut() {
            Some((last, members)) if *last == label => members.push(session),
            _ => groups.push((label, vec![session])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PlainTextRenderer;
    use serde_json::json;
    use time::macros::date;

    fn session(id: u64, created: &str, pinned: bool) -> Session {
        serde_json::from_value(json!({
            "id": id,
            "created": created,
            "topSort": if pinned { 1 } else { 0 }
        }))
        .unwrap()
    }

    fn workspace_without_token() -> ChatWorkspace {
        let client = Achuan::new(Some(String::new())).unwrap();
        ChatWorkspace::new(client, "gemini-3-pro-preview")
    }

    #[test]
    fn grouping_puts_pinned_first_then_days_newest_first() {
        let today = date!(2026 - 08 - 06);
        let sessions = vec![
            session(1, "2026-08-05 08:00:00", false),
            session(2, "2026-08-06 09:00:00", false),
            session(3, "2026-08-01 10:00:00", true),
            session(4, "2026-08-06 07:00:00", false),
        ];
        let groups = group_sessions(&sessions, today);
        let labels: Vec<&str> = groups.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["Pinned", "Today", "Yesterday"]);
        assert_eq!(groups[0].1[0].id, 3);
        let today_ids: Vec<u64> = groups[1].1.iter().map(|s| s.id).collect();
        assert_eq!(today_ids, vec![2, 4]);
    }

    #[test]
    fn grouping_handles_missing_timestamps() {
        let today = date!(2026 - 08 - 06);
        let sessions = vec![serde_json::from_value(json!({"id": 9})).unwrap()];
        let groups = group_sessions(&sessions, today);
        assert_eq!(groups[0].0, "Undated");
    }

    #[tokio::test]
    async fn send_without_session_fails_fast() {
        let mut workspace = workspace_without_token();
        let mut renderer = PlainTextRenderer::with_color(false);
        let err = workspace
            .send_streaming("hello", &mut renderer)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        // Nothing was appended to the log.
        assert!(workspace.state().messages().is_empty());
    }

    #[tokio::test]
    async fn delete_record_without_history_fails_fast() {
        let mut workspace = workspace_without_token();
        let err = workspace.delete_record(None).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn stats_reflect_state() {
        let workspace = workspace_without_token();
        let stats = workspace.stats();
        assert!(stats.session_id.is_none());
        assert_eq!(stats.message_count, 0);
        assert!(!stats.has_token);
        assert_eq!(stats.model, "gemini-3-pro-preview");
    }
}
