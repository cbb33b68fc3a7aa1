//! Application state for the chat front-end.
//!
//! All of the mutable state the REPL works with lives in one explicit
//! struct, passed by reference into rendering code. Rendering reads it
//! immutably; mutation happens only through the named transition methods
//! here and in [`ChatWorkspace`](crate::chat::ChatWorkspace).

use crate::client::DEFAULT_MODEL;
use crate::types::{ChatMessage, FileAttachment, Session, SessionId, TurnMetadata};

/// The chat front-end's state: session cache, current-session pointer,
/// conversation log, staged attachments, and last-turn metadata.
#[derive(Debug, Default)]
pub struct ChatState {
    sessions: Vec<Session>,
    current: Option<SessionId>,
    current_model: Option<String>,
    messages: Vec<ChatMessage>,
    staged: Vec<FileAttachment>,
    last_turn: Option<TurnMetadata>,
}

impl ChatState {
    /// Creates empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached session list, as last fetched.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// The current session id, if one is open.
    pub fn current(&self) -> Option<SessionId> {
        self.current
    }

    /// The cached record of the current session.
    pub fn current_session(&self) -> Option<&Session> {
        let current = self.current?;
        self.sessions.iter().find(|s| s.id == current)
    }

    /// The model the current session is bound to, falling back to the
    /// service default.
    pub fn current_model(&self) -> &str {
        self.current_model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// The conversation log, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Attachments staged for the next turn.
    pub fn staged(&self) -> &[FileAttachment] {
        &self.staged
    }

    /// Metadata of the last completed turn.
    pub fn last_turn(&self) -> Option<&TurnMetadata> {
        self.last_turn.as_ref()
    }

    /// Replaces the session cache.
    pub fn replace_sessions(&mut self, sessions: Vec<Session>) {
        self.sessions = sessions;
        // The open session may have been deleted elsewhere.
        if let Some(current) = self.current
            && !self.sessions.iter().any(|s| s.id == current)
        {
            self.close_session();
        }
    }

    /// Opens a session, replacing the conversation log with its history.
    pub fn open_session(
        &mut self,
        session_id: SessionId,
        model: Option<String>,
        messages: Vec<ChatMessage>,
    ) {
        self.current = Some(session_id);
        self.current_model = model;
        self.messages = messages;
        self.staged.clear();
        self.last_turn = None;
    }

    /// Closes the current session and clears the log.
    pub fn close_session(&mut self) {
        self.current = None;
        self.current_model = None;
        self.messages.clear();
        self.staged.clear();
        self.last_turn = None;
    }

    /// Appends a message to the conversation log.
    pub fn push_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Replaces the conversation log (after a server-side reload).
    pub fn replace_messages(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    /// Stages an attachment for the next turn.
    pub fn stage_attachment(&mut self, attachment: FileAttachment) {
        self.staged.push(attachment);
    }

    /// Takes the staged attachments, leaving none behind.
    pub fn take_staged(&mut self) -> Vec<FileAttachment> {
        std::mem::take(&mut self.staged)
    }

    /// Drops all staged attachments.
    pub fn clear_staged(&mut self) {
        self.staged.clear();
    }

    /// Records the metadata of a completed turn.
    pub fn set_last_turn(&mut self, metadata: Option<TurnMetadata>) {
        self.last_turn = metadata;
    }

    /// Updates the cached name of a session after a successful rename.
    pub fn set_session_name(&mut self, session_id: SessionId, name: &str) {
        if let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) {
            session.name = Some(name.to_string());
        }
    }

    /// Updates the cached model of a session after a successful update.
    pub fn set_session_model(&mut self, session_id: SessionId, model: &str) {
        if let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) {
            session.model = Some(model.to_string());
        }
        if self.current == Some(session_id) {
            self.current_model = Some(model.to_string());
        }
    }

    /// Updates the cached pin flag after a successful toggle.
    pub fn set_session_pinned(&mut self, session_id: SessionId, pinned: bool) {
        if let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) {
            session.top_sort = Some(if pinned { 1 } else { 0 });
        }
    }

    /// The most recently created session, by the service's own timestamp
    /// ordering (the timestamp format sorts lexicographically).
    pub fn most_recent_session(&self) -> Option<&Session> {
        self.sessions
            .iter()
            .max_by(|a, b| a.created.cmp(&b.created))
    }

    /// The last assistant message that can be deleted server-side.
    pub fn last_deletable_record(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.record_id.is_some() && m.session_id.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session(id: u64, created: &str) -> Session {
        serde_json::from_value(json!({"id": id, "created": created})).unwrap()
    }

    #[test]
    fn replacing_sessions_closes_a_vanished_current() {
        let mut state = ChatState::new();
        state.replace_sessions(vec![session(1, "2026-08-01 08:00:00")]);
        state.open_session(1, None, Vec::new());
        assert_eq!(state.current(), Some(1));

        state.replace_sessions(vec![session(2, "2026-08-02 08:00:00")]);
        assert_eq!(state.current(), None);
        assert!(state.messages().is_empty());
    }

    #[test]
    fn most_recent_session_uses_created_order() {
        let mut state = ChatState::new();
        state.replace_sessions(vec![
            session(1, "2026-08-01 08:00:00"),
            session(3, "2026-08-03 08:00:00"),
            session(2, "2026-08-02 08:00:00"),
        ]);
        assert_eq!(state.most_recent_session().map(|s| s.id), Some(3));
    }

    #[test]
    fn staged_attachments_are_taken_once() {
        let mut state = ChatState::new();
        state.stage_attachment(FileAttachment::from_bytes("a.txt", b"a"));
        state.stage_attachment(FileAttachment::from_bytes("b.txt", b"b"));
        assert_eq!(state.take_staged().len(), 2);
        assert!(state.staged().is_empty());
    }

    #[test]
    fn last_deletable_record_skips_user_messages() {
        let mut state = ChatState::new();
        state.push_message(ChatMessage::user("q1"));
        let mut reply = ChatMessage::assistant("a1");
        reply.record_id = Some(10);
        reply.session_id = Some(1);
        state.push_message(reply);
        state.push_message(ChatMessage::user("q2"));
        assert_eq!(
            state.last_deletable_record().and_then(|m| m.record_id),
            Some(10)
        );
    }
}
