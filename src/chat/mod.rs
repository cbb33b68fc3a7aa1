//! Chat application module for interactive conversations.
//!
//! This module provides a streaming REPL chat interface built on top of the
//! achuan client library. It supports:
//!
//! - Streaming responses with real-time token display
//! - ANSI-styled output for reasoning spans
//! - Slash commands for session control
//! - Server-side session management (create, open, rename, pin, delete)
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`state`]: the explicit application-state struct
//! - [`session`]: the workspace tying client and state together
//! - [`commands`]: slash command parsing and handling

mod commands;
mod config;
mod session;
mod state;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{ChatWorkspace, WorkspaceStats};
pub use state::ChatState;
