// Public modules
pub mod chat;
pub mod client;
pub mod completion_stream;
pub mod error;
pub mod observability;
pub mod prompt;
pub mod render;
pub mod sse;
pub mod thinking;
pub mod types;
pub mod utils;

// Re-exports
pub use client::{Achuan, DEFAULT_MODEL};
pub use completion_stream::CompletionStream;
pub use error::{Error, Result};
pub use prompt::{PromptRunConfig, PromptRunResult};
pub use render::{PlainTextRenderer, Renderer};
pub use thinking::{THINK_CLOSE, THINK_OPEN, ThinkingScanner, ThinkingSplit, split_thinking};
pub use types::*;
