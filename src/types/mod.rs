// Public modules
pub mod attachment;
pub mod chat_message;
pub mod chat_record;
pub mod envelope;
pub mod generation_params;
pub mod model_entry;
pub mod session;
pub mod session_update;
pub mod stream_frame;
pub mod turn_metadata;

// Re-exports
pub use attachment::{AttachmentRef, FileAttachment};
pub use chat_message::{ChatMessage, MessageRole};
pub use chat_record::{ChatRecord, RecordPage};
pub use envelope::Envelope;
pub use generation_params::GenerationParams;
pub use model_entry::{MODEL_FAMILIES, ModelCatalog, ModelEntry};
pub use session::{Session, SessionId};
pub use session_update::SessionUpdate;
pub use stream_frame::{StatsFrame, StreamFrame};
pub use turn_metadata::TurnMetadata;
