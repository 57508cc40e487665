pub mod render;
pub mod session;
pub mod transport;
pub mod types;

pub use render::{render_block, render_blocks, RenderedBlock, TableExport};
pub use session::{ChatSession, SubmitOutcome};
pub use transport::ChatTransport;
pub use types::{Block, ChatMessage, ChatRequest, ChatResponse, Chip, ChoiceItem, Role};
