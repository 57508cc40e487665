use crate::api::client::CsvDownload;
use crate::chat::transport::ChatTransport;
use crate::chat::types::{Block, ChatMessage, ChatRequest};
use std::sync::Arc;

/// Placeholder content recorded for the assistant's side of a turn; the
/// actual content lives in the block list.
const ASSISTANT_PLACEHOLDER: &str = "[blocks]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The turn completed and `blocks` now holds the new response.
    Sent,
    /// Empty input or a request already in flight; nothing changed.
    Ignored,
    /// The send failed; prior history and blocks are untouched and
    /// `last_error` holds a user-facing message.
    Failed,
}

/// Single source of truth for one chat conversation.
///
/// History is strictly append-ordered; the block list reflects only the most
/// recent turn (each response replaces it wholesale). At most one chat
/// request is in flight at a time; a second submission while pending is
/// dropped, not queued.
pub struct ChatSession {
    transport: Arc<dyn ChatTransport>,
    thread_id: Option<String>,
    history: Vec<ChatMessage>,
    blocks: Vec<Block>,
    pending: bool,
    last_error: Option<String>,
    cvr_hint: Option<String>,
    years_hint: Option<Vec<u16>>,
}

impl ChatSession {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            thread_id: None,
            history: Vec::new(),
            blocks: Vec::new(),
            pending: false,
            last_error: None,
            cvr_hint: None,
            years_hint: None,
        }
    }

    /// Attach optional UI hints carried on every request of this session.
    pub fn with_hints(mut self, cvr: Option<String>, years: Option<Vec<u16>>) -> Self {
        self.cvr_hint = cvr;
        self.years_hint = years;
        self
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Send one user turn. Whitespace-only input and re-entrant calls are
    /// no-ops. On failure the pre-call history and blocks survive untouched;
    /// the in-flight flag is cleared on every exit path.
    pub async fn submit(&mut self, text: &str) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() || self.pending {
            return SubmitOutcome::Ignored;
        }
        self.pending = true;

        let mut candidate = self.history.clone();
        candidate.push(ChatMessage::user(text));
        let request = ChatRequest {
            thread_id: self.thread_id.clone(),
            messages: candidate.clone(),
            cvr: self.cvr_hint.clone(),
            years: self.years_hint.clone(),
        };

        let outcome = match self.transport.send_chat(&request).await {
            Ok(response) => {
                candidate.push(ChatMessage::assistant(ASSISTANT_PLACEHOLDER));
                self.thread_id = Some(response.thread_id);
                self.history = candidate;
                self.blocks = response.blocks;
                self.last_error = None;
                SubmitOutcome::Sent
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat turn failed");
                self.last_error = Some(err.user_message());
                SubmitOutcome::Failed
            }
        };
        self.pending = false;
        outcome
    }

    /// Selecting a choice forwards its id as if the user typed it, letting
    /// the server lock onto a specific entity.
    pub async fn select_choice(&mut self, id: &str) -> SubmitOutcome {
        self.submit(id).await
    }

    /// Export the current thread as CSV. No-op when no thread exists yet;
    /// a failed export surfaces through `last_error`.
    pub async fn export_current_thread(&mut self) -> Option<CsvDownload> {
        let thread_id = self.thread_id.clone()?;
        match self.transport.export_csv(&thread_id).await {
            Ok(download) => Some(download),
            Err(err) => {
                tracing::warn!(error = %err, "thread export failed");
                self.last_error = Some(err.user_message());
                None
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn force_pending(&mut self) {
        self.pending = true;
    }
}
