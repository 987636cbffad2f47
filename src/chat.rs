//! Chat session controller for the assistant widget.
//!
//! A [`ChatSession`] lives exactly as long as the open widget. It owns the
//! transcript, the input line and the single in-flight request. The Gemini API
//! is stateless, so every request carries the hidden system instruction
//! followed by the whole conversation.

use std::sync::Arc;

use anyhow::Result;
use futures_util::future::{BoxFuture, FutureExt};
use tokio::task::{JoinError, JoinHandle};

use crate::gemini::{Content, GenerateContentRequest, GenerateContentResponse, Role};

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful and knowledgeable assistant for Coding University. \
Provide information about our programs, admissions, faculty, and general university life. \
Keep your responses concise and relevant to the university.";

pub const FALLBACK_REPLY: &str = "Sorry, I couldn't get a response. Please try again.";
pub const ERROR_REPLY: &str = "An error occurred while connecting to the assistant.";

/// Anything that can answer a `generateContent` request.
pub trait ChatBackend: Send + Sync {
    fn generate(
        &self,
        request: GenerateContentRequest,
    ) -> BoxFuture<'static, Result<GenerateContentResponse>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn role(self) -> Role {
        match self {
            Sender::User => Role::User,
            Sender::Bot => Role::Model,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: &str) -> Self {
        Self {
            sender: Sender::User,
            text: text.to_string(),
        }
    }

    pub fn bot(text: &str) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.to_string(),
        }
    }
}

type ReplyTask = JoinHandle<Result<GenerateContentResponse>>;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    system_instruction: String,
    messages: Vec<Message>,

    // Input line
    input: String,
    cursor: usize, // in chars

    pending: Option<ReplyTask>,

    // Transcript scroll: None follows the bottom
    scroll: Option<u16>,
    pub max_scroll: u16, // written by the renderer
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            messages: Vec::new(),
            input: String::new(),
            cursor: 0,
            pending: None,
            scroll: None,
            max_scroll: 0,
        }
    }

    /// Messages shown to the user, in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Outgoing payload for `text`: system turn, prior turns, then `text`.
    pub fn build_request(&self, text: &str) -> GenerateContentRequest {
        let mut contents = Vec::with_capacity(self.messages.len() + 2);
        contents.push(Content::user(&self.system_instruction));
        contents.extend(
            self.messages
                .iter()
                .map(|msg| Content::new(msg.sender.role(), &msg.text)),
        );
        contents.push(Content::user(text));
        GenerateContentRequest { contents }
    }

    /// Send `text` to the assistant.
    ///
    /// Returns `false` without touching any state when `text` is blank or a
    /// request is already in flight. Must be called within a tokio runtime.
    pub fn submit(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() || self.is_pending() {
            return false;
        }

        let request = self.build_request(text);
        self.messages.push(Message::user(text));
        self.input.clear();
        self.cursor = 0;
        self.scroll_to_bottom();

        tracing::debug!(turns = request.contents.len(), "sending chat request");
        let reply = self.backend.generate(request);
        self.pending = Some(tokio::spawn(reply));
        true
    }

    pub fn submit_input(&mut self) -> bool {
        let text = self.input.clone();
        self.submit(&text)
    }

    /// Apply the reply if the in-flight request has finished. Never blocks.
    pub fn poll_reply(&mut self) -> bool {
        let Some(task) = self.pending.as_mut() else {
            return false;
        };
        let Some(outcome) = task.now_or_never() else {
            return false;
        };
        self.pending = None;
        self.apply_outcome(outcome);
        true
    }

    /// Wait for the in-flight request and apply its reply.
    #[cfg(test)]
    pub async fn wait_for_reply(&mut self) -> bool {
        let Some(task) = self.pending.take() else {
            return false;
        };
        let outcome = task.await;
        self.apply_outcome(outcome);
        true
    }

    fn apply_outcome(&mut self, outcome: Result<Result<GenerateContentResponse>, JoinError>) {
        let reply = match outcome {
            Ok(Ok(response)) => match response.first_text() {
                Some(text) => text.to_string(),
                None => {
                    tracing::warn!(
                        candidates = response.candidates.len(),
                        "assistant returned no usable candidate"
                    );
                    FALLBACK_REPLY.to_string()
                }
            },
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Error calling Gemini API");
                ERROR_REPLY.to_string()
            }
            Err(e) => {
                tracing::error!(error = %e, "chat request task failed");
                ERROR_REPLY.to_string()
            }
        };

        self.messages.push(Message::bot(&reply));
        self.scroll_to_bottom();
    }

    // Input editing. The input is disabled while a request is pending.

    pub fn insert_char(&mut self, c: char) {
        if self.is_pending() {
            return;
        }
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.is_pending() || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.remove(byte_pos);
    }

    pub fn delete(&mut self) {
        if self.is_pending() {
            return;
        }
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        if !self.is_pending() {
            self.cursor = self.cursor.saturating_sub(1);
        }
    }

    pub fn cursor_right(&mut self) {
        if !self.is_pending() {
            self.cursor = (self.cursor + 1).min(self.input.chars().count());
        }
    }

    pub fn cursor_home(&mut self) {
        if !self.is_pending() {
            self.cursor = 0;
        }
    }

    pub fn cursor_end(&mut self) {
        if !self.is_pending() {
            self.cursor = self.input.chars().count();
        }
    }

    // Transcript scrolling

    pub fn scroll_offset(&self) -> u16 {
        self.scroll
            .map_or(self.max_scroll, |offset| offset.min(self.max_scroll))
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = None;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = Some(self.scroll_offset().saturating_sub(lines));
    }

    pub fn scroll_down(&mut self, lines: u16) {
        if let Some(offset) = self.scroll {
            let next = offset.saturating_add(lines);
            self.scroll = if next >= self.max_scroll { None } else { Some(next) };
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    #[derive(Clone)]
    pub(crate) enum Reply {
        Json(&'static str),
        Fail(&'static str),
        Gated(Arc<Notify>, &'static str),
        Panic,
        Never,
    }

    /// Records every request and answers with a canned reply.
    pub(crate) struct FakeBackend {
        reply: Reply,
        pub requests: Mutex<Vec<GenerateContentRequest>>,
    }

    impl FakeBackend {
        pub(crate) fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                requests: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl ChatBackend for FakeBackend {
        fn generate(
            &self,
            request: GenerateContentRequest,
        ) -> BoxFuture<'static, Result<GenerateContentResponse>> {
            self.requests.lock().unwrap().push(request);
            let reply = self.reply.clone();
            async move {
                match reply {
                    Reply::Json(body) => serde_json::from_str(body).map_err(anyhow::Error::from),
                    Reply::Fail(msg) => Err(anyhow!(msg)),
                    Reply::Gated(gate, body) => {
                        gate.notified().await;
                        serde_json::from_str(body).map_err(anyhow::Error::from)
                    }
                    Reply::Panic => panic!("backend exploded"),
                    Reply::Never => std::future::pending().await,
                }
            }
            .boxed()
        }
    }

    const HELLO: &str = r#"{"candidates":[{"content":{"parts":[{"text":"Hello!"}]}}]}"#;

    fn session(backend: &Arc<FakeBackend>) -> ChatSession {
        ChatSession::new(backend.clone())
    }

    fn texts(session: &ChatSession) -> Vec<(Sender, &str)> {
        session
            .messages()
            .iter()
            .map(|m| (m.sender, m.text.as_str()))
            .collect()
    }

    #[tokio::test]
    async fn test_submit_appends_trimmed_user_message_before_reply() {
        let backend = FakeBackend::new(Reply::Never);
        let mut chat = session(&backend);

        assert!(chat.submit("  What programs do you offer?  "));
        assert!(chat.is_pending());
        assert_eq!(
            texts(&chat),
            vec![(Sender::User, "What programs do you offer?")]
        );
    }

    #[tokio::test]
    async fn test_successful_reply_appends_bot_message() {
        let backend = FakeBackend::new(Reply::Json(HELLO));
        let mut chat = session(&backend);

        chat.submit("Hi");
        assert!(chat.wait_for_reply().await);

        assert!(!chat.is_pending());
        assert_eq!(
            texts(&chat),
            vec![(Sender::User, "Hi"), (Sender::Bot, "Hello!")]
        );
    }

    #[tokio::test]
    async fn test_empty_candidates_appends_fallback() {
        let backend = FakeBackend::new(Reply::Json(r#"{"candidates":[]}"#));
        let mut chat = session(&backend);

        chat.submit("Hi");
        chat.wait_for_reply().await;

        assert!(!chat.is_pending());
        assert_eq!(chat.messages().last(), Some(&Message::bot(FALLBACK_REPLY)));
    }

    #[tokio::test]
    async fn test_failed_request_appends_error_and_clears_pending() {
        let backend = FakeBackend::new(Reply::Fail("connection refused"));
        let mut chat = session(&backend);

        chat.submit("Hi");
        chat.wait_for_reply().await;

        assert!(!chat.is_pending());
        assert_eq!(chat.messages().last(), Some(&Message::bot(ERROR_REPLY)));
    }

    #[tokio::test]
    async fn test_parse_failure_appends_error() {
        let backend = FakeBackend::new(Reply::Json("<html>bad gateway</html>"));
        let mut chat = session(&backend);

        chat.submit("Hi");
        chat.wait_for_reply().await;

        assert_eq!(chat.messages().last(), Some(&Message::bot(ERROR_REPLY)));
    }

    #[tokio::test]
    async fn test_panicked_task_appends_error() {
        let backend = FakeBackend::new(Reply::Panic);
        let mut chat = session(&backend);

        chat.submit("Hi");
        chat.wait_for_reply().await;

        assert!(!chat.is_pending());
        assert_eq!(chat.messages().last(), Some(&Message::bot(ERROR_REPLY)));
    }

    #[tokio::test]
    async fn test_session_usable_after_error() {
        let backend = FakeBackend::new(Reply::Fail("timeout"));
        let mut chat = session(&backend);

        chat.submit("first");
        chat.wait_for_reply().await;
        assert!(chat.submit("second"));
        chat.wait_for_reply().await;

        assert_eq!(chat.messages().len(), 4);
        assert_eq!(backend.request_count(), 2);
    }

    #[tokio::test]
    async fn test_blank_submit_is_noop() {
        let backend = FakeBackend::new(Reply::Json(HELLO));
        let mut chat = session(&backend);

        assert!(!chat.submit(""));
        assert!(!chat.submit("   \t\n"));

        assert!(chat.messages().is_empty());
        assert!(!chat.is_pending());
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_submit_while_pending_is_noop() {
        let gate = Arc::new(Notify::new());
        let backend = FakeBackend::new(Reply::Gated(gate.clone(), HELLO));
        let mut chat = session(&backend);

        assert!(chat.submit("first"));
        assert!(!chat.submit("second"));
        assert_eq!(texts(&chat), vec![(Sender::User, "first")]);
        assert_eq!(backend.request_count(), 1);

        gate.notify_one();
        chat.wait_for_reply().await;
        assert_eq!(
            texts(&chat),
            vec![(Sender::User, "first"), (Sender::Bot, "Hello!")]
        );
    }

    #[tokio::test]
    async fn test_request_prepends_system_instruction_and_appends_new_text() {
        let backend = FakeBackend::new(Reply::Json(HELLO));
        let mut chat = session(&backend);

        chat.submit("Hi");
        chat.wait_for_reply().await;
        chat.submit("Tell me about tuition");

        let requests = backend.requests.lock().unwrap();
        let second = &requests[1];
        assert_eq!(
            second.contents,
            vec![
                Content::user(SYSTEM_INSTRUCTION),
                Content::user("Hi"),
                Content::model("Hello!"),
                Content::user("Tell me about tuition"),
            ]
        );
        // First request has no history besides the system turn.
        assert_eq!(requests[0].contents.len(), 2);
    }

    #[tokio::test]
    async fn test_system_instruction_never_in_transcript() {
        let backend = FakeBackend::new(Reply::Json(HELLO));
        let mut chat = session(&backend);

        chat.submit("Hi");
        chat.wait_for_reply().await;

        assert!(chat
            .messages()
            .iter()
            .all(|m| !m.text.contains(SYSTEM_INSTRUCTION)));
    }

    #[tokio::test]
    async fn test_poll_reply_waits_for_task() {
        let gate = Arc::new(Notify::new());
        let backend = FakeBackend::new(Reply::Gated(gate.clone(), HELLO));
        let mut chat = session(&backend);

        assert!(!chat.poll_reply());
        chat.submit("Hi");
        assert!(!chat.poll_reply());
        assert!(chat.is_pending());

        gate.notify_one();
        while !chat.poll_reply() {
            tokio::task::yield_now().await;
        }
        assert!(!chat.is_pending());
        assert_eq!(chat.messages().last(), Some(&Message::bot("Hello!")));
    }

    #[tokio::test]
    async fn test_submit_input_clears_buffer() {
        let backend = FakeBackend::new(Reply::Never);
        let mut chat = session(&backend);

        for c in "Hi there".chars() {
            chat.insert_char(c);
        }
        assert!(chat.submit_input());
        assert_eq!(chat.input(), "");
        assert_eq!(chat.cursor(), 0);
        assert_eq!(texts(&chat), vec![(Sender::User, "Hi there")]);
    }

    #[tokio::test]
    async fn test_input_disabled_while_pending() {
        let backend = FakeBackend::new(Reply::Never);
        let mut chat = session(&backend);

        chat.submit("Hi");
        chat.insert_char('x');
        chat.backspace();
        assert_eq!(chat.input(), "");
        assert_eq!(chat.cursor(), 0);
    }

    #[test]
    fn test_input_editing_is_utf8_safe() {
        let backend = FakeBackend::new(Reply::Never);
        let mut chat = session(&backend);

        for c in "héllo".chars() {
            chat.insert_char(c);
        }
        chat.cursor_left();
        chat.cursor_left();
        chat.cursor_left();
        chat.backspace();
        assert_eq!(chat.input(), "hllo");
        chat.cursor_home();
        chat.delete();
        assert_eq!(chat.input(), "llo");
        chat.cursor_end();
        chat.insert_char('!');
        assert_eq!(chat.input(), "llo!");
        chat.cursor_right();
        assert_eq!(chat.cursor(), 4);
    }

    #[test]
    fn test_scroll_follows_bottom_until_scrolled_up() {
        let backend = FakeBackend::new(Reply::Never);
        let mut chat = session(&backend);
        chat.max_scroll = 10;

        assert_eq!(chat.scroll_offset(), 10);
        chat.scroll_up(3);
        assert_eq!(chat.scroll_offset(), 7);
        chat.max_scroll = 12;
        assert_eq!(chat.scroll_offset(), 7);
        chat.scroll_down(10);
        assert_eq!(chat.scroll_offset(), 12);
        chat.max_scroll = 15;
        assert_eq!(chat.scroll_offset(), 15);
    }
}
