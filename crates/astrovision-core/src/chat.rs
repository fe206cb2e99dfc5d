//! Chat widget state: an append-only transcript and the client side of the relay.
//!
//! `send_message` appends the user turn before the request goes out and exactly one bot turn
//! when it settles. Failures become fixed fallback text, never an error. Sends are not
//! serialized: overlapping sends each get their reply, appended in arrival order.

use crate::error::RelayError;
use crate::export;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Bot text when the relay answered without a `response`.
pub const NO_RESPONSE_FALLBACK: &str = "Sorry, I couldn't respond.";
/// Bot text when the relay could not be reached or its body was unreadable.
pub const FAILURE_FALLBACK: &str = "Something went wrong.";

pub const SUGGESTIONS: [&str; 4] = [
    "When is the next ISS pass?",
    "Show upcoming meteor showers",
    "Explain Kp-index",
    "How do satellites help Earth?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn label(&self) -> &'static str {
        match self {
            Sender::User => "USER",
            Sender::Bot => "BOT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            timestamp: Utc::now(),
        }
    }
}

/// Body of a relay endpoint reply: `{response}` on success, `{error}` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Delivers one message to the relay endpoint.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn post(&self, message: &str) -> Result<RelayReply, RelayError>;
}

/// POSTs `{"message": ..}` to the gateway's `/api/chat`.
pub struct HttpRelayTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpRelayTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    async fn post(&self, message: &str) -> Result<RelayReply, RelayError> {
        let res = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        // Error statuses still carry a JSON body; the body decides the bot text.
        res.json::<RelayReply>()
            .await
            .map_err(|e| RelayError::Decode(e.to_string()))
    }
}

pub struct ChatRelay<T> {
    transport: T,
    transcript: Mutex<Vec<Turn>>,
    pending: AtomicUsize,
}

/// Decrements the pending counter even if the send future is dropped mid-flight.
struct PendingGuard<'a>(&'a AtomicUsize);

impl<'a> PendingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<T: RelayTransport> ChatRelay<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            transcript: Mutex::new(Vec::new()),
            pending: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Turn>> {
        self.transcript.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn push(&self, turn: Turn) {
        self.lock().push(turn);
    }

    /// Send trimmed `text`. Blank input is ignored and returns `None`; otherwise returns the
    /// bot turn that was appended.
    pub async fn send_message(&self, text: &str) -> Option<Turn> {
        let message = text.trim();
        if message.is_empty() {
            tracing::debug!(target: "astrovision::chat", "ignoring blank chat message");
            return None;
        }
        self.push(Turn::user(message));

        let reply = {
            let _pending = PendingGuard::enter(&self.pending);
            self.transport.post(message).await
        };

        let text = match reply {
            Ok(RelayReply {
                response: Some(r), ..
            }) if !r.is_empty() => r,
            Ok(RelayReply { error, .. }) => {
                tracing::warn!(target: "astrovision::chat", error = ?error, "relay answered without a response");
                NO_RESPONSE_FALLBACK.to_string()
            }
            Err(e) => {
                tracing::warn!(target: "astrovision::chat", error = %e, "relay call failed");
                FAILURE_FALLBACK.to_string()
            }
        };
        let bot = Turn::bot(text);
        self.push(bot.clone());
        Some(bot)
    }

    /// Send one of the canned [`SUGGESTIONS`]. Out-of-range indices are a no-op.
    pub async fn send_suggestion(&self, index: usize) -> Option<Turn> {
        let prompt = SUGGESTIONS.get(index)?;
        self.send_message(prompt).await
    }

    /// Empty the transcript. Replies still in flight land in the new transcript.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn turns(&self) -> Vec<Turn> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sends awaiting a reply. Consumers disable input while this is non-zero.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn is_pending(&self) -> bool {
        self.pending() > 0
    }

    pub fn export_text(&self) -> String {
        export::transcript_text(&self.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted {
        reply: Result<RelayReply, RelayError>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(RelayReply {
                    response: Some(text.to_string()),
                    error: None,
                }),
                calls: AtomicUsize::new(0),
            }
        }

        fn replying(reply: Result<RelayReply, RelayError>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RelayTransport for Scripted {
        async fn post(&self, _message: &str) -> Result<RelayReply, RelayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    /// Replies with the message upper-cased after a delay encoded in the message.
    struct Delayed;

    #[async_trait]
    impl RelayTransport for Delayed {
        async fn post(&self, message: &str) -> Result<RelayReply, RelayError> {
            let ms = if message.starts_with("slow") { 80 } else { 10 };
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(RelayReply {
                response: Some(message.to_uppercase()),
                error: None,
            })
        }
    }

    fn texts(relay: &ChatRelay<impl RelayTransport>) -> Vec<(Sender, String)> {
        relay.turns().into_iter().map(|t| (t.sender, t.text)).collect()
    }

    #[tokio::test]
    async fn blank_message_is_a_no_op() {
        let relay = ChatRelay::new(Scripted::ok("hi"));
        assert!(relay.send_message("   \n\t").await.is_none());
        assert!(relay.send_message("").await.is_none());
        assert!(relay.is_empty());
        assert_eq!(relay.transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn success_appends_user_then_bot() {
        let relay = ChatRelay::new(Scripted::ok("Kp measures geomagnetic activity."));
        let bot = relay.send_message("  Explain Kp-index ").await.expect("bot turn");
        assert_eq!(bot.sender, Sender::Bot);
        assert_eq!(
            texts(&relay),
            vec![
                (Sender::User, "Explain Kp-index".to_string()),
                (Sender::Bot, "Kp measures geomagnetic activity.".to_string()),
            ]
        );
        assert!(!relay.is_pending());
    }

    #[tokio::test]
    async fn error_body_yields_no_response_fallback() {
        let relay = ChatRelay::new(Scripted::replying(Ok(RelayReply {
            response: None,
            error: Some("Failed".into()),
        })));
        relay.send_message("hello").await;
        assert_eq!(relay.turns()[1].text, NO_RESPONSE_FALLBACK);

        let relay = ChatRelay::new(Scripted::ok(""));
        relay.send_message("hello").await;
        assert_eq!(relay.turns()[1].text, NO_RESPONSE_FALLBACK);
    }

    #[tokio::test]
    async fn transport_failure_yields_failure_fallback() {
        let relay = ChatRelay::new(Scripted::replying(Err(RelayError::Transport("refused".into()))));
        relay.send_message("hello").await;
        assert_eq!(
            texts(&relay),
            vec![
                (Sender::User, "hello".to_string()),
                (Sender::Bot, FAILURE_FALLBACK.to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn overlapping_sends_append_replies_in_arrival_order() {
        let relay = ChatRelay::new(Delayed);
        let (a, b) = tokio::join!(relay.send_message("slow one"), relay.send_message("fast one"));
        assert!(a.is_some() && b.is_some());
        assert_eq!(
            texts(&relay),
            vec![
                (Sender::User, "slow one".to_string()),
                (Sender::User, "fast one".to_string()),
                (Sender::Bot, "FAST ONE".to_string()),
                (Sender::Bot, "SLOW ONE".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn clear_during_pending_send_keeps_only_the_late_reply() {
        let relay = ChatRelay::new(Delayed);
        let clear_soon = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert!(relay.is_pending());
            relay.clear();
        };
        tokio::join!(relay.send_message("slow reply"), clear_soon);
        assert_eq!(texts(&relay), vec![(Sender::Bot, "SLOW REPLY".to_string())]);
    }

    #[tokio::test]
    async fn suggestions_are_sent_verbatim() {
        let relay = ChatRelay::new(Scripted::ok("ok"));
        relay.send_suggestion(2).await.expect("sent");
        assert_eq!(relay.turns()[0].text, "Explain Kp-index");
        assert!(relay.send_suggestion(99).await.is_none());
        assert_eq!(relay.len(), 2);
    }

    #[tokio::test]
    async fn export_covers_every_turn() {
        let relay = ChatRelay::new(Scripted::ok("pong"));
        relay.send_message("ping").await;
        let text = relay.export_text();
        assert!(text.contains("USER: ping"));
        assert!(text.contains("BOT: pong"));
        relay.clear();
        assert_eq!(relay.export_text(), "");
    }
}
