//! AstroVision core library.
//! Feed adapters, field resolution, per-page view state, downloads, and the chat relay.

pub mod chat;
pub mod completion;
pub mod config;
pub mod error;
pub mod export;
pub mod feeds;
pub mod fields;
pub mod view;

pub use chat::{ChatRelay, HttpRelayTransport, RelayReply, RelayTransport, Sender, Turn, SUGGESTIONS};
pub use completion::{ChatCompletionClient, CompletionBackend};
pub use config::AstroConfig;
pub use error::{CompletionError, ConfigError, FetchError, FetchResult, RelayError, ValidationError};
pub use feeds::{Feed, FeedClient};
pub use view::{FeedEnvelope, FeedState, SortOrder, Ticket};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
