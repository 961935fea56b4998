pub mod adapters;
pub mod clock;
pub mod config;
pub mod dedup;
pub mod error;
pub mod history;
pub mod messages;
pub mod models;
pub mod orchestrator;
pub mod slack;
pub mod translate;

pub use adapters::{AndroidAdapter, AppleAdapter};
pub use clock::{Delay, NoDelay, TokioDelay};
pub use config::Config;
pub use error::{FetchError, SendError, TranslateError};
pub use history::{HistoryStore, JsonHistoryStore};
pub use models::*;
pub use orchestrator::{Orchestrator, ScopeOutcome};
pub use slack::{Sender, SlackWebhookSender};
pub use translate::{GoogleTranslator, Translator};
