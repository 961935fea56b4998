use serde::{Deserialize, Serialize};

/// Default number of history entries retained per scope. 50 is the maximum
/// number of reviews on a single page of the Apple feed, so 60 leaves headroom.
pub const DEFAULT_HISTORY_CAP: usize = 60;

/// Store family a scope belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Android,
    Ios,
    Macos,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Android => "android",
            StoreKind::Ios => "ios",
            StoreKind::Macos => "macos",
        }
    }

    /// Apple-family stores share the titled message layout
    pub fn is_apple_family(&self) -> bool {
        matches!(self, StoreKind::Ios | StoreKind::Macos)
    }

    /// Emoji shown as the bot icon when posting for this store
    pub fn icon_emoji(&self) -> String {
        format!(":{}:", self.as_str())
    }
}

impl std::str::FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "android" => Ok(StoreKind::Android),
            "ios" => Ok(StoreKind::Ios),
            "macos" => Ok(StoreKind::Macos),
            other => Err(format!("unknown store kind: {}", other)),
        }
    }
}

/// A single (application, store/locale) pairing, tracked independently for
/// history and delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub app: String,
    pub store: String,
    pub kind: StoreKind,
}

impl Scope {
    pub fn new(app: impl Into<String>, store: impl Into<String>, kind: StoreKind) -> Self {
        Self {
            app: app.into(),
            store: store.into(),
            kind,
        }
    }

    /// Key used to name the per-scope history file
    pub fn key(&self) -> String {
        format!("{}_{}_{}", self.app, self.store, self.kind.as_str())
    }

    /// Filename for the raw-payload debugging dump
    pub fn artifact_name(&self) -> String {
        format!("{}_{}_output.json", self.store, self.kind.as_str())
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({})", self.app, self.store, self.kind.as_str())
    }
}

/// Normalized representation of one user review regardless of source provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Stable per-provider identifier; the sole dedup key
    pub id: String,
    pub author: String,
    pub version: String,
    /// Already-formatted display date. The Apple feed carries no usable
    /// timestamp, so Apple records show the ingestion date instead.
    pub date: String,
    /// Raw provider rating; clamped to [0, 5] at render time
    pub star_rating: i64,
    /// Present only for Apple-family reviews
    pub title: Option<String>,
    pub body: String,
    pub permalink: String,
    /// Reviewer language, present only for Android reviews. The Apple feed is
    /// already locale-scoped by store front.
    pub language: Option<String>,
}

/// Trimmed projection of a review retained purely for future dedup checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub author: String,
    pub body: String,
    pub permalink: String,
}

impl From<&ReviewRecord> for HistoryEntry {
    fn from(record: &ReviewRecord) -> Self {
        Self {
            id: record.id.clone(),
            author: record.author.clone(),
            body: record.body.clone(),
            permalink: record.permalink.clone(),
        }
    }
}

/// Bounded, FIFO-trimmed ledger of previously delivered review ids for one scope
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    entries: Vec<HistoryEntry>,
    cap: usize,
}

impl HistoryWindow {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: Vec::new(),
            cap,
        }
    }

    pub fn from_entries(entries: Vec<HistoryEntry>, cap: usize) -> Self {
        Self { entries, cap }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Evict the oldest entries until the window is back at its cap.
    /// Returns how many entries were removed.
    pub fn trim(&mut self) -> usize {
        if self.entries.len() <= self.cap {
            return 0;
        }
        let excess = self.entries.len() - self.cap;
        self.entries.drain(..excess);
        excess
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

/// A formatted review ready for posting, with its optional translated follow-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    pub text: String,
    pub translated: Option<String>,
}
