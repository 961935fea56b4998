use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::adapters::{AndroidAdapter, AppleAdapter};
use crate::clock::Delay;
use crate::config::{AndroidConfig, AppleStoreConfig};
use crate::dedup;
use crate::history::HistoryStore;
use crate::messages::{build_message, Presentation};
use crate::models::{HistoryWindow, ReviewRecord, Scope, StoreKind};
use crate::slack::{deliver_batch, Sender};
use crate::translate::Translator;

/// Counters for one scope's pass, for logging and tests
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScopeOutcome {
    pub fetched: usize,
    pub accepted: usize,
    pub delivered: usize,
}

/// Drives one scope at a time through fetch, dedup, formatting and delivery.
///
/// Scopes run strictly sequentially and share nothing but the history store,
/// which keys them disjointly. Fetch failures degrade the scope to "no new
/// reviews this run"; they never abort sibling scopes.
pub struct Orchestrator<H, S, T, D> {
    android: AndroidAdapter,
    apple: AppleAdapter,
    history: H,
    sender: S,
    translator: T,
    delay: D,
    translation_enabled: bool,
}

impl<H, S, T, D> Orchestrator<H, S, T, D>
where
    H: HistoryStore,
    S: Sender,
    T: Translator,
    D: Delay,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        android: AndroidAdapter,
        apple: AppleAdapter,
        history: H,
        sender: S,
        translator: T,
        delay: D,
        translation_enabled: bool,
    ) -> Self {
        Self {
            android,
            apple,
            history,
            sender,
            translator,
            delay,
            translation_enabled,
        }
    }

    /// Run the pipeline for one app's Play Store scope
    pub async fn run_android_scope(
        &self,
        app: &str,
        cfg: &AndroidConfig,
        token: &str,
    ) -> Result<ScopeOutcome> {
        let scope = Scope::new(app, cfg.language.clone(), StoreKind::Android);
        info!(scope = %scope, "Processing scope");

        let mut window = self.history.load(&scope)?;

        let reviews = match self.android.fetch(&scope, &cfg.package, token).await {
            Ok(reviews) => reviews,
            Err(e) => {
                warn!(scope = %scope, error = %e, "Fetch failed, no new reviews this run");
                self.history.save(&scope, &window)?;
                return Ok(ScopeOutcome::default());
            }
        };

        let now = Utc::now();
        let records: Vec<ReviewRecord> = reviews
            .iter()
            .filter_map(|r| AndroidAdapter::normalize(r, now))
            .collect();

        let presentation = Presentation {
            flag: cfg.flag.clone(),
            language: cfg.language.clone(),
            translate: self.translation_enabled && cfg.translate,
        };

        let outcome = self
            .process(
                &scope,
                records,
                &mut window,
                Some(&cfg.language),
                &presentation,
            )
            .await;

        self.history.save(&scope, &window)?;

        Ok(outcome)
    }

    /// Run the pipeline for one app's Apple storefront scope
    pub async fn run_apple_scope(&self, app: &str, cfg: &AppleStoreConfig) -> Result<ScopeOutcome> {
        let scope = Scope::new(app, cfg.name.clone(), cfg.kind);
        info!(scope = %scope, "Processing scope");

        let mut window = self.history.load(&scope)?;

        let entries = match self.apple.fetch(&scope, &cfg.app_id, cfg.store_id).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(scope = %scope, error = %e, "Fetch failed, no new reviews this run");
                self.history.save(&scope, &window)?;
                return Ok(ScopeOutcome::default());
            }
        };

        let now = Utc::now();
        let records: Vec<ReviewRecord> = entries
            .iter()
            .map(|e| AppleAdapter::normalize(e, now))
            .collect();

        let presentation = Presentation {
            flag: cfg.flag.clone(),
            language: cfg.language.clone(),
            translate: self.translation_enabled && cfg.translate,
        };

        // Storefront scoping already filtered by locale
        let outcome = self
            .process(&scope, records, &mut window, None, &presentation)
            .await;

        self.history.save(&scope, &window)?;

        Ok(outcome)
    }

    async fn process(
        &self,
        scope: &Scope,
        records: Vec<ReviewRecord>,
        window: &mut HistoryWindow,
        language_filter: Option<&str>,
        presentation: &Presentation,
    ) -> ScopeOutcome {
        let fetched = records.len();

        let accepted = dedup::filter_new(records, window, language_filter);

        if accepted.is_empty() {
            info!(scope = %scope, fetched, "No new reviews");
            return ScopeOutcome {
                fetched,
                accepted: 0,
                delivered: 0,
            };
        }

        let mut messages = Vec::with_capacity(accepted.len());
        for record in &accepted {
            messages
                .push(build_message(record, scope.kind, presentation, &self.translator, &self.delay).await);
        }

        let delivered = deliver_batch(&messages, scope, &self.sender, &self.delay).await;

        info!(
            scope = %scope,
            fetched,
            accepted = accepted.len(),
            delivered,
            "Scope complete"
        );

        ScopeOutcome {
            fetched,
            accepted: accepted.len(),
            delivered,
        }
    }
}
