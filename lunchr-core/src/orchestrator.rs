//! Concurrent fetch and parse of all selected sources.

use std::error::Error as StdError;
use std::fmt::Write as _;
use std::time::{Duration, Instant};

use encoding_rs::{Encoding, UTF_8};
use futures::future::join_all;
use reqwest::Client;

use crate::config::EngineConfig;
use crate::model::{FoodItem, ScrapedLunch, ScrapedSoup, SourceMenu};
use crate::normalize::{normalize_lunches, normalize_soup};
use crate::ports::{Capability, Document, ParseInput, SourceError};
use crate::registry::SourceDescriptor;

/// Runs every source on its own task and collects one [`SourceMenu`] per source.
///
/// A failing source never affects the others: its error ends up in the
/// `error` field of its own menu.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    client: Client,
    fetch_timeout: Duration,
}

impl Orchestrator {
    /// Build an orchestrator with a client configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Network`] when the HTTP client cannot be created.
    pub fn new(config: &EngineConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.fetch_timeout)
            .build()?;
        Ok(Self::with_client(client, config.fetch_timeout))
    }

    /// Build an orchestrator around an existing client.
    #[must_use]
    pub fn with_client(client: Client, fetch_timeout: Duration) -> Self {
        Self {
            client,
            fetch_timeout,
        }
    }

    /// Collect all `sources` concurrently.
    ///
    /// Always returns exactly one menu per source, in the order of `sources`.
    pub async fn gather(&self, sources: &[SourceDescriptor]) -> Vec<SourceMenu> {
        let started = Instant::now();
        let handles = sources.iter().cloned().map(|source| {
            let client = self.client.clone();
            let fetch_timeout = self.fetch_timeout;
            tokio::spawn(async move { collect(&client, fetch_timeout, &source).await })
        });
        let joined = join_all(handles).await;

        let menus: Vec<SourceMenu> = sources
            .iter()
            .zip(joined)
            .map(|(source, outcome)| match outcome {
                Ok(menu) => menu,
                Err(join_err) => {
                    let err = SourceError::Internal(join_err.to_string());
                    tracing::error!(source = %source.id, error = %err, "source task aborted");
                    failed_menu(source, &err)
                }
            })
            .collect();

        let failures = menus.iter().filter(|menu| menu.is_failed()).count();
        tracing::info!(
            sources = menus.len(),
            failures,
            elapsed_ms = started.elapsed().as_millis(),
            "aggregation finished"
        );
        menus
    }
}

async fn collect(client: &Client, fetch_timeout: Duration, source: &SourceDescriptor) -> SourceMenu {
    match try_collect(client, fetch_timeout, source).await {
        Ok(menu) => {
            tracing::info!(
                source = %source.id,
                soups = menu.soups.len(),
                lunches = menu.lunches.len(),
                fetch_ms = menu.elapsed_fetch.as_millis(),
                parse_ms = menu.elapsed_parse.as_millis(),
                "source collected"
            );
            menu
        }
        Err(err) => {
            tracing::warn!(source = %source.id, error = %err, "source failed");
            failed_menu(source, &err)
        }
    }
}

async fn try_collect(
    client: &Client,
    fetch_timeout: Duration,
    source: &SourceDescriptor,
) -> Result<SourceMenu, SourceError> {
    let mut input = ParseInput::default();

    let mut elapsed_fetch = Duration::ZERO;
    if source.needs_page() {
        let fetch_started = Instant::now();
        let body = fetch_page(client, fetch_timeout, source).await?;
        elapsed_fetch = fetch_started.elapsed();

        match (source.needs(Capability::Document), source.needs(Capability::RawText)) {
            (true, true) => {
                input.document = Some(Document::new(body.as_str()));
                input.raw_text = Some(body);
            }
            (true, false) => input.document = Some(Document::new(body)),
            _ => input.raw_text = Some(body),
        }
    }
    if source.needs(Capability::HttpClient) {
        input.client = Some(client.clone());
    }

    let parse_started = Instant::now();
    let items = source.parser.parse(input).await?;
    let elapsed_parse = parse_started.elapsed();

    let mut soups: Vec<ScrapedSoup> = Vec::new();
    let mut lunches: Vec<ScrapedLunch> = Vec::new();
    for item in items {
        match item {
            FoodItem::Soup(soup) => soups.push(soup),
            FoodItem::Lunch(lunch) => lunches.push(lunch),
        }
    }

    Ok(SourceMenu {
        id: source.id.clone(),
        title: source.title.clone(),
        url: source.url.clone(),
        location: source.location.clone(),
        soups: soups.iter().map(normalize_soup).collect(),
        lunches: normalize_lunches(&lunches),
        elapsed_fetch,
        elapsed_parse,
        error: None,
    })
}

async fn fetch_page(
    client: &Client,
    fetch_timeout: Duration,
    source: &SourceDescriptor,
) -> Result<String, SourceError> {
    let response = client
        .get(&source.url)
        .timeout(fetch_timeout)
        .send()
        .await?
        .error_for_status()?;
    let body = response.bytes().await?;
    Ok(decode_body(&body, source.charset))
}

/// Decode a page with the source's charset, whatever the server announces.
///
/// Unknown labels fall back to UTF-8; malformed sequences become U+FFFD.
fn decode_body(body: &[u8], charset: &str) -> String {
    let encoding = Encoding::for_label(charset.as_bytes()).unwrap_or(UTF_8);
    let (text, had_errors) = encoding.decode_with_bom_removal(body);
    if had_errors {
        tracing::debug!(charset = encoding.name(), "page contains malformed sequences");
    }
    text.into_owned()
}

/// Menu recorded for a source that could not be collected.
fn failed_menu(source: &SourceDescriptor, err: &SourceError) -> SourceMenu {
    SourceMenu {
        id: source.id.clone(),
        title: source.title.clone(),
        url: source.url.clone(),
        location: source.location.clone(),
        soups: Vec::new(),
        lunches: Vec::new(),
        elapsed_fetch: Duration::ZERO,
        elapsed_parse: Duration::ZERO,
        error: Some(error_chain(err)),
    }
}

/// Render an error with all of its causes, `outer: inner: root`.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        let text = inner.to_string();
        if !message.contains(&text) {
            let _ = write!(message, ": {text}");
        }
        cause = inner.source();
    }
    message
}

/// Orderings offered to presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Menus with items first, then empty ones, then failures.
    #[default]
    Failure,
    /// Fastest sources first.
    Elapsed,
    /// Alphabetical by title.
    Title,
}

/// Sort menus for display; ties keep their original order.
pub fn sort_menus(menus: &mut [SourceMenu], order: SortOrder) {
    match order {
        SortOrder::Failure => menus.sort_by_key(|menu| (menu.is_failed(), menu.is_empty())),
        SortOrder::Elapsed => menus.sort_by_key(SourceMenu::elapsed),
        SortOrder::Title => menus.sort_by_cached_key(|menu| menu.title.to_lowercase()),
    }
}
