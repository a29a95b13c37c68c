//! The parse-routine contract and the inputs the orchestrator hands to it.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Error as ReqwestError;
use scraper::Html;
use serde_json::Error as JsonError;

use crate::model::FoodItem;

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while collecting a single source.
pub enum SourceError {
    /// Network layer failed or the site answered with an error status.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// An element the routine relies on is not on the page.
    #[error("Missing element: {0}")]
    MissingElement(String),
    /// A CSS selector failed to compile.
    #[error("Invalid selector: {0}")]
    Selector(String),
    /// Embedded JSON could not be decoded.
    #[error("Invalid JSON: {0}")]
    Json(#[from] JsonError),
    /// Page content did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),
    /// External text extraction (PDF or OCR) failed or returned nothing.
    #[error("Text extraction failed: {0}")]
    Extraction(String),
    /// Local I/O, e.g. spawning an extraction tool.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The routine asked for an input it did not declare.
    #[error("Input not provided: {0}")]
    MissingInput(Capability),
    /// The unit of work for the source panicked or was cancelled.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Inputs a parse routine can ask the orchestrator for.
pub enum Capability {
    /// The source page, ready to be queried with CSS selectors.
    Document,
    /// The source page as decoded text.
    RawText,
    /// The shared HTTP client, for routines issuing their own requests.
    HttpClient,
}

impl fmt::Display for Capability {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Document => "document",
            Capability::RawText => "raw text",
            Capability::HttpClient => "http client",
        };
        write!(formatter, "{name}")
    }
}

#[derive(Debug, Clone)]
/// A fetched HTML page.
///
/// The DOM is built on demand with [`Document::html`], so routines can hold the
/// page across `.await` points and only keep the tree inside synchronous code.
pub struct Document {
    body: String,
}

impl Document {
    /// Wrap a decoded page body.
    #[must_use]
    pub fn new<S: Into<String>>(body: S) -> Self {
        Self { body: body.into() }
    }

    /// Parse the page into a queryable DOM tree.
    #[must_use]
    pub fn html(&self) -> Html {
        Html::parse_document(&self.body)
    }

    /// The decoded page body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

#[derive(Debug, Clone, Default)]
/// Inputs handed to a parse routine, populated according to its declared capabilities.
pub struct ParseInput {
    /// Present when [`Capability::Document`] was declared.
    pub document: Option<Document>,
    /// Present when [`Capability::RawText`] was declared.
    pub raw_text: Option<String>,
    /// Present when [`Capability::HttpClient`] was declared.
    pub client: Option<Client>,
}

impl ParseInput {
    /// The fetched page.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingInput`] when the source did not declare it.
    pub fn document(&self) -> Result<&Document, SourceError> {
        self.document
            .as_ref()
            .ok_or(SourceError::MissingInput(Capability::Document))
    }

    /// The fetched page as text.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingInput`] when the source did not declare it.
    pub fn raw_text(&self) -> Result<&str, SourceError> {
        self.raw_text
            .as_deref()
            .ok_or(SourceError::MissingInput(Capability::RawText))
    }

    /// The shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingInput`] when the source did not declare it.
    pub fn client(&self) -> Result<&Client, SourceError> {
        self.client
            .as_ref()
            .ok_or(SourceError::MissingInput(Capability::HttpClient))
    }
}

#[async_trait]
/// A source-specific routine turning fetched inputs into menu items.
pub trait MenuParser: Send + Sync {
    /// Produce the items of today's menu in the order the source lists them.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when the page cannot be interpreted or a
    /// request issued by the routine itself fails.
    async fn parse(&self, input: ParseInput) -> Result<Vec<FoodItem>, SourceError>;
}

/// Adapter running a synchronous routine as a [`MenuParser`].
pub struct SyncParser<F>(pub F);

#[async_trait]
impl<F> MenuParser for SyncParser<F>
where
    F: Fn(&ParseInput) -> Result<Vec<FoodItem>, SourceError> + Send + Sync,
{
    async fn parse(&self, input: ParseInput) -> Result<Vec<FoodItem>, SourceError> {
        (self.0)(&input)
    }
}

/// Wrap a synchronous routine so it can be registered as a source.
pub fn parse_fn<F>(routine: F) -> Arc<dyn MenuParser>
where
    F: Fn(&ParseInput) -> Result<Vec<FoodItem>, SourceError> + Send + Sync + 'static,
{
    Arc::new(SyncParser(routine))
}
