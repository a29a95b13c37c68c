//! Registry of all known sources and their parse routines.

use std::fmt;
use std::sync::Arc;

use crate::model::{Location, SourceId};
use crate::ports::{Capability, MenuParser};

const DEFAULT_CHARSET: &str = "utf-8";

/// Static description of one source, registered at process start.
#[derive(Clone)]
pub struct SourceDescriptor {
    /// Unique identifier.
    pub id: SourceId,
    /// Display name of the restaurant.
    pub title: String,
    /// Page fetched for [`Capability::Document`] and [`Capability::RawText`].
    pub url: String,
    /// Location tag.
    pub location: Location,
    /// Inputs the orchestrator prepares before invoking the parser.
    pub required_inputs: Vec<Capability>,
    /// Charset used to decode the page; the server's `Content-Type` is ignored.
    pub charset: &'static str,
    /// Routine turning the inputs into menu items.
    pub parser: Arc<dyn MenuParser>,
}

impl SourceDescriptor {
    /// Describe a source that needs no inputs; add them with [`SourceDescriptor::requires`].
    #[must_use]
    pub fn new<I, T, U, L>(id: I, title: T, url: U, location: L, parser: Arc<dyn MenuParser>) -> Self
    where
        I: Into<String>,
        T: Into<String>,
        U: Into<String>,
        L: Into<String>,
    {
        Self {
            id: SourceId(id.into()),
            title: title.into(),
            url: url.into(),
            location: Location(location.into()),
            required_inputs: Vec::new(),
            charset: DEFAULT_CHARSET,
            parser,
        }
    }

    /// Declare the inputs the parser needs.
    #[must_use]
    pub fn requires(mut self, inputs: &[Capability]) -> Self {
        for input in inputs {
            if !self.required_inputs.contains(input) {
                self.required_inputs.push(*input);
            }
        }
        self
    }

    /// Decode the page with `charset` instead of UTF-8.
    #[must_use]
    pub fn with_charset(mut self, charset: &'static str) -> Self {
        self.charset = charset;
        self
    }

    /// Whether the parser declared the given input.
    #[must_use]
    pub fn needs(&self, input: Capability) -> bool {
        self.required_inputs.contains(&input)
    }

    /// Whether the orchestrator has to download the source page.
    #[must_use]
    pub fn needs_page(&self) -> bool {
        self.needs(Capability::Document) || self.needs(Capability::RawText)
    }
}

impl fmt::Debug for SourceDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SourceDescriptor")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("url", &self.url)
            .field("location", &self.location)
            .field("required_inputs", &self.required_inputs)
            .field("charset", &self.charset)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of sources.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<SourceDescriptor>,
}

impl SourceRegistry {
    /// Build a registry from the provided source list, keeping its order.
    ///
    /// A later descriptor with an id that is already registered is dropped.
    #[must_use]
    pub fn new(sources: Vec<SourceDescriptor>) -> Self {
        let mut unique: Vec<SourceDescriptor> = Vec::with_capacity(sources.len());
        for source in sources {
            if unique.iter().any(|known| known.id == source.id) {
                tracing::warn!(source = %source.id, "duplicate source id, ignoring");
                continue;
            }
            unique.push(source);
        }
        Self { sources: unique }
    }

    /// All registered sources.
    #[must_use]
    pub fn all(&self) -> &[SourceDescriptor] {
        &self.sources
    }

    /// Iterator over source identifiers.
    pub fn ids(&self) -> impl Iterator<Item = &SourceId> {
        self.sources.iter().map(|source| &source.id)
    }

    /// Number of registered sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether no source is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Look up a source by id.
    #[must_use]
    pub fn get(&self, id: &SourceId) -> Option<&SourceDescriptor> {
        self.sources.iter().find(|source| &source.id == id)
    }

    /// Sources whose id is in `allowed`, in registry order; `None` selects all.
    ///
    /// Unknown ids are ignored so partial runs can be typed by hand.
    #[must_use]
    pub fn select<S: AsRef<str>>(&self, allowed: Option<&[S]>) -> Vec<SourceDescriptor> {
        let Some(allowed) = allowed.filter(|ids| !ids.is_empty()) else {
            return self.sources.clone();
        };

        for id in allowed {
            if !self.sources.iter().any(|source| source.id.0 == id.as_ref()) {
                tracing::debug!(source = id.as_ref(), "unknown source id in allow-list");
            }
        }

        self.sources
            .iter()
            .filter(|source| allowed.iter().any(|id| id.as_ref() == source.id.0))
            .cloned()
            .collect()
    }

    /// A registry restricted to the allowed ids, see [`SourceRegistry::select`].
    #[must_use]
    pub fn restricted<S: AsRef<str>>(&self, allowed: Option<&[S]>) -> Self {
        Self {
            sources: self.select(allowed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::parse_fn;

    fn source(id: &str) -> SourceDescriptor {
        SourceDescriptor::new(id, id, "", "test", parse_fn(|_| Ok(Vec::new())))
    }

    fn registry() -> SourceRegistry {
        SourceRegistry::new(vec![source("a"), source("b"), source("c")])
    }

    fn ids(sources: &[SourceDescriptor]) -> Vec<&str> {
        sources.iter().map(|source| source.id.0.as_str()).collect()
    }

    #[test]
    fn select_without_allow_list_returns_everything() {
        let registry = registry();
        let empty: &[&str] = &[];
        assert_eq!(ids(&registry.select::<&str>(None)), ["a", "b", "c"]);
        assert_eq!(ids(&registry.select(Some(empty))), ["a", "b", "c"]);
    }

    #[test]
    fn select_keeps_registry_order_and_ignores_unknown_ids() {
        let registry = registry();
        let allowed: &[&str] = &["c", "nope", "a"];
        let selected = registry.select(Some(allowed));
        assert_eq!(ids(&selected), ["a", "c"]);
    }

    #[test]
    fn duplicate_ids_keep_the_first_registration() {
        let registry = SourceRegistry::new(vec![source("a"), source("a")]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn requires_deduplicates_capabilities() {
        let descriptor = source("a").requires(&[Capability::Document, Capability::Document]);
        assert_eq!(descriptor.required_inputs, [Capability::Document]);
        assert!(descriptor.needs_page());
        assert!(!descriptor.needs(Capability::HttpClient));
    }
}
