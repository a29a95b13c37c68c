//! Small helpers shared by the HTML routines.

use chrono::{Datelike, Local, NaiveDate, Weekday};
use lunchr_core::SourceError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// A regex compiled on first use.
pub(crate) type Pattern = Lazy<Result<Regex, regex::Error>>;

/// Borrow a compiled [`Pattern`].
pub(crate) fn compiled(pattern: &'static Pattern) -> Result<&'static Regex, SourceError> {
    pattern
        .as_ref()
        .map_err(|err| SourceError::Internal(format!("invalid pattern: {err}")))
}

/// Compile a CSS selector.
pub(crate) fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|err| SourceError::Selector(format!("{css}: {err}")))
}

/// All text below `element`, concatenated.
pub(crate) fn text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// First element in the document matching `css`.
pub(crate) fn first<'doc>(html: &'doc Html, css: &str) -> Result<ElementRef<'doc>, SourceError> {
    html.select(&selector(css)?)
        .next()
        .ok_or_else(|| SourceError::MissingElement(css.to_owned()))
}

/// First element below `scope` matching `css`.
pub(crate) fn first_in<'doc>(
    scope: ElementRef<'doc>,
    css: &str,
) -> Result<ElementRef<'doc>, SourceError> {
    scope
        .select(&selector(css)?)
        .next()
        .ok_or_else(|| SourceError::MissingElement(css.to_owned()))
}

/// Whether `element` carries the class `name`.
pub(crate) fn has_class(element: ElementRef<'_>, name: &str) -> bool {
    element.value().classes().any(|class| class == name)
}

/// Today's date in local time.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Czech name of the weekday as restaurants print it.
pub(crate) fn day_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Pondělí",
        Weekday::Tue => "Úterý",
        Weekday::Wed => "Středa",
        Weekday::Thu => "Čtvrtek",
        Weekday::Fri => "Pátek",
        Weekday::Sat => "Sobota",
        Weekday::Sun => "Neděle",
    }
}
