//! DK Poklad links a weekly PDF from its restaurant page.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

use lunchr_core::{
    Capability, Document, FoodItem, MenuParser, ParseInput, ScrapedLunch, ScrapedSoup,
    SourceDescriptor, SourceError,
};

use crate::dom::{self, Pattern};
use crate::extract::{ExtractFormat, extract_text};

const URL: &str = "https://dkpoklad.cz/restaurace/";
const SOUP_SEPARATOR: &str = " I ";

static LUNCH: Pattern = Lazy::new(|| {
    Regex::new(r"^\s*(?P<num>[0-9]+)\s*\.?\s*(?P<name>.*?) (?P<price>[0-9]+) Kč")
});

/// Downloads the linked PDF and reads the section of the current day.
struct Poklad;

#[async_trait]
impl MenuParser for Poklad {
    async fn parse(&self, input: ParseInput) -> Result<Vec<FoodItem>, SourceError> {
        let pdf_url = pdf_link(input.document()?)?;
        tracing::debug!(url = %pdf_url, "downloading weekly menu");

        let pdf = input
            .client()?
            .get(pdf_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let text = extract_text(&pdf, ExtractFormat::Pdf).await?;
        parse_text(&text, dom::today())
    }
}

/// Descriptor of the Poklad source.
#[must_use]
pub fn source() -> SourceDescriptor {
    SourceDescriptor::new("poklad", "Poklad", URL, "Ostrava", Arc::new(Poklad))
        .requires(&[Capability::Document, Capability::HttpClient])
}

/// Absolute URL of the menu PDF linked from the page.
fn pdf_link(page: &Document) -> Result<Url, SourceError> {
    let html = page.html();
    let link = dom::first(&html, ".restaurace-box .wp-block-file a")?;
    let href = link
        .value()
        .attr("href")
        .ok_or_else(|| SourceError::MissingElement("menu PDF link".to_owned()))?;
    Url::parse(URL)
        .and_then(|base| base.join(href))
        .map_err(|err| SourceError::Parse(format!("menu PDF link {href}: {err}")))
}

/// Day heading as printed in the PDF, e.g. `19 I 10`.
fn day_marker(day: NaiveDate) -> Result<Regex, SourceError> {
    Regex::new(&format!(r"\b{} I {}\b", day.day(), day.month()))
        .map_err(|err| SourceError::Internal(err.to_string()))
}

/// Items between the heading of `day` and the heading of the following day.
///
/// The first line after the heading holds the soups separated by ` I `; a
/// lunch starts with its number and ends with its price, and longer names wrap
/// onto the following lines.
pub fn parse_text(text: &str, day: NaiveDate) -> Result<Vec<FoodItem>, SourceError> {
    let lunch = dom::compiled(&LUNCH)?;
    let today = day_marker(day)?;
    let tomorrow = day.succ_opt().map(day_marker).transpose()?;

    let mut items: Vec<FoodItem> = Vec::new();
    let mut capturing = false;
    let mut soups_pending = true;
    let mut current: Option<ScrapedLunch> = None;
    for line in text.lines() {
        if !capturing {
            capturing = today.is_match(line);
            continue;
        }
        if tomorrow.as_ref().is_some_and(|marker| marker.is_match(line)) {
            break;
        }
        if soups_pending {
            if line.trim().is_empty() {
                continue;
            }
            soups_pending = false;
            items.extend(
                line.split(SOUP_SEPARATOR)
                    .map(|soup| ScrapedSoup::new(soup).into()),
            );
            continue;
        }

        if let Some(caps) = lunch.captures(line) {
            if let Some(done) = current.take() {
                items.push(done.into());
            }
            current = Some(
                ScrapedLunch::new(&caps["name"])
                    .with_num(&caps["num"])
                    .with_price(&caps["price"]),
            );
        } else if let Some(open) = current.as_mut() {
            open.name.push(' ');
            open.name.push_str(line.trim());
        }
    }
    if let Some(done) = current {
        items.push(done.into());
    }
    Ok(items)
}
