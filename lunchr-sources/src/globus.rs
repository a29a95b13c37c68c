//! Globus hypermarket restaurant, a single table of today's dishes.

use scraper::Html;

use lunchr_core::{
    Capability, FoodItem, ScrapedLunch, ScrapedSoup, SourceDescriptor, SourceError, parse_fn,
};

use crate::dom;

const URL: &str = "https://www.globus.cz/ostrava/nabidka/restaurace.html";
/// The table mixes soups and mains; anything pricier than this is a main.
const SOUP_PRICE_LIMIT: u32 = 50;

/// Descriptor of the Globus source.
#[must_use]
pub fn source() -> SourceDescriptor {
    SourceDescriptor::new(
        "globus",
        "Globus",
        URL,
        "Ostrava",
        parse_fn(|input| parse(&input.document()?.html())),
    )
    .requires(&[Capability::Document])
}

/// Read the menu table; rows are `weight | name | price`.
///
/// # Errors
///
/// Fails when the menu table is missing.
pub fn parse(html: &Html) -> Result<Vec<FoodItem>, SourceError> {
    let table = dom::first(html, ".restaurant__menu-food-table")?;
    let row = dom::selector("tr")?;
    let cell = dom::selector("td")?;

    let mut items: Vec<FoodItem> = Vec::new();
    for tr in table.select(&row) {
        let cells: Vec<String> = tr.select(&cell).map(dom::text).collect();
        let Some(name) = cells.get(1) else {
            continue;
        };
        let price = cells.get(2).map(|text| text.replace(",–", ""));
        let amount = price.as_deref().and_then(|text| text.trim().parse::<u32>().ok());

        if amount.is_some_and(|amount| amount > SOUP_PRICE_LIMIT) {
            let mut lunch = ScrapedLunch::new(name.as_str());
            lunch.price = price.map(Into::into);
            items.push(lunch.into());
        } else {
            let mut soup = ScrapedSoup::new(name.as_str());
            soup.price = price.map(Into::into);
            items.push(soup.into());
        }
    }
    Ok(items)
}
