//! La Strada prints its weekly menu as a table with one heading row per day.

use chrono::NaiveDate;
use scraper::Html;

use lunchr_core::{Capability, FoodItem, ScrapedLunch, SourceDescriptor, SourceError, parse_fn};

use crate::dom;

const URL: &str = "http://www.lastrada.cz/cz/?tpl=plugins/DailyMenu/print&week_shift=";
const WHOLE_WEEK: &str = "Menu na celý týden";

/// Descriptor of the La Strada source.
#[must_use]
pub fn source() -> SourceDescriptor {
    SourceDescriptor::new(
        "lastrada",
        "La Strada",
        URL,
        "Ostrava",
        parse_fn(|input| parse(&input.document()?.html(), dom::today())),
    )
    .requires(&[Capability::Document])
}

/// Highlighted rows under the heading of `day` and under the whole-week heading.
///
/// # Errors
///
/// Fails when a highlighted row has no name or price cell.
pub fn parse(html: &Html, day: NaiveDate) -> Result<Vec<FoodItem>, SourceError> {
    let heading = dom::day_name(day);

    let mut items: Vec<FoodItem> = Vec::new();
    let mut capturing = false;
    for tr in html.select(&dom::selector("tr")?) {
        if dom::has_class(tr, "day") {
            let text = dom::text(tr);
            capturing = text.contains(heading) || text.contains(WHOLE_WEEK);
        } else if capturing && dom::has_class(tr, "highlight") {
            let name = dom::text(dom::first_in(tr, "td")?);
            let price = dom::text(dom::first_in(tr, ".price")?);
            items.push(ScrapedLunch::new(name).with_price(price).into());
        }
    }
    Ok(items)
}
