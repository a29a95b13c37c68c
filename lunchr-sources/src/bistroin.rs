//! Bistro IN publishes its delivery menu as Next.js page data.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde::Deserialize;

use lunchr_core::{
    Capability, FoodItem, ScrapedLunch, ScrapedSoup, SourceDescriptor, SourceError, parse_fn,
};

use crate::dom::{self, Pattern};

const URL: &str = "https://bistroin.choiceqr.com/delivery";
const SOUP_LABEL: &str = "Polévka k menu:";
/// Delivery prices include packaging; eating in is this much cheaper.
const DINE_IN_DISCOUNT: i64 = 5;

static NUMBERED: Pattern = Lazy::new(|| Regex::new(r"^\s*(?P<num>[0-9]+)\s*\.\s*(?P<name>.+)"));
static ALLERGENS: Pattern = Lazy::new(|| Regex::new(r"Al\. \(.+"));

#[derive(Debug, Deserialize)]
struct NextData {
    props: Props,
}

#[derive(Debug, Deserialize)]
struct Props {
    app: App,
}

#[derive(Debug, Deserialize)]
struct App {
    menu: Vec<MenuEntry>,
}

#[derive(Debug, Deserialize)]
struct MenuEntry {
    name: String,
    #[serde(default)]
    description: String,
    // in hellers
    price: i64,
}

/// Descriptor of the Bistro IN source.
#[must_use]
pub fn source() -> SourceDescriptor {
    SourceDescriptor::new(
        "bistroin",
        "Bistro IN",
        URL,
        "Ostrava",
        parse_fn(|input| parse(&input.document()?.html())),
    )
    .requires(&[Capability::Document])
}

/// Read the menu out of the embedded `__NEXT_DATA__` script.
///
/// # Errors
///
/// Fails when the script is missing or its JSON has an unexpected shape.
pub fn parse(html: &Html) -> Result<Vec<FoodItem>, SourceError> {
    let script = dom::first(html, "#__NEXT_DATA__")?;
    let data: NextData = serde_json::from_str(&dom::text(script))?;
    let numbered = dom::compiled(&NUMBERED)?;
    let allergens = dom::compiled(&ALLERGENS)?;

    let mut items: Vec<FoodItem> = Vec::new();
    for entry in data.props.app.menu {
        let price = entry.price / 100;
        if entry.name.contains(SOUP_LABEL) {
            let name = entry.name.split(':').nth(1).unwrap_or_default();
            items.push(ScrapedSoup::new(name).with_price(price).into());
            continue;
        }

        let Some(caps) = numbered.captures(&entry.name) else {
            continue;
        };
        let ingredients = allergens.replace(&entry.description, "");
        items.push(
            ScrapedLunch::new(&caps["name"])
                .with_num(&caps["num"])
                .with_price(price - DINE_IN_DISCOUNT)
                .with_ingredients(ingredients.into_owned())
                .into(),
        );
    }
    Ok(items)
}
