//! Restaurace Ellas, one content module per weekday.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use lunchr_core::{
    Capability, FoodItem, ScrapedLunch, ScrapedSoup, SourceDescriptor, SourceError, parse_fn,
};

use crate::dom::{self, Pattern};

const URL: &str = "https://www.restauraceellas.cz/";

static LINE_BREAK: Pattern = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>"));
static TAG: Pattern = Lazy::new(|| Regex::new(r"<[^>]+>"));

/// Descriptor of the Ellas source.
#[must_use]
pub fn source() -> SourceDescriptor {
    SourceDescriptor::new(
        "ellas",
        "Ellas",
        URL,
        "Ostrava",
        parse_fn(|input| parse(&input.document()?.html(), dom::today())),
    )
    .requires(&[Capability::Document])
}

/// Items of the module headed by the name of `day`.
///
/// The first paragraph is the soup; every other one is
/// `1. Name<br>sides<br>price`.
///
/// # Errors
///
/// Fails when a selector cannot be compiled.
pub fn parse(html: &Html, day: NaiveDate) -> Result<Vec<FoodItem>, SourceError> {
    let line_break = dom::compiled(&LINE_BREAK)?;
    let tag = dom::compiled(&TAG)?;
    let heading = dom::selector("h3")?;
    let paragraph = dom::selector("p")?;

    let mut items: Vec<FoodItem> = Vec::new();
    for module in html.select(&dom::selector(".moduletable .custom")?) {
        let is_today = module
            .select(&heading)
            .next()
            .is_some_and(|h3| dom::text(h3).trim() == dom::day_name(day));
        if !is_today {
            continue;
        }

        let mut foods = module.select(&paragraph);
        if let Some(soup) = foods.next() {
            items.push(ScrapedSoup::new(dom::text(soup)).into());
        }
        for food in foods {
            let markup = food.inner_html();
            let parts: Vec<String> = line_break
                .split(&markup)
                .map(|part| tag.replace_all(part, "").into_owned())
                .collect();
            let Some(title) = parts.first() else {
                continue;
            };

            let mut lunch = match title.split_once('.') {
                Some((num, name)) => ScrapedLunch::new(name).with_num(num),
                None => ScrapedLunch::new(title.as_str()),
            };
            lunch.ingredients = parts.get(1).cloned();
            lunch.price = parts.get(2).map(|price| price.as_str().into());
            items.push(lunch.into());
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<div class="moduletable"><div class="custom">
  <h3>Pondělí</h3>
  <p>Dršťková polévka</p>
  <p>1. Hovězí guláš<br>houskový knedlík<br />139 Kč</p>
  <p>2. <strong>Losos</strong><br>bylinkové brambory<br>189 Kč</p>
</div></div>
<div class="moduletable"><div class="custom">
  <h3>Úterý</h3>
  <p>Kulajda</p>
</div></div>"#;

    #[test]
    fn paragraphs_of_the_day_are_read() {
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let items = parse(&Html::parse_document(PAGE), monday).unwrap();
        let expected: Vec<FoodItem> = vec![
            ScrapedSoup::new("Dršťková polévka").into(),
            ScrapedLunch::new(" Hovězí guláš")
                .with_num("1")
                .with_ingredients("houskový knedlík")
                .with_price("139 Kč")
                .into(),
            ScrapedLunch::new(" Losos")
                .with_num("2")
                .with_ingredients("bylinkové brambory")
                .with_price("189 Kč")
                .into(),
        ];
        assert_eq!(items, expected);
    }

    #[test]
    fn other_days_only_yield_their_soup() {
        let tuesday = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let items = parse(&Html::parse_document(PAGE), tuesday).unwrap();
        assert_eq!(items, vec![FoodItem::from(ScrapedSoup::new("Kulajda"))]);
    }
}
