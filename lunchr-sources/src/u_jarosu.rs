//! U Jarosu lists the whole week, one block per day.

use chrono::NaiveDate;
use scraper::Html;

use lunchr_core::{
    Capability, FoodItem, ScrapedLunch, ScrapedSoup, SourceDescriptor, SourceError, parse_fn,
};

use crate::dom;

const URL: &str = "https://www.ujarosu.cz/cz/denni-menu/";

/// Descriptor of the U Jarosu source.
#[must_use]
pub fn source() -> SourceDescriptor {
    SourceDescriptor::new(
        "u_jarosu",
        "U Jarosu",
        URL,
        "Ostrava",
        parse_fn(|input| parse(&input.document()?.html(), dom::today())),
    )
    .requires(&[Capability::Document])
}

/// Items listed for `day`.
///
/// Each day block has a `.datum` heading like `19. 10. 2026` and a table of
/// paragraphs in groups of three: label, dish, price.
///
/// # Errors
///
/// Fails when a selector cannot be compiled or a day block has no date.
pub fn parse(html: &Html, day: NaiveDate) -> Result<Vec<FoodItem>, SourceError> {
    let wanted = day.format("%d. %m. %Y").to_string();
    let date = dom::selector(".datum")?;
    let cell = dom::selector(".tabulka p")?;

    let mut items: Vec<FoodItem> = Vec::new();
    for block in html.select(&dom::selector(".celyden")?) {
        let heading = block
            .select(&date)
            .next()
            .ok_or_else(|| SourceError::MissingElement(".datum".to_owned()))?;
        if dom::text(heading).trim() != wanted {
            continue;
        }

        let cells: Vec<String> = block
            .select(&cell)
            .map(|para| dom::text(para).trim().to_owned())
            .collect();
        for row in cells.chunks_exact(3) {
            let [label, name, price] = row else {
                continue;
            };
            if label == "Polévka" {
                items.push(ScrapedSoup::new(name.as_str()).into());
            } else {
                let num = label.split('.').next().unwrap_or_default();
                items.push(
                    ScrapedLunch::new(name.as_str())
                        .with_num(num)
                        .with_price(price.as_str())
                        .into(),
                );
            }
        }
    }
    Ok(items)
}
