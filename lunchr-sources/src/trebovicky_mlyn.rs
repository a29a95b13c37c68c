//! Třebovický mlýn shows the daily menu in a carousel on its home page.

use scraper::Html;

use lunchr_core::{
    Capability, FoodItem, ScrapedLunch, ScrapedSoup, SourceDescriptor, SourceError, parse_fn,
};

use crate::dom;

const URL: &str = "https://www.trebovickymlyn.cz/";

/// Descriptor of the Třebovický mlýn source.
#[must_use]
pub fn source() -> SourceDescriptor {
    SourceDescriptor::new(
        "trebovicky_mlyn",
        "Třebovický mlýn",
        URL,
        "Ostrava",
        parse_fn(|input| parse(&input.document()?.html())),
    )
    .requires(&[Capability::Document])
}

/// Soup heading plus one carousel post per lunch, titled `1) Name`.
///
/// A page without the soup heading has no menu today.
///
/// # Errors
///
/// Fails when the soup is present but the carousel or a post's parts are missing.
pub fn parse(html: &Html) -> Result<Vec<FoodItem>, SourceError> {
    let Some(soup) = html.select(&dom::selector(".soup h2")?).next() else {
        return Ok(Vec::new());
    };
    let mut items: Vec<FoodItem> = vec![ScrapedSoup::new(dom::text(soup)).into()];

    let carousel = dom::first(html, ".owl-carousel")?;
    for post in carousel.select(&dom::selector(".menu-post")?) {
        let title = dom::text(dom::first_in(post, "h2")?);
        let Some((num, name)) = title.split_once(')') else {
            continue;
        };
        let ingredients = dom::text(dom::first_in(post, "h2 + div")?);
        let price = dom::text(dom::first_in(post, "span")?);
        let price = price.split(',').next().unwrap_or_default();
        items.push(
            ScrapedLunch::new(name)
                .with_num(num)
                .with_price(price)
                .with_ingredients(ingredients)
                .into(),
        );
    }
    Ok(items)
}
