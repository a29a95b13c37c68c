//! La Futura renders its menu with a page-builder repeater.

use scraper::Html;

use lunchr_core::{
    Capability, FoodItem, ScrapedLunch, ScrapedSoup, SourceDescriptor, SourceError, parse_fn,
};

use crate::dom;

const URL: &str = "http://lafuturaostrava.cz/";
/// Glyph the site uses instead of a number in the soup row.
const SOUP_MARK: &str = "𐃸";

/// Descriptor of the La Futura source.
#[must_use]
pub fn source() -> SourceDescriptor {
    SourceDescriptor::new(
        "lafutura",
        "La Futura",
        URL,
        "Ostrava",
        parse_fn(|input| parse(&input.document()?.html())),
    )
    .requires(&[Capability::Document])
}

/// Repeater items with cells `num | name | price`.
///
/// # Errors
///
/// Fails when the repeater is missing.
pub fn parse(html: &Html) -> Result<Vec<FoodItem>, SourceError> {
    let repeater = dom::first(html, ".jet-listing-dynamic-repeater__items")?;
    let cell = dom::selector("td")?;

    let mut items: Vec<FoodItem> = Vec::new();
    for row in repeater.select(&dom::selector(".jet-listing-dynamic-repeater__item")?) {
        let cells: Vec<String> = row.select(&cell).map(dom::text).collect();
        let [num, name, rest @ ..] = cells.as_slice() else {
            continue;
        };
        if num.trim() == SOUP_MARK {
            items.push(ScrapedSoup::new(name.as_str()).into());
            continue;
        }
        let mut lunch = ScrapedLunch::new(name.as_str()).with_num(num.as_str());
        lunch.price = rest.first().map(|price| price.as_str().into());
        items.push(lunch.into());
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soup_row_is_marked() {
        let html = Html::parse_document(
            r#"<div class="jet-listing-dynamic-repeater__items">
<div class="jet-listing-dynamic-repeater__item"><table><tr><td> 𐃸 </td><td>Zeleninový krém</td></tr></table></div>
<div class="jet-listing-dynamic-repeater__item"><table><tr><td>1</td><td>Burrito bowl</td><td>165,-</td></tr></table></div>
</div>"#,
        );
        let items = parse(&html).unwrap();
        let expected: Vec<FoodItem> = vec![
            ScrapedSoup::new("Zeleninový krém").into(),
            ScrapedLunch::new("Burrito bowl")
                .with_num("1")
                .with_price("165,-")
                .into(),
        ];
        assert_eq!(items, expected);
    }
}
