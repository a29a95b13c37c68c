//! U Zlatého lva keeps the week in one text block exported from a site builder.

use chrono::{Datelike, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use lunchr_core::{
    Capability, FoodItem, ScrapedLunch, ScrapedSoup, SourceDescriptor, SourceError, parse_fn,
};

use crate::dom::{self, Pattern};

const URL: &str = "http://www.zlatylev.com/menu_zlaty_lev.html";
const SOUP_PREFIX: &str = "Polévka:";

static NUMBERED: Pattern = Lazy::new(|| Regex::new(r"^[0-9]+\."));
static PRICE: Pattern = Lazy::new(|| Regex::new(r"^[0-9]+\s*(,-|Kč)$"));

/// What the next line of a lunch is expected to hold.
enum Expect {
    Num,
    Name(ScrapedLunch),
    Price(ScrapedLunch),
}

/// Descriptor of the U Zlatého lva source.
#[must_use]
pub fn source() -> SourceDescriptor {
    SourceDescriptor::new(
        "u_zlateho_lva",
        "U Zlatého lva",
        URL,
        "Ostrava",
        parse_fn(|input| parse(&input.document()?.html(), dom::today())),
    )
    .requires(&[Capability::Document])
}

/// Items listed for `day`.
///
/// # Errors
///
/// Fails when the text block is missing.
pub fn parse(html: &Html, day: NaiveDate) -> Result<Vec<FoodItem>, SourceError> {
    let block = dom::first(html, ".xr_txt.xr_s0")?;
    parse_text(&dom::text(block), day)
}

/// Walk the lines after the heading of `day` up to the next weekday heading.
///
/// A lunch spans up to three lines: `1.` with or without the name, the name,
/// and a price like `125 Kč`.
fn parse_text(text: &str, day: NaiveDate) -> Result<Vec<FoodItem>, SourceError> {
    let numbered = dom::compiled(&NUMBERED)?;
    let price = dom::compiled(&PRICE)?;
    let heading = dom::day_name(day);
    // Friday's menu runs until the end of the block.
    let next_heading = match day.weekday() {
        Weekday::Fri | Weekday::Sat | Weekday::Sun => None,
        _ => day.succ_opt().map(dom::day_name),
    };

    let mut items: Vec<FoodItem> = Vec::new();
    let mut capturing = false;
    let mut expect = Expect::Num;
    for line in text.lines().map(str::trim) {
        if line.starts_with(heading) {
            capturing = true;
            continue;
        }
        if !capturing {
            continue;
        }
        if next_heading.is_some_and(|next| line.starts_with(next)) {
            break;
        }
        if let Some(soup) = line.strip_prefix(SOUP_PREFIX) {
            items.push(ScrapedSoup::new(soup).into());
            continue;
        }

        expect = match expect {
            Expect::Num => match line.split_once('.') {
                Some((num, name)) if numbered.is_match(line) => {
                    let lunch = ScrapedLunch::new(name).with_num(num);
                    if name.trim().is_empty() {
                        Expect::Name(lunch)
                    } else {
                        Expect::Price(lunch)
                    }
                }
                _ => Expect::Num,
            },
            Expect::Name(mut lunch) => {
                if line.is_empty() {
                    Expect::Name(lunch)
                } else {
                    line.clone_into(&mut lunch.name);
                    Expect::Price(lunch)
                }
            }
            Expect::Price(lunch) => {
                if price.is_match(line) {
                    let amount = line.split(' ').next().unwrap_or(line);
                    items.push(lunch.with_price(amount).into());
                    Expect::Num
                } else {
                    Expect::Price(lunch)
                }
            }
        };
    }
    Ok(items)
}
