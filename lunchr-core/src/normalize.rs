//! Cleanup applied to every scraped item regardless of its source.
//!
//! The substitution tables are tuned against real restaurant pages; extend
//! them with new entries rather than rewriting existing ones.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Lunch, RawValue, ScrapedLunch, ScrapedSoup, Soup};

/// Fragments removed from a price before it is parsed.
const PRICE_MARKERS: &[&str] = &["Kč", "kč", "KČ", "Kc", "CZK", ",-", ",–", ".-", ".00", ",00"];

/// Decomposed or spacing accents emitted by PDF and OCR extraction.
const DIACRITICS: &[(&str, &str)] = &[
    ("a\u{301}", "á"),
    ("A\u{301}", "Á"),
    ("e\u{301}", "é"),
    ("E\u{301}", "É"),
    ("i\u{301}", "í"),
    ("I\u{301}", "Í"),
    ("o\u{301}", "ó"),
    ("u\u{301}", "ú"),
    ("U\u{301}", "Ú"),
    ("y\u{301}", "ý"),
    ("Y\u{301}", "Ý"),
    ("u\u{30a}", "ů"),
    ("c\u{30c}", "č"),
    ("C\u{30c}", "Č"),
    ("d\u{30c}", "ď"),
    ("e\u{30c}", "ě"),
    ("E\u{30c}", "Ě"),
    ("n\u{30c}", "ň"),
    ("r\u{30c}", "ř"),
    ("R\u{30c}", "Ř"),
    ("s\u{30c}", "š"),
    ("S\u{30c}", "Š"),
    ("t\u{30c}", "ť"),
    ("z\u{30c}", "ž"),
    ("Z\u{30c}", "Ž"),
    ("\u{2c7}c", "č"),
    ("\u{2c7}e", "ě"),
    ("\u{2c7}r", "ř"),
    ("\u{2c7}s", "š"),
    ("\u{2c7}z", "ž"),
    ("\u{b4}a", "á"),
    ("\u{b4}e", "é"),
    ("\u{b4}\u{131}", "í"),
    ("\u{b4}i", "í"),
    ("\u{b4}u", "ú"),
    ("\u{b4}y", "ý"),
    ("\u{2da}u", "ů"),
];

/// Ordered (pattern, replacement) pairs applied to names and ingredients.
const SUBSTITUTIONS: &[(&str, &str)] = &[
    // markup remnants
    (r"<[^<>]*>|/>", ""),
    (r"&nbsp;|\x{A0}", " "),
    // "Polévka:", "Polévka k menu:", "Business menu:" labels
    (
        r"(?i)^\s*(?:(?:polévka(?:\s+k\s+menu)?|business\s+menu|menu\s+dne)\s*[:\-–]\s*)+",
        "",
    ),
    // "... k menu" suffix
    (r"(?i)(?:\s*\(?\s*\bk\s+menu\b\s*\)?)+\s*$", ""),
    // grammage: 150g, 0,33 l, 3 ks
    (r"(?i)\b\d+(?:[.,]\d+)?\s*(?:g|kg|ml|l|ks)\b\.?", ""),
    // "Alergeny: 1, 3, 7", "Al. (1,3,7)"
    (
        r"(?i)\s*\b(?:alergeny|alergen|al\.)\s*:?\s*(?:\([^)]*\)|[\d\s,]+)",
        "",
    ),
    // allergen parentheticals
    (r"\([^)]*\)", ""),
    // trailing allergen list ending with a comma
    (r"(\s*[0-9]+\s*,)+\s*$", ""),
    // remaining allergen numbers, optionally prefixed with "A"
    (r"A?\s*[0-9]+(,[0-9]+)*,?", ""),
    (r"\s+", " "),
];

static COMPILED: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    SUBSTITUTIONS
        .iter()
        .filter_map(|(pattern, replacement)| match Regex::new(pattern) {
            Ok(regex) => Some((regex, *replacement)),
            Err(err) => {
                tracing::error!(pattern, error = %err, "invalid cleanup pattern, skipping");
                None
            }
        })
        .collect()
});

/// Clean a dish name or ingredient list.
///
/// Applies the diacritic table, the substitution table, trims stray
/// punctuation and digits, and recapitalizes shouted all-caps labels. Rounds
/// repeat until the text stops changing, so the result is a fixed point.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let mut current = text.to_owned();
    // Rounds never lengthen the text; the bound only guards against a cycle.
    for _ in 0..=text.len() {
        let next = clean_round(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn clean_round(text: &str) -> String {
    let mut out = text.to_owned();
    for (broken, fixed) in DIACRITICS {
        if out.contains(broken) {
            out = out.replace(broken, fixed);
        }
    }
    for (regex, replacement) in COMPILED.iter() {
        out = regex.replace_all(&out, *replacement).into_owned();
    }
    let trimmed = out.trim_matches(|ch: char| {
        ch.is_ascii_punctuation() || ch.is_whitespace() || ch.is_ascii_digit() || ch == '–'
    });
    recapitalize(trimmed)
}

/// Lowercase a shouted label and capitalize its first letter.
fn recapitalize(text: &str) -> String {
    let total = text.chars().count();
    let uppers = text.chars().filter(|ch| ch.is_uppercase()).count();
    if uppers * 2 <= total {
        return text.to_owned();
    }

    let lower = text.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turn a scraped price into whole crowns.
///
/// Text prices lose their currency markers first; anything that still fails
/// to parse becomes `None` and is logged.
#[must_use]
pub fn normalize_price(raw: Option<&RawValue>) -> Option<u32> {
    match raw? {
        RawValue::Number(number) => match u32::try_from(*number) {
            Ok(price) => Some(price),
            Err(err) => {
                tracing::warn!(price = number, error = %err, "price out of range");
                None
            }
        },
        RawValue::Text(text) => parse_price_text(text),
    }
}

fn parse_price_text(text: &str) -> Option<u32> {
    let mut stripped = text.to_owned();
    for marker in PRICE_MARKERS {
        stripped = stripped.replace(marker, "");
    }
    let stripped: String = stripped.chars().filter(|ch| !ch.is_whitespace()).collect();
    let digits = stripped.trim_matches(|ch: char| ch.is_ascii_punctuation() || ch == '–');
    if digits.is_empty() {
        return None;
    }

    match digits.parse::<u32>() {
        Ok(price) => Some(price),
        Err(err) => {
            tracing::warn!(price = text, error = %err, "unparsable price");
            None
        }
    }
}

/// Parse a scraped menu number; `None` when it is missing, zero or garbled.
fn parse_num(raw: Option<&RawValue>) -> Option<u32> {
    match raw? {
        RawValue::Number(number) => u32::try_from(*number).ok().filter(|num| *num > 0),
        RawValue::Text(text) => {
            let digits = text.trim_matches(|ch: char| ch.is_ascii_punctuation() || ch.is_whitespace());
            match digits.parse::<u32>() {
                Ok(num) => Some(num).filter(|num| *num > 0),
                Err(err) => {
                    if !digits.is_empty() {
                        tracing::warn!(num = text.as_str(), error = %err, "unparsable menu number");
                    }
                    None
                }
            }
        }
    }
}

fn clean_optional(text: Option<&str>) -> Option<String> {
    text.map(clean_text).filter(|cleaned| !cleaned.is_empty())
}

/// Normalize a single soup.
#[must_use]
pub fn normalize_soup(soup: &ScrapedSoup) -> Soup {
    Soup {
        name: clean_text(&soup.name),
        price: normalize_price(soup.price.as_ref()),
        photo: soup.photo.clone(),
    }
}

/// Normalize the lunches of one source, resolving menu numbers.
///
/// Lunches without a usable number continue the sequence of the previous one,
/// starting at 1.
#[must_use]
pub fn normalize_lunches(lunches: &[ScrapedLunch]) -> Vec<Lunch> {
    let mut previous = 0_u32;
    lunches
        .iter()
        .map(|lunch| {
            let num = parse_num(lunch.num.as_ref()).unwrap_or_else(|| previous.saturating_add(1));
            previous = num;
            Lunch {
                name: clean_text(&lunch.name),
                num,
                price: normalize_price(lunch.price.as_ref()),
                ingredients: clean_optional(lunch.ingredients.as_deref()),
                photo: lunch.photo.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> RawValue {
        RawValue::from(value)
    }

    #[test]
    fn price_text_loses_currency_markers() {
        assert_eq!(normalize_price(Some(&text("89 Kč"))), Some(89));
        assert_eq!(normalize_price(Some(&text("120,-"))), Some(120));
        assert_eq!(normalize_price(Some(&text(" 149.00 "))), Some(149));
        assert_eq!(normalize_price(Some(&text("1 290 Kč"))), Some(1290));
    }

    #[test]
    fn price_without_digits_is_absent() {
        assert_eq!(normalize_price(Some(&text("Kč"))), None);
        assert_eq!(normalize_price(Some(&text("dle váhy"))), None);
        assert_eq!(normalize_price(None), None);
    }

    #[test]
    fn numeric_price_passes_through() {
        assert_eq!(normalize_price(Some(&RawValue::Number(120))), Some(120));
        assert_eq!(normalize_price(Some(&RawValue::Number(-5))), None);
    }

    #[test]
    fn missing_numbers_continue_the_sequence() {
        let lunches = vec![
            ScrapedLunch::new("Guláš"),
            ScrapedLunch::new("Řízek").with_num("2."),
            ScrapedLunch::new("Rizoto"),
        ];
        let nums: Vec<u32> = normalize_lunches(&lunches).iter().map(|lunch| lunch.num).collect();
        assert_eq!(nums, [1, 2, 3]);
    }

    #[test]
    fn garbled_and_zero_numbers_are_reassigned() {
        let lunches = vec![
            ScrapedLunch::new("A").with_num(5_u32),
            ScrapedLunch::new("B").with_num("x)"),
            ScrapedLunch::new("C").with_num(0_u32),
            ScrapedLunch::new("D").with_num(" 1) "),
        ];
        let nums: Vec<u32> = normalize_lunches(&lunches).iter().map(|lunch| lunch.num).collect();
        assert_eq!(nums, [5, 6, 7, 1]);
    }

    #[test]
    fn soup_boilerplate_and_allergens_are_removed() {
        assert_eq!(
            clean_text("Polévka: Hovězí vývar s nudlemi (1,3,9)"),
            "Hovězí vývar s nudlemi"
        );
        assert_eq!(
            clean_text("Polévka k menu: Česnečka"),
            "Česnečka"
        );
        assert_eq!(
            clean_text("Polévka dle denní nabídky k menu"),
            "Polévka dle denní nabídky"
        );
    }

    #[test]
    fn repeated_labels_are_removed_at_once() {
        let labels = "Polévka: ".repeat(5) + "Kulajda";
        assert_eq!(clean_text(&labels), "Kulajda");
        assert_eq!(clean_text("Polévka k menu: Business menu: Kulajda"), "Kulajda");
        assert_eq!(clean_text(&format!("Kulajda{}", " k menu".repeat(5))), "Kulajda");
        assert_eq!(clean_text("Kulajda (k menu) k menu"), "Kulajda");
    }

    #[test]
    fn grammage_and_allergen_lists_are_removed() {
        assert_eq!(
            clean_text("150g Kuřecí řízek, bramborový salát 1,3,7"),
            "Kuřecí řízek, bramborový salát"
        );
        assert_eq!(clean_text("3 ks palačinky s džemem"), "palačinky s džemem");
        assert_eq!(
            clean_text("Kuře na paprice, těstoviny Al. (1,3,7)"),
            "Kuře na paprice, těstoviny"
        );
        assert_eq!(
            clean_text("Svíčková na smetaně Alergeny: 1, 3, 7"),
            "Svíčková na smetaně"
        );
    }

    #[test]
    fn markup_and_whitespace_are_cleaned() {
        assert_eq!(
            clean_text("<b>Guláš</b>&nbsp;s   knedlíkem"),
            "Guláš s knedlíkem"
        );
        assert_eq!(clean_text(" \u{a0}– Rizoto – "), "Rizoto");
    }

    #[test]
    fn decomposed_accents_are_fixed() {
        assert_eq!(clean_text("Hove\u{30c}zi\u{301} gula\u{301}s\u{30c}"), "Hovězí guláš");
        assert_eq!(clean_text("\u{2c7}cesne\u{2c7}cka"), "česnečka");
    }

    #[test]
    fn shouted_labels_are_recapitalized() {
        assert_eq!(clean_text("SMAŽENÝ SÝR, HRANOLKY"), "Smažený sýr, hranolky");
        assert_eq!(clean_text("Smažený sýr, TATARKA"), "Smažený sýr, TATARKA");
    }

    #[test]
    fn empty_ingredients_become_absent() {
        let lunches = vec![ScrapedLunch::new("Guláš").with_ingredients(" (1,3) ")];
        assert_eq!(normalize_lunches(&lunches)[0].ingredients, None);
    }

    #[test]
    fn normalization_is_idempotent() {
        let names = [
            "Polévka: Polévka: Hovězí vývar (9)",
            "1. Polévka: Zelňačka",
            "POLÉVKA: ČESNEČKA 0,33 l",
            "150g Kuřecí řízek, bramborový salát 1,3,7",
            "A 1,3,7 Vepřo knedlo zelo",
            "Hove\u{30c}zi\u{301} gula\u{301}s\u{30c} k menu",
            "<p>SVÍČKOVÁ</p>",
            "Polévka: Polévka: Polévka: Polévka: Polévka: Kulajda",
            "Kulajda k menu k menu k menu k menu k menu",
            "",
        ];
        for name in names {
            let once = clean_text(name);
            assert_eq!(clean_text(&once), once, "clean_text not idempotent for {name:?}");
        }

        let lunches = vec![
            ScrapedLunch::new("1. GULÁŠ")
                .with_num("1.")
                .with_price("129 Kč")
                .with_ingredients("knedlík (1,3,7)"),
            ScrapedLunch::new("Rizoto").with_price(115_u32),
            ScrapedLunch::new("Salát").with_num("x"),
        ];
        let once = normalize_lunches(&lunches);
        let again_input: Vec<ScrapedLunch> = once.iter().cloned().map(ScrapedLunch::from).collect();
        assert_eq!(normalize_lunches(&again_input), once);

        let soup = ScrapedSoup::new("Polévka: Dršťková (1)").with_price("39,-");
        let soup_once = normalize_soup(&soup);
        assert_eq!(normalize_soup(&ScrapedSoup::from(soup_once.clone())), soup_once);
    }
}
