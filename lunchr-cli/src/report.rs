//! Plain-text rendering for `--plain`.

use std::fmt::Write as _;

use chrono::DateTime;
use lunchr_core::{DailyMenus, SourceMenu};

/// Human-readable price, e.g. `129 Kč`.
pub(crate) fn price_label(price: Option<u32>) -> String {
    price.map(|price| format!("{price} Kč")).unwrap_or_default()
}

/// Local time of a Unix timestamp, e.g. `11:30`.
pub(crate) fn clock_label(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0).map_or_else(
        || "?".to_owned(),
        |time| time.with_timezone(&chrono::Local).format("%H:%M").to_string(),
    )
}

/// Summary line with the daily counters.
pub(crate) fn stats_line(daily: &DailyMenus) -> String {
    let mut line = format!(
        "fetched {}× today, last at {}, {} visits",
        daily.fetch_count,
        clock_label(daily.last_fetch),
        daily.access_count
    );
    if let Some(first) = daily.first_access {
        let _ = write!(line, " since {}", clock_label(first));
    }
    line
}

fn render_menu(out: &mut String, menu: &SourceMenu) {
    let _ = writeln!(
        out,
        "{} ({}) {} [{} ms]",
        menu.title,
        menu.location,
        menu.url,
        menu.elapsed().as_millis()
    );
    if let Some(err) = &menu.error {
        let _ = writeln!(out, "  error: {err}");
        return;
    }
    if menu.is_empty() {
        let _ = writeln!(out, "  no menu today");
        return;
    }
    for soup in &menu.soups {
        let _ = writeln!(out, "  Polévka: {}  {}", soup.name, price_label(soup.price));
    }
    for lunch in &menu.lunches {
        let _ = writeln!(out, "  {}. {}  {}", lunch.num, lunch.name, price_label(lunch.price));
        if let Some(ingredients) = &lunch.ingredients {
            let _ = writeln!(out, "     {ingredients}");
        }
    }
}

/// Render all menus, one block per source.
pub(crate) fn render(daily: &DailyMenus) -> String {
    let mut out = String::new();
    for menu in &daily.menus {
        render_menu(&mut out, menu);
        out.push('\n');
    }
    out.push_str(&stats_line(daily));
    out.push('\n');
    out
}
