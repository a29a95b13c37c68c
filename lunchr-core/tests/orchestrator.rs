//! Collecting several sources against local stand-in sites.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lunchr_core::{
    Capability, FoodItem, Lunch, MenuParser, ParseInput, ScrapedLunch, ScrapedSoup, Soup,
    SourceDescriptor, SourceError, SourceMenu, parse_fn,
};
use scraper::Selector;

const LISTING: &str = r#"<!DOCTYPE html>
<html><body><ul id="menu">
<li class="soup"><span class="name">Hovězí vývar s nudlemi (1,3,9)</span><span class="price">35 Kč</span></li>
<li class="lunch"><span class="name">150g Smažený sýr, hranolky</span><span class="price">159,-</span></li>
<li class="lunch"><span class="name">SVÍČKOVÁ NA SMETANĚ</span><span class="price">169 Kč</span></li>
</ul></body></html>"#;

fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|err| SourceError::Selector(err.to_string()))
}

fn parse_listing(input: &ParseInput) -> Result<Vec<FoodItem>, SourceError> {
    let html = input.document()?.html();
    let item = selector("#menu li")?;
    let name = selector(".name")?;
    let price = selector(".price")?;

    let mut items: Vec<FoodItem> = Vec::new();
    for row in html.select(&item) {
        let dish: String = row
            .select(&name)
            .next()
            .ok_or_else(|| SourceError::MissingElement("dish name".to_owned()))?
            .text()
            .collect();
        let cost: String = row
            .select(&price)
            .next()
            .map(|el| el.text().collect())
            .unwrap_or_default();
        if row.value().attr("class") == Some("soup") {
            items.push(ScrapedSoup::new(dish).with_price(cost).into());
        } else {
            items.push(ScrapedLunch::new(dish).with_price(cost).into());
        }
    }
    Ok(items)
}

fn listing_source(id: &str, url: &str) -> SourceDescriptor {
    SourceDescriptor::new(id, id.to_uppercase(), url, "test", parse_fn(parse_listing))
        .requires(&[Capability::Document])
}

fn menu<'menus>(menus: &'menus [SourceMenu], id: &str) -> &'menus SourceMenu {
    menus.iter().find(|menu| menu.id.0 == id).unwrap()
}

#[tokio::test]
async fn failing_site_does_not_affect_the_others() {
    let good = common::serve_page(LISTING).await;
    let dead = common::hang_up_site().await;
    let sources = vec![listing_source("a", &good), listing_source("b", &dead)];

    let menus = common::orchestrator().gather(&sources).await;

    assert_eq!(menus.len(), 2);
    assert_eq!(menus[0].id.0, "a");
    assert_eq!(menus[1].id.0, "b");

    let populated = menu(&menus, "a");
    assert_eq!(populated.error, None);
    assert_eq!(populated.title, "A");
    assert_eq!(
        populated.soups,
        vec![Soup {
            name: "Hovězí vývar s nudlemi".to_owned(),
            price: Some(35),
            photo: None,
        }]
    );
    assert_eq!(
        populated.lunches,
        vec![
            Lunch {
                name: "Smažený sýr, hranolky".to_owned(),
                num: 1,
                price: Some(159),
                ingredients: None,
                photo: None,
            },
            Lunch {
                name: "Svíčková na smetaně".to_owned(),
                num: 2,
                price: Some(169),
                ingredients: None,
                photo: None,
            },
        ]
    );

    let failed = menu(&menus, "b");
    assert!(failed.error.as_deref().is_some_and(|err| err.starts_with("Network error")));
    assert!(failed.soups.is_empty());
    assert!(failed.lunches.is_empty());
    assert_eq!(failed.elapsed_fetch, Duration::ZERO);
    assert_eq!(failed.elapsed_parse, Duration::ZERO);
}

#[tokio::test]
async fn every_failure_kind_stays_inside_its_source() {
    let broken = common::broken_site().await;
    let sources = vec![
        listing_source("status", &broken),
        SourceDescriptor::new(
            "closed",
            "Closed",
            "",
            "test",
            parse_fn(|_| Err(SourceError::Parse("kitchen closed".to_owned()))),
        ),
        SourceDescriptor::new("undeclared", "Undeclared", "", "test", parse_fn(parse_listing)),
        SourceDescriptor::new(
            "panics",
            "Panics",
            "",
            "test",
            parse_fn(|_| panic!("routine bug")),
        ),
        SourceDescriptor::new(
            "fine",
            "Fine",
            "",
            "test",
            parse_fn(|_| Ok(vec![ScrapedSoup::new("Kulajda").into()])),
        ),
    ];

    let menus = common::orchestrator().gather(&sources).await;
    assert_eq!(menus.len(), 5);

    let status = menu(&menus, "status").error.clone().unwrap();
    assert!(status.contains("500"), "{status}");
    assert_eq!(
        menu(&menus, "closed").error.as_deref(),
        Some("Parse error: kitchen closed")
    );
    assert_eq!(
        menu(&menus, "undeclared").error.as_deref(),
        Some("Input not provided: document")
    );
    assert!(
        menu(&menus, "panics")
            .error
            .as_deref()
            .is_some_and(|err| err.starts_with("Internal error"))
    );

    let fine = menu(&menus, "fine");
    assert_eq!(fine.error, None);
    assert_eq!(fine.soups.len(), 1);
    assert_eq!(fine.elapsed_fetch, Duration::ZERO);
}

/// Routine that downloads its own data with the shared client.
struct DailySpecial {
    url: String,
}

#[async_trait]
impl MenuParser for DailySpecial {
    async fn parse(&self, input: ParseInput) -> Result<Vec<FoodItem>, SourceError> {
        let body = input
            .client()?
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(vec![ScrapedSoup::new(body.trim()).with_price(42_u32).into()])
    }
}

#[tokio::test]
async fn routines_receive_the_inputs_they_declare() {
    let special = common::serve_page("Gulášová polévka").await;
    let lines = common::serve_page("Kuřecí řízek\nRizoto s houbami\n").await;

    let with_client = SourceDescriptor::new(
        "client",
        "Client",
        "",
        "test",
        Arc::new(DailySpecial { url: special }),
    )
    .requires(&[Capability::HttpClient]);
    let with_text = SourceDescriptor::new(
        "text",
        "Text",
        lines,
        "test",
        parse_fn(|input| {
            Ok(input
                .raw_text()?
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| ScrapedLunch::new(line).into())
                .collect())
        }),
    )
    .requires(&[Capability::RawText]);

    let menus = common::orchestrator().gather(&[with_client, with_text]).await;

    let client = menu(&menus, "client");
    assert_eq!(client.error, None);
    assert_eq!(client.soups[0].name, "Gulášová polévka");
    assert_eq!(client.soups[0].price, Some(42));

    let text = menu(&menus, "text");
    assert_eq!(text.error, None);
    let names: Vec<(&str, u32)> = text
        .lunches
        .iter()
        .map(|lunch| (lunch.name.as_str(), lunch.num))
        .collect();
    assert_eq!(names, [("Kuřecí řízek", 1), ("Rizoto s houbami", 2)]);
}

fn soup_per_line(input: &ParseInput) -> Result<Vec<FoodItem>, SourceError> {
    Ok(input
        .raw_text()?
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| ScrapedSoup::new(line).into())
        .collect())
}

#[tokio::test]
async fn pages_are_decoded_with_the_source_charset() {
    let mislabelled = common::serve_bytes(
        "Guláš\nČesnečka".as_bytes(),
        "text/html; charset=iso-8859-1",
    )
    .await;
    let legacy = common::serve_bytes(b"Gul\xe1\x9a", "text/html; charset=utf-8").await;

    let sources = vec![
        SourceDescriptor::new("utf8", "Utf8", mislabelled, "test", parse_fn(soup_per_line))
            .requires(&[Capability::RawText]),
        SourceDescriptor::new("cp1250", "Cp1250", legacy, "test", parse_fn(soup_per_line))
            .requires(&[Capability::RawText])
            .with_charset("windows-1250"),
    ];

    let menus = common::orchestrator().gather(&sources).await;

    let utf8 = menu(&menus, "utf8");
    assert_eq!(utf8.error, None);
    let names: Vec<&str> = utf8.soups.iter().map(|soup| soup.name.as_str()).collect();
    assert_eq!(names, ["Guláš", "Česnečka"]);

    let cp1250 = menu(&menus, "cp1250");
    assert_eq!(cp1250.error, None);
    assert_eq!(cp1250.soups[0].name, "Guláš");
}
