//! Domain data structures for sources, scraped items, and per-source menus.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Identifier of a registered source, used for allow-lists on the command line.
pub struct SourceId(pub String);

impl fmt::Display for SourceId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        SourceId(id.to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Free-form location tag of a source, e.g. the city district it is in.
pub struct Location(pub String);

impl fmt::Display for Location {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
/// A number or a price as scraped, before normalization.
pub enum RawValue {
    /// Already numeric, e.g. from a JSON API.
    Number(i64),
    /// Text cut out of a page, e.g. `"89 Kč"` or `"2."`.
    Text(String),
}

impl From<&str> for RawValue {
    fn from(text: &str) -> Self {
        RawValue::Text(text.to_owned())
    }
}

impl From<String> for RawValue {
    fn from(text: String) -> Self {
        RawValue::Text(text)
    }
}

impl From<i64> for RawValue {
    fn from(number: i64) -> Self {
        RawValue::Number(number)
    }
}

impl From<u32> for RawValue {
    fn from(number: u32) -> Self {
        RawValue::Number(i64::from(number))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Soup as emitted by a parse routine.
pub struct ScrapedSoup {
    /// Name, possibly still carrying scraping artifacts.
    pub name: String,
    /// Price as found on the page.
    pub price: Option<RawValue>,
    /// Link to a photo of the dish.
    pub photo: Option<String>,
}

impl ScrapedSoup {
    /// Start a soup with the given name.
    #[must_use]
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attach a scraped price.
    #[must_use]
    pub fn with_price<P: Into<RawValue>>(mut self, price: P) -> Self {
        self.price = Some(price.into());
        self
    }

    /// Attach a photo link.
    #[must_use]
    pub fn with_photo<S: Into<String>>(mut self, photo: S) -> Self {
        self.photo = Some(photo.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Lunch (main course) as emitted by a parse routine.
pub struct ScrapedLunch {
    /// Name, possibly still carrying scraping artifacts.
    pub name: String,
    /// Menu number as printed by the restaurant, e.g. `"2."`.
    pub num: Option<RawValue>,
    /// Price as found on the page.
    pub price: Option<RawValue>,
    /// Side dishes or a description.
    pub ingredients: Option<String>,
    /// Link to a photo of the dish.
    pub photo: Option<String>,
}

impl ScrapedLunch {
    /// Start a lunch with the given name.
    #[must_use]
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attach the printed menu number.
    #[must_use]
    pub fn with_num<N: Into<RawValue>>(mut self, num: N) -> Self {
        self.num = Some(num.into());
        self
    }

    /// Attach a scraped price.
    #[must_use]
    pub fn with_price<P: Into<RawValue>>(mut self, price: P) -> Self {
        self.price = Some(price.into());
        self
    }

    /// Attach side dishes or a description.
    #[must_use]
    pub fn with_ingredients<S: Into<String>>(mut self, ingredients: S) -> Self {
        self.ingredients = Some(ingredients.into());
        self
    }

    /// Attach a photo link.
    #[must_use]
    pub fn with_photo<S: Into<String>>(mut self, photo: S) -> Self {
        self.photo = Some(photo.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single item produced by a parse routine.
pub enum FoodItem {
    /// Soup of the day.
    Soup(ScrapedSoup),
    /// Main course.
    Lunch(ScrapedLunch),
}

impl From<ScrapedSoup> for FoodItem {
    fn from(soup: ScrapedSoup) -> Self {
        FoodItem::Soup(soup)
    }
}

impl From<ScrapedLunch> for FoodItem {
    fn from(lunch: ScrapedLunch) -> Self {
        FoodItem::Lunch(lunch)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Normalized soup.
pub struct Soup {
    /// Cleaned-up name.
    pub name: String,
    /// Price in whole crowns.
    pub price: Option<u32>,
    /// Link to a photo of the dish.
    pub photo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Normalized lunch.
pub struct Lunch {
    /// Cleaned-up name.
    pub name: String,
    /// Menu number, positive and assigned sequentially when the source has none.
    pub num: u32,
    /// Price in whole crowns.
    pub price: Option<u32>,
    /// Cleaned-up side dishes or description.
    pub ingredients: Option<String>,
    /// Link to a photo of the dish.
    pub photo: Option<String>,
}

impl From<Soup> for ScrapedSoup {
    fn from(soup: Soup) -> Self {
        Self {
            name: soup.name,
            price: soup.price.map(RawValue::from),
            photo: soup.photo,
        }
    }
}

impl From<Lunch> for ScrapedLunch {
    fn from(lunch: Lunch) -> Self {
        Self {
            name: lunch.name,
            num: Some(RawValue::from(lunch.num)),
            price: lunch.price.map(RawValue::from),
            ingredients: lunch.ingredients,
            photo: lunch.photo,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Result of one aggregation cycle for one source.
pub struct SourceMenu {
    /// Source identifier.
    pub id: SourceId,
    /// Display name of the restaurant.
    pub title: String,
    /// Page the menu was scraped from.
    pub url: String,
    /// Location tag of the restaurant.
    pub location: Location,
    /// Soups in the order the source lists them.
    pub soups: Vec<Soup>,
    /// Lunches in the order the source lists them.
    pub lunches: Vec<Lunch>,
    /// Time spent downloading the page.
    pub elapsed_fetch: Duration,
    /// Time spent in the parse routine, including its own requests.
    pub elapsed_parse: Duration,
    /// Failure message; set only when the source could not be collected.
    pub error: Option<String>,
}

impl SourceMenu {
    /// Whether collecting this source failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Whether the source succeeded but had nothing on the menu.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.soups.is_empty() && self.lunches.is_empty()
    }

    /// Combined fetch and parse time.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed_fetch + self.elapsed_parse
    }
}
