//! Reading history from a Goodreads shelf RSS feed.

use chrono::{DateTime, Utc};
use homedash_core::settings::require;
use homedash_core::{Book, GoodreadsSnapshot, Integration, Settings};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::client::{ApiClient, Service};
use crate::error::IntegrationError;
use crate::transform::top_n;

pub const DEFAULT_SHELF: &str = "read";
pub const RECENT_LIMIT: usize = 10;
pub const TOP_RATING: u8 = 5;

const SHELF: &str = "goodreads shelf";

#[derive(Debug, Clone, Copy)]
pub struct GoodreadsAccount<'a> {
    pub user_id: &'a str,
    pub key: Option<&'a str>,
    pub shelf: &'a str,
}

impl<'a> GoodreadsAccount<'a> {
    /// # Errors
    ///
    /// Returns a config error if the `goodreads` section or `userId` is missing.
    pub fn from_settings(settings: &'a Settings) -> Result<Self, IntegrationError> {
        let section = settings.goodreads()?;
        let user_id = require(section.user_id.as_ref(), Integration::Goodreads, "userId")?;
        let key = section.key.as_deref().map(str::trim).filter(|k| !k.is_empty());
        let shelf = section
            .shelf
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SHELF);
        Ok(Self { user_id, key, shelf })
    }
}

/// Fetch and parse the shelf feed.
///
/// # Errors
///
/// Returns a remote error if the request fails or the XML is malformed, and
/// a shape error if an item has no title.
pub async fn shelf(client: &ApiClient, account: GoodreadsAccount<'_>) -> Result<Vec<Book>, IntegrationError> {
    let mut query = vec![("shelf", account.shelf)];
    if let Some(key) = account.key {
        query.push(("key", key));
    }
    let request = client
        .http()
        .get(client.url(Service::Goodreads, &["review", "list_rss", account.user_id]))
        .query(&query);

    let body = client.send_text(request, SHELF).await?;
    parse_shelf(&body)
}

/// Summarise a shelf: totals, five-star books, and the most recent reads.
#[must_use]
pub fn summarize(books: Vec<Book>) -> GoodreadsSnapshot {
    let page_count = books.iter().filter_map(|b| b.pages).map(u64::from).sum();
    let top_books = books.iter().filter(|b| b.rating == TOP_RATING).cloned().collect();
    GoodreadsSnapshot {
        book_count: books.len() as u64,
        page_count,
        top_books,
        recent_books: top_n(books, RECENT_LIMIT),
    }
}

/// # Errors
///
/// Returns the first fetch or parse failure.
pub async fn collect(client: &ApiClient, settings: &Settings) -> Result<GoodreadsSnapshot, IntegrationError> {
    let account = GoodreadsAccount::from_settings(settings)?;
    let books = shelf(client, account).await?;
    Ok(summarize(books))
}

#[derive(Debug, Default)]
struct ItemFields {
    title: String,
    author: String,
    rating: String,
    read_at: String,
    image: String,
    medium_image: String,
    pages: String,
}

impl ItemFields {
    fn set(&mut self, tag: &str, text: String) {
        let slot = match tag {
            "title" => &mut self.title,
            "author_name" => &mut self.author,
            "user_rating" => &mut self.rating,
            "user_read_at" => &mut self.read_at,
            "book_image_url" => &mut self.image,
            "book_medium_image_url" => &mut self.medium_image,
            "num_pages" => &mut self.pages,
            _ => return,
        };
        slot.push_str(&text);
    }

    fn into_book(self) -> Result<Book, IntegrationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(IntegrationError::shape(SHELF, "item without a title"));
        }
        let non_empty = |s: String| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };

        Ok(Book {
            title: title.to_string(),
            author: non_empty(self.author),
            rating: self.rating.trim().parse().unwrap_or(0),
            read_at: DateTime::parse_from_rfc2822(self.read_at.trim())
                .ok()
                .map(|d| d.with_timezone(&Utc)),
            img: non_empty(self.medium_image).or_else(|| non_empty(self.image)),
            pages: self.pages.trim().parse().ok(),
        })
    }
}

/// Parse a Goodreads `list_rss` body into books, in feed order.
///
/// # Errors
///
/// Returns [`IntegrationError::Xml`] on malformed XML and
/// [`IntegrationError::Shape`] for an item without a title.
pub fn parse_shelf(xml: &str) -> Result<Vec<Book>, IntegrationError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut books = Vec::new();
    let mut current: Option<ItemFields> = None;
    let mut current_tag = String::new();

    loop {
        let event = reader.read_event().map_err(|source| IntegrationError::Xml {
            context: SHELF,
            source,
        })?;
        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "item" {
                    current = Some(ItemFields::default());
                }
                current_tag = name;
            }
            Event::End(e) => {
                if e.name().as_ref() == b"item" {
                    if let Some(fields) = current.take() {
                        books.push(fields.into_book()?);
                    }
                }
                current_tag.clear();
            }
            Event::Text(e) => {
                if let Some(fields) = current.as_mut() {
                    let text = e.unescape().map_err(|source| IntegrationError::Xml {
                        context: SHELF,
                        source,
                    })?;
                    fields.set(&current_tag, text.into_owned());
                }
            }
            Event::CData(e) => {
                if let Some(fields) = current.as_mut() {
                    fields.set(&current_tag, String::from_utf8_lossy(e.as_ref()).into_owned());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(books)
}
