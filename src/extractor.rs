use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::models::{Price, RawListing};
use crate::utils::{AppError, Result};

const ITEM_CELL: &str = "div.item-cell";
const ITEM_TITLE: &str = "a.item-title";
const PRICE_CURRENT: &str = "li.price-current";
const PRICE_DOLLARS: &str = "strong";
const PRICE_CENTS: &str = "sup";
const PAGINATION: &str = "span.list-tool-pagination-text strong";

/// Shown in the price block of listings that cannot be ordered yet.
const COMING_SOON_MARKER: &str = "COMING SOON";

/// Reads catalog entries and the pagination indicator out of listing page markup.
pub struct ListingExtractor {
    item_cell: Selector,
    item_title: Selector,
    price_current: Selector,
    price_dollars: Selector,
    price_cents: Selector,
    pagination: Selector,
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| AppError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl ListingExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            item_cell: parse_selector(ITEM_CELL)?,
            item_title: parse_selector(ITEM_TITLE)?,
            price_current: parse_selector(PRICE_CURRENT)?,
            price_dollars: parse_selector(PRICE_DOLLARS)?,
            price_cents: parse_selector(PRICE_CENTS)?,
            pagination: parse_selector(PAGINATION)?,
        })
    }

    /// All catalog entries on the page, in document order.
    pub fn extract(&self, markup: &str) -> Vec<RawListing> {
        let document = Html::parse_document(markup);
        let mut listings = Vec::new();

        for cell in document.select(&self.item_cell) {
            let Some(anchor) = cell.select(&self.item_title).next() else {
                debug!("Skipping catalog entry without a title element");
                continue;
            };

            let title = element_text(anchor);
            if title.is_empty() {
                debug!("Skipping catalog entry with an empty title");
                continue;
            }

            let link = anchor.value().attr("href").unwrap_or_default().trim().to_string();
            let price = self.read_price(cell);

            listings.push(RawListing { title, link, price });
        }

        listings
    }

    fn read_price(&self, cell: ElementRef<'_>) -> Price {
        let Some(block) = cell.select(&self.price_current).next() else {
            return Price::Unavailable;
        };

        if element_text(block).to_uppercase().contains(COMING_SOON_MARKER) {
            return Price::Unavailable;
        }

        let dollars = block.select(&self.price_dollars).next().map(element_text);
        let cents = block.select(&self.price_cents).next().map(element_text);

        match (dollars, cents) {
            (Some(dollars), Some(cents)) if !dollars.is_empty() => Price::Listed(format!("{}{}", dollars, cents)),
            _ => Price::Unavailable,
        }
    }

    /// Total number of result pages, read from the `current/total` indicator.
    pub fn page_count(&self, markup: &str, url: &str) -> Result<u32> {
        let document = Html::parse_document(markup);
        let indicator = document
            .select(&self.pagination)
            .next()
            .map(element_text)
            .ok_or_else(|| AppError::pagination(url, "pagination indicator not found"))?;

        let total = indicator
            .rsplit('/')
            .next()
            .map(str::trim)
            .unwrap_or_default();

        match total.parse::<u32>() {
            Ok(0) => Err(AppError::pagination(url, "pagination reports zero pages")),
            Ok(pages) => Ok(pages),
            Err(e) => Err(AppError::pagination(
                url,
                format!("cannot read page total from '{}': {}", indicator, e),
            )),
        }
    }
}
