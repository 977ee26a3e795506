//! HTML extraction for the airfoil scrapers
//!
//! Pure functions over fetched page content: finding `.dat` download links on
//! a listing page, pulling coordinate and polar blocks out of detail pages,
//! resolving relative links and turning display names into safe file names.

use regex::Regex;
use scraper::{Html, Selector as CssSelector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/*?:"<>|]"#).expect("filename pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScrapeError {
    #[error("Invalid CSS selector '{0}'")]
    InvalidSelector(String),

    #[error("Invalid URL {0}")]
    InvalidUrl(String),
}

/// A hyperlink found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub text: String,
}

/// CSS selectors used to read the airfoil detail site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailSelectors {
    /// Links from the listing page to each airfoil detail page
    pub listing: String,
    /// Airfoil display name on a detail page
    pub title: String,
    /// Coordinate block on a detail page
    pub coordinates: String,
    /// Links from a detail page to its polar pages
    pub polar_link: String,
    /// Data block on a polar page
    pub polar_data: String,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            listing: r#"a[href*="airfoil/details"]"#.to_string(),
            title: "h1".to_string(),
            coordinates: "pre".to_string(),
            polar_link: r#"a[href*="polar/details"]"#.to_string(),
            polar_data: "pre".to_string(),
        }
    }
}

/// What a detail page yielded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPage {
    pub title: Option<String>,
    pub coordinates: Option<String>,
    pub polar_links: Vec<Link>,
}

fn parse_selector(selector: &str) -> Result<CssSelector, ScrapeError> {
    CssSelector::parse(selector).map_err(|_| ScrapeError::InvalidSelector(selector.to_string()))
}

/// Replace characters that are not allowed in file names with `_`
///
/// Only `\ / * ? : " < > |` are replaced; everything else is kept as is.
pub fn sanitize_filename(name: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(name, "_").into_owned()
}

/// All links matching `selector` that carry an `href`
pub fn select_links(html: &str, selector: &str) -> Result<Vec<Link>, ScrapeError> {
    let document = Html::parse_document(html);
    let selector = parse_selector(selector)?;

    Ok(document
        .select(&selector)
        .filter_map(|el| {
            el.value().attr("href").map(|href| Link {
                href: href.trim().to_string(),
                text: el.text().collect::<String>().trim().to_string(),
            })
        })
        .collect())
}

/// Text of the first element matching `selector`, trimmed
///
/// Returns `None` when nothing matches or the element is empty.
pub fn select_block(html: &str, selector: &str) -> Result<Option<String>, ScrapeError> {
    let document = Html::parse_document(html);
    let selector = parse_selector(selector)?;

    Ok(document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty()))
}

/// `href`s of every anchor ending in `.dat`, without duplicates, in page order
pub fn extract_dat_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = CssSelector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .filter(|href| href.ends_with(".dat"))
        .filter(|href| seen.insert(href.to_string()))
        .map(|href| href.to_string())
        .collect()
}

/// Read a detail page using the given selectors
pub fn parse_detail_page(
    html: &str,
    selectors: &DetailSelectors,
) -> Result<DetailPage, ScrapeError> {
    Ok(DetailPage {
        title: select_block(html, &selectors.title)?,
        coordinates: select_block(html, &selectors.coordinates)?,
        polar_links: select_links(html, &selectors.polar_link)?,
    })
}

/// Resolve `href` against the page it was found on
pub fn resolve_url(base: &str, href: &str) -> Result<String, ScrapeError> {
    let base = Url::parse(base).map_err(|e| ScrapeError::InvalidUrl(format!("{base}: {e}")))?;
    base.join(href)
        .map(String::from)
        .map_err(|e| ScrapeError::InvalidUrl(format!("{href}: {e}")))
}

/// Last path segment of a URL, without query or fragment
pub fn file_name_from_url(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    url.path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
}
