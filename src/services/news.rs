// src/services/news.rs

//! News markup extractor.
//!
//! Looks for the containers news sites put their story in (schema.org
//! `articleBody`, `<article>`, common CMS classes), keeps the paragraphs that
//! are not part of page chrome, and reads the publication date from JSON-LD,
//! meta tags or `<time>` elements.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use super::{Extractor, parse_selector};
use crate::error::StageError;
use crate::models::{ExtractionMethod, StageOutcome};
use crate::utils::{http, normalize_whitespace};

/// Story containers, most specific first.
const CONTAINER_SELECTORS: &[&str] = &[
    "[itemprop=\"articleBody\"]",
    "article",
    ".article-body",
    ".article__body",
    ".article-content",
    ".story-body",
    ".entry-content",
    ".post-content",
    "main",
];

/// Elements whose paragraphs are never story text.
const BOILERPLATE_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "aside", "footer", "header", "figure", "figcaption",
    "form",
];

const NOISE_CLASS_HINTS: &[&str] = &[
    "related",
    "share",
    "social",
    "newsletter",
    "comment",
    "promo",
    "advert",
];

/// Meta keys carrying a publication date, in priority order. Lowercased.
const DATE_META_KEYS: &[&str] = &[
    "article:published_time",
    "og:published_time",
    "datepublished",
    "pubdate",
    "publishdate",
    "publish-date",
    "dc.date.issued",
    "dc.date",
    "dcterms.created",
    "parsely-pub-date",
    "sailthru.date",
    "date",
];

/// Stage A: news-style article extraction.
pub struct NewsExtractor {
    client: Client,
}

impl NewsExtractor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Extract story text and raw date from an already fetched page.
    pub fn extract_from_html(html: &str) -> Result<StageOutcome, StageError> {
        let document = Html::parse_document(html);
        let p_sel = parse_selector("p")?;

        let mut best: Vec<String> = Vec::new();
        let mut best_len = 0;
        for selector in CONTAINER_SELECTORS {
            let container_sel = parse_selector(selector)?;
            for container in document.select(&container_sel) {
                let paragraphs = Self::collect_paragraphs(&container, &p_sel);
                let len: usize = paragraphs.iter().map(|p| p.chars().count()).sum();
                if len > best_len {
                    best_len = len;
                    best = paragraphs;
                }
            }
        }

        if best.is_empty() {
            // No recognizable container; fall back to every paragraph on the page.
            best = Self::collect_paragraphs(&document.root_element(), &p_sel);
        }

        if best.is_empty() {
            return Err(StageError::parse("no article paragraphs found"));
        }

        let raw_date = Self::find_date(&document)?;
        Ok(StageOutcome::new(Some(best.join("\n\n")), raw_date))
    }

    fn collect_paragraphs(container: &ElementRef<'_>, p_sel: &Selector) -> Vec<String> {
        container
            .select(p_sel)
            .filter(|p| !Self::is_boilerplate(p))
            .map(|p| normalize_whitespace(&p.text().collect::<String>()))
            .filter(|text| !text.is_empty())
            .collect()
    }

    fn is_boilerplate(element: &ElementRef<'_>) -> bool {
        element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| {
                let value = ancestor.value();
                if BOILERPLATE_TAGS.contains(&value.name()) {
                    return true;
                }
                value.attr("class").is_some_and(|class| {
                    let class = class.to_lowercase();
                    NOISE_CLASS_HINTS.iter().any(|hint| class.contains(hint))
                })
            })
    }

    /// JSON-LD first, then meta tags, then `<time>` elements.
    fn find_date(document: &Html) -> Result<Option<String>, StageError> {
        if let Some(date) = Self::json_ld_date(document)? {
            return Ok(Some(date));
        }
        if let Some(date) = Self::meta_date(document)? {
            return Ok(Some(date));
        }
        Self::time_element_date(document)
    }

    fn json_ld_date(document: &Html) -> Result<Option<String>, StageError> {
        let script_sel = parse_selector("script[type=\"application/ld+json\"]")?;
        let date = document.select(&script_sel).find_map(|script| {
            let content = script.text().collect::<String>();
            let value: Value = serde_json::from_str(content.trim()).ok()?;
            Self::find_date_published(&value)
        });
        Ok(date)
    }

    fn find_date_published(value: &Value) -> Option<String> {
        match value {
            Value::Object(map) => map
                .get("datePublished")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .or_else(|| map.values().find_map(Self::find_date_published)),
            Value::Array(items) => items.iter().find_map(Self::find_date_published),
            _ => None,
        }
    }

    fn meta_date(document: &Html) -> Result<Option<String>, StageError> {
        let meta_sel = parse_selector("meta[content]")?;
        let mut values: HashMap<String, String> = HashMap::new();

        for meta in document.select(&meta_sel) {
            let element = meta.value();
            let Some(content) = element.attr("content").map(str::trim) else {
                continue;
            };
            if content.is_empty() {
                continue;
            }
            for key_attr in ["property", "name", "itemprop"] {
                if let Some(key) = element.attr(key_attr) {
                    values
                        .entry(key.trim().to_lowercase())
                        .or_insert_with(|| content.to_string());
                }
            }
        }

        Ok(DATE_META_KEYS
            .iter()
            .find_map(|key| values.get(*key).cloned()))
    }

    fn time_element_date(document: &Html) -> Result<Option<String>, StageError> {
        let time_sel = parse_selector("time")?;
        let date = document.select(&time_sel).find_map(|time| {
            let raw = time
                .value()
                .attr("datetime")
                .map(str::to_string)
                .unwrap_or_else(|| normalize_whitespace(&time.text().collect::<String>()));
            (!raw.trim().is_empty()).then(|| raw.trim().to_string())
        });
        Ok(date)
    }
}

#[async_trait]
impl Extractor for NewsExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::News
    }

    async fn try_extract(&self, url: &str) -> Result<StageOutcome, StageError> {
        let html = http::fetch_html(&self.client, url).await?;
        Self::extract_from_html(&html)
    }
}
