// src/services/discovery.rs

//! Program listing discovery.
//!
//! Walks the fixed set of paginated listing pages and collects program
//! references from anchors pointing at detail pages. One discovery pass
//! per invocation; nothing is persisted between pages.

use regex::Regex;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{ProgramRef, SourceProfile};
use crate::utils::PageFetcher;

/// Discovers programs on a source's listing pages.
pub struct ProgramDiscoverer<'a> {
    fetcher: &'a dyn PageFetcher,
    source: &'a SourceProfile,
    anchor_selector: Selector,
    id_pattern: Regex,
}

impl<'a> ProgramDiscoverer<'a> {
    /// Build a discoverer for one source profile.
    pub fn new(fetcher: &'a dyn PageFetcher, source: &'a SourceProfile) -> Result<Self> {
        let selector_str = format!("a[href*=\"{}\"]", source.detail_path);
        let anchor_selector = Selector::parse(&selector_str)
            .map_err(|e| AppError::selector(&selector_str, format!("{e:?}")))?;
        let id_pattern = Regex::new(&format!(r"{}(\d+)", regex::escape(&source.detail_path)))
            .map_err(|e| AppError::discovery(format!("bad detail path pattern: {e}")))?;

        Ok(Self {
            fetcher,
            source,
            anchor_selector,
            id_pattern,
        })
    }

    /// Walk all listing pages and accumulate program references.
    ///
    /// Any page failure is fatal to the whole run. Duplicate ids across
    /// pages are kept: downstream course resolution is keyed by natural
    /// key, so redundant discoveries only produce redundant work.
    pub async fn discover(&self) -> Result<Vec<ProgramRef>> {
        let mut programs = Vec::new();

        for page in 1..=self.source.listing_pages {
            let url = self.source.listing_url(page);
            log::debug!(
                "Fetching listing page {page}/{}: {url}",
                self.source.listing_pages
            );
            let markup = self
                .fetcher
                .fetch(&url)
                .await
                .map_err(|e| AppError::discovery(format!("listing page {page} ({url}): {e}")))?;

            let found = self.scan_listing(&markup);
            log::debug!("Listing page {page}: {} programs", found.len());
            programs.extend(found);
        }

        Ok(programs)
    }

    /// Extract program references from one listing page's markup.
    ///
    /// Anchors matching the detail-link pattern but without an extractable
    /// numeric id are skipped, not treated as page failures.
    fn scan_listing(&self, markup: &str) -> Vec<ProgramRef> {
        let document = Html::parse_document(markup);
        document
            .select(&self.anchor_selector)
            .filter_map(|anchor| {
                let href = anchor.value().attr("href")?;
                let id = self
                    .id_pattern
                    .captures(href)?
                    .get(1)?
                    .as_str()
                    .to_string();
                let name: String = anchor.text().collect();

                Some(ProgramRef {
                    detail_url: self.source.detail_url(&id),
                    export_url: self.source.export_url(&id),
                    name: name.split_whitespace().collect::<Vec<_>>().join(" "),
                    id,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::models::Config;

    struct ScriptedFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::network(url, "connection refused"))
        }
    }

    fn source() -> SourceProfile {
        let mut source = Config::default().sources[0].clone();
        source.listing_pages = 2;
        source
    }

    fn listing_markup(anchors: &str) -> String {
        format!("<html><body><ul>{anchors}</ul></body></html>")
    }

    #[tokio::test]
    async fn discovers_programs_across_pages() {
        let source = source();
        let fetcher = ScriptedFetcher {
            pages: HashMap::from([
                (
                    "https://rozvrhy.ff.cuni.cz/".to_string(),
                    listing_markup(
                        r#"<li><a href="/ft/detail/101">Archeologie </a></li>
                           <li><a href="/ft/detail/102">Bohemistika</a></li>
                           <li><a href="/other/5">Unrelated</a></li>"#,
                    ),
                ),
                (
                    "https://rozvrhy.ff.cuni.cz/?page=2".to_string(),
                    listing_markup(r#"<li><a href="/ft/detail/103">Filozofie</a></li>"#),
                ),
            ]),
        };

        let discoverer = ProgramDiscoverer::new(&fetcher, &source).unwrap();
        let programs = discoverer.discover().await.unwrap();

        assert_eq!(programs.len(), 3);
        assert_eq!(programs[0].id, "101");
        assert_eq!(programs[0].name, "Archeologie");
        assert_eq!(
            programs[0].detail_url,
            "https://rozvrhy.ff.cuni.cz/ft/detail/101"
        );
        assert_eq!(
            programs[0].export_url,
            "https://rozvrhy.ff.cuni.cz/export/xls/101"
        );
        assert_eq!(programs[2].id, "103");
    }

    #[tokio::test]
    async fn skips_anchors_without_numeric_id() {
        let source = source();
        let fetcher = ScriptedFetcher {
            pages: HashMap::from([
                (
                    "https://rozvrhy.ff.cuni.cz/".to_string(),
                    listing_markup(
                        r#"<li><a href="/ft/detail/abc">Bez čísla</a></li>
                           <li><a href="/ft/detail/200">S číslem</a></li>"#,
                    ),
                ),
                (
                    "https://rozvrhy.ff.cuni.cz/?page=2".to_string(),
                    listing_markup(""),
                ),
            ]),
        };

        let discoverer = ProgramDiscoverer::new(&fetcher, &source).unwrap();
        let programs = discoverer.discover().await.unwrap();
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0].id, "200");
    }

    #[tokio::test]
    async fn duplicate_ids_across_pages_are_kept() {
        let source = source();
        let anchor = r#"<li><a href="/ft/detail/300">Historie</a></li>"#;
        let fetcher = ScriptedFetcher {
            pages: HashMap::from([
                (
                    "https://rozvrhy.ff.cuni.cz/".to_string(),
                    listing_markup(anchor),
                ),
                (
                    "https://rozvrhy.ff.cuni.cz/?page=2".to_string(),
                    listing_markup(anchor),
                ),
            ]),
        };

        let discoverer = ProgramDiscoverer::new(&fetcher, &source).unwrap();
        let programs = discoverer.discover().await.unwrap();
        assert_eq!(programs.len(), 2);
        assert_eq!(programs[0].id, programs[1].id);
    }

    #[tokio::test]
    async fn page_failure_is_a_discovery_error() {
        let source = source();
        let fetcher = ScriptedFetcher {
            pages: HashMap::from([(
                "https://rozvrhy.ff.cuni.cz/".to_string(),
                listing_markup(""),
            )]),
        };

        let discoverer = ProgramDiscoverer::new(&fetcher, &source).unwrap();
        let result = discoverer.discover().await;
        assert!(matches!(result, Err(AppError::Discovery(_))));
    }
}
