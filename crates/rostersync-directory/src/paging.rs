//! Pagination draining
//!
//! Vendor directories return listings one page at a time, each page carrying
//! an opaque token for the next one. [`PagingAccumulator`] follows those
//! tokens until the provider stops returning one and hands back every item
//! in provider order.
//!
//! ## Failure model
//!
//! A failed page aborts the whole listing. No partial result is returned and
//! nothing is retried here; the caller treats the error as fatal.
//!
//! Two provider misbehaviours are also reported as fetch failures instead of
//! looping forever:
//! - a page whose next token equals the token that requested it
//! - a listing longer than the configured page limit

use std::future::Future;

use rostersync_core::config::DirectoryConfig;
use rostersync_core::domain::PageToken;
use rostersync_core::ports::{Page, ProviderError, ProviderResult};
use tracing::debug;

use crate::{DirectoryError, DirectoryResult};

/// Drains a token-paginated listing into a single `Vec`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingAccumulator {
    max_pages: u32,
}

impl Default for PagingAccumulator {
    fn default() -> Self {
        Self::from_config(&DirectoryConfig::default())
    }
}

impl PagingAccumulator {
    /// Creates an accumulator that gives up after `max_pages` pages
    pub fn new(max_pages: u32) -> Self {
        Self { max_pages }
    }

    pub fn from_config(config: &DirectoryConfig) -> Self {
        Self::new(config.max_pages)
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Fetches every page of a listing and concatenates the items
    ///
    /// `fetch` is called with `None` for the first page and with the previous
    /// page's next token afterwards.
    ///
    /// # Arguments
    ///
    /// * `operation` - Listing name, used in logs and errors
    /// * `fetch` - Fetches a single page
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::ProviderFetchFailed`] if any page fails, if
    /// the provider hands back the token it was given, or if the listing
    /// exceeds the page limit.
    pub async fn collect<T, F, Fut>(&self, operation: &str, mut fetch: F) -> DirectoryResult<Vec<T>>
    where
        F: FnMut(Option<PageToken>) -> Fut,
        Fut: Future<Output = ProviderResult<Page<T>>>,
    {
        let mut items = Vec::new();
        let mut token: Option<PageToken> = None;
        let mut page_count: u32 = 0;

        loop {
            if page_count >= self.max_pages {
                return Err(fetch_failed(
                    operation,
                    ProviderError::InvalidResponse(format!(
                        "listing exceeded {} pages",
                        self.max_pages
                    )),
                ));
            }
            page_count += 1;

            let page = fetch(token.clone())
                .await
                .map_err(|source| fetch_failed(operation, source))?;

            debug!(
                operation,
                page = page_count,
                items = page.items.len(),
                has_next = page.next_token.is_some(),
                "Received page"
            );

            items.extend(page.items);

            match page.next_token {
                None => break,
                Some(next) if token.as_ref() == Some(&next) => {
                    return Err(fetch_failed(
                        operation,
                        ProviderError::InvalidResponse(format!(
                            "page token '{}' did not advance",
                            next
                        )),
                    ));
                }
                Some(next) => token = Some(next),
            }
        }

        debug!(
            operation,
            total_pages = page_count,
            total_items = items.len(),
            "Listing complete"
        );

        Ok(items)
    }
}

fn fetch_failed(operation: &str, source: ProviderError) -> DirectoryError {
    DirectoryError::ProviderFetchFailed {
        operation: operation.to_string(),
        source,
    }
}
