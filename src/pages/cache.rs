use super::{placeholder, CachePolicy, ContentProvider, Page};
use ratatui::layout::Size;
use ratatui::text::Text;
use std::collections::HashMap;
use tracing::warn;

/// Per-session store of produced page content.
///
/// Entries are never replaced or removed once written. Only pages with
/// [`CachePolicy::CacheOnce`] are stored, and only when production succeeded,
/// so a failed page is retried on its next visit.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: HashMap<Page, Text<'static>>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce every cache-once page up front.
    pub fn warm(&mut self, provider: &dyn ContentProvider, viewport: Size) {
        for page in Page::ALL {
            if page.policy() == CachePolicy::CacheOnce {
                self.resolve(provider, page, viewport);
            }
        }
    }

    /// Return the content for `page`, honoring its cache policy.
    ///
    /// Provider failures become the page placeholder.
    pub fn resolve(
        &mut self,
        provider: &dyn ContentProvider,
        page: Page,
        viewport: Size,
    ) -> Text<'static> {
        match page.policy() {
            CachePolicy::CacheOnce => {
                if let Some(text) = self.entries.get(&page) {
                    return text.clone();
                }
                match provider.produce(page, viewport) {
                    Ok(text) => {
                        self.entries.insert(page, text.clone());
                        text
                    }
                    Err(err) => {
                        warn!(?page, error = %err, "content unavailable, showing placeholder");
                        placeholder(page)
                    }
                }
            }
            CachePolicy::Recompute => provider.produce(page, viewport).unwrap_or_else(|err| {
                warn!(?page, error = %err, "content unavailable, showing placeholder");
                placeholder(page)
            }),
        }
    }

    pub fn get(&self, page: Page) -> Option<&Text<'static>> {
        self.entries.get(&page)
    }

    pub fn contains(&self, page: Page) -> bool {
        self.entries.contains_key(&page)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers differently on every call so cache hits are observable.
    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl ContentProvider for CountingProvider {
        fn produce(&self, page: Page, _viewport: Size) -> Result<Text<'static>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Text::from(format!("{} #{}", page.title(), n)))
        }
    }

    struct FailingProvider;

    impl ContentProvider for FailingProvider {
        fn produce(&self, page: Page, _viewport: Size) -> Result<Text<'static>> {
            Err(Error::content(page, "backend offline"))
        }
    }

    fn size() -> Size {
        Size::new(80, 20)
    }

    #[test]
    fn test_cache_once_returns_identical_text() {
        let provider = CountingProvider::default();
        let mut cache = ContentCache::new();

        let first = cache.resolve(&provider, Page::Projects, size());
        let second = cache.resolve(&provider, Page::Projects, size());

        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_recompute_calls_provider_every_time() {
        let provider = CountingProvider::default();
        let mut cache = ContentCache::new();

        let first = cache.resolve(&provider, Page::About, size());
        let second = cache.resolve(&provider, Page::About, size());

        assert_ne!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
        assert!(!cache.contains(Page::About));
    }

    #[test]
    fn test_warm_fills_only_cache_once_pages() {
        let provider = CountingProvider::default();
        let mut cache = ContentCache::new();
        cache.warm(&provider, size());

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(Page::Projects));
        assert!(cache.contains(Page::Resume));
        assert!(!cache.contains(Page::Home));
    }

    #[test]
    fn test_failure_falls_back_to_placeholder_and_is_not_cached() {
        let mut cache = ContentCache::new();
        let text = cache.resolve(&FailingProvider, Page::Resume, size());

        assert_eq!(text, placeholder(Page::Resume));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_failure_on_recompute_page_uses_placeholder() {
        let mut cache = ContentCache::new();
        let text = cache.resolve(&FailingProvider, Page::Home, size());
        assert_eq!(text, placeholder(Page::Home));
    }
}
