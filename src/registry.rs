//! Registry of pages interested in reload notifications.
//!
//! The registry is an ordered set: insertion order is preserved and a
//! page appears at most once. The last element is the most recently
//! enabled page, which is the one announced to the server.
//!
//! # Example
//!
//! ```ignore
//! use livereload_agent::PageRegistry;
//!
//! let mut registry = PageRegistry::new();
//! registry.add(page_a.clone());
//! registry.add(page_b.clone());
//!
//! assert_eq!(registry.most_recent(), Some(&page_b));
//! ```

// ============================================================================
// Page
// ============================================================================

/// Caller-owned handle for a browser tab or document.
///
/// Identity is decided by [`PartialEq`]. The agent never interprets a page
/// beyond comparing it and reading its current URL.
pub trait Page: Clone + PartialEq + Send + 'static {
    /// Returns the current absolute URL of the page.
    fn url(&self) -> String;
}

// ============================================================================
// PageRegistry
// ============================================================================

/// Ordered, duplicate-free set of enabled pages.
#[derive(Debug, Clone)]
pub struct PageRegistry<P> {
    pages: Vec<P>,
}

impl<P> Default for PageRegistry<P> {
    fn default() -> Self {
        Self { pages: Vec::new() }
    }
}

impl<P: Page> PageRegistry<P> {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the page unless it is already present.
    pub fn add(&mut self, page: P) {
        if !self.contains(&page) {
            self.pages.push(page);
        }
    }

    /// Removes the page if present.
    ///
    /// Returns `true` if a page was removed.
    pub fn remove(&mut self, page: &P) -> bool {
        match self.pages.iter().position(|p| p == page) {
            Some(index) => {
                self.pages.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if the page is registered.
    #[inline]
    #[must_use]
    pub fn contains(&self, page: &P) -> bool {
        self.pages.iter().any(|p| p == page)
    }

    /// Returns the most recently added page.
    #[inline]
    #[must_use]
    pub fn most_recent(&self) -> Option<&P> {
        self.pages.last()
    }

    /// Clears the registry.
    ///
    /// `on_disabled` is called for every page, most recently added first,
    /// before the registry is emptied.
    pub fn remove_all(&mut self, mut on_disabled: impl FnMut(&P)) {
        for page in self.pages.iter().rev() {
            on_disabled(page);
        }
        self.pages.clear();
    }

    /// Returns the number of registered pages.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns `true` if no page is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterates pages in insertion order.
    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &P> {
        self.pages.iter()
    }

    /// Iterates pages most recently added first.
    #[inline]
    pub fn iter_recent_first(&self) -> impl Iterator<Item = &P> {
        self.pages.iter().rev()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct TestPage(u8);

    impl Page for TestPage {
        fn url(&self) -> String {
            format!("http://localhost/{}", self.0)
        }
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut registry = PageRegistry::new();
        registry.add(TestPage(1));
        registry.add(TestPage(1));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.most_recent(), Some(&TestPage(1)));
    }

    #[test]
    fn test_duplicate_add_keeps_original_position() {
        let mut registry = PageRegistry::new();
        registry.add(TestPage(1));
        registry.add(TestPage(2));
        registry.add(TestPage(1));

        let order: Vec<_> = registry.iter().cloned().collect();
        assert_eq!(order, vec![TestPage(1), TestPage(2)]);
        assert_eq!(registry.most_recent(), Some(&TestPage(2)));
    }

    #[test]
    fn test_remove() {
        let mut registry = PageRegistry::new();
        registry.add(TestPage(1));
        registry.add(TestPage(2));

        assert!(registry.remove(&TestPage(2)));
        assert!(!registry.remove(&TestPage(2)));
        assert!(!registry.contains(&TestPage(2)));
        assert_eq!(registry.most_recent(), Some(&TestPage(1)));
    }

    #[test]
    fn test_most_recent_empty() {
        let registry: PageRegistry<TestPage> = PageRegistry::new();
        assert!(registry.most_recent().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_all_notifies_recent_first() {
        let mut registry = PageRegistry::new();
        registry.add(TestPage(1));
        registry.add(TestPage(2));
        registry.add(TestPage(3));

        let mut disabled = Vec::new();
        registry.remove_all(|page| disabled.push(page.clone()));

        assert_eq!(disabled, vec![TestPage(3), TestPage(2), TestPage(1)]);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_iter_recent_first() {
        let mut registry = PageRegistry::new();
        registry.add(TestPage(1));
        registry.add(TestPage(2));

        let order: Vec<_> = registry.iter_recent_first().map(|p| p.0).collect();
        assert_eq!(order, vec![2, 1]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u8),
        Remove(u8),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..8).prop_map(Op::Add),
            (0u8..8).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn prop_no_duplicates_and_most_recent_tracks_model(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let mut registry = PageRegistry::new();
            let mut model: Vec<u8> = Vec::new();

            for op in ops {
                match op {
                    Op::Add(id) => {
                        registry.add(TestPage(id));
                        if !model.contains(&id) {
                            model.push(id);
                        }
                    }
                    Op::Remove(id) => {
                        let removed = registry.remove(&TestPage(id));
                        let position = model.iter().position(|m| *m == id);
                        prop_assert_eq!(removed, position.is_some());
                        if let Some(index) = position {
                            model.remove(index);
                        }
                    }
                }

                let ids: Vec<u8> = registry.iter().map(|p| p.0).collect();
                let mut deduped = ids.clone();
                deduped.sort_unstable();
                deduped.dedup();
                prop_assert_eq!(deduped.len(), ids.len());
                prop_assert_eq!(&ids, &model);
                prop_assert_eq!(registry.most_recent().map(|p| p.0), model.last().copied());
            }
        }
    }
}
