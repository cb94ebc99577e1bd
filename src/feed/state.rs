use crate::models::{CategoryFilter, Post};

/// The client's view of one page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    /// Posts of the loaded page, newest submissions prepended.
    pub posts: Vec<Post>,
    /// Current page number (1-based).
    pub page: u32,
    /// Server-reported page count. Never recomputed locally.
    pub total_pages: u32,
    pub filter: CategoryFilter,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            page: 1,
            total_pages: 0,
            filter: CategoryFilter::All,
        }
    }
}

impl FeedState {
    /// Posts of the loaded page that match the active filter.
    pub fn visible(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|post| self.filter.matches(post))
    }

    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }

    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        (self.page < self.total_pages).then(|| self.page + 1)
    }

    #[must_use]
    pub fn prev_page(&self) -> Option<u32> {
        (self.page > 1).then(|| self.page - 1)
    }
}
