//! Request review store: the current page of received requests.

use crate::domain::{ConnectionRequest, RequestPage};

/// Holds one page of received requests together with its pagination
/// metadata. The page is always replaced as a whole.
#[derive(Debug, Clone, Default)]
pub struct RequestReviewStore {
    page: RequestPage,
}

impl RequestReviewStore {
    /// Replaces items and metadata in one step so the view never sees a page
    /// whose counts don't match its items.
    pub fn set_page(&mut self, page: RequestPage) {
        self.page = page;
    }

    /// Local removal without a refetch. The review flow refetches instead;
    /// this keeps `items` and `total_items` consistent when used.
    pub fn remove_by_id(&mut self, id: &str) -> Option<ConnectionRequest> {
        let index = self.page.items.iter().position(|r| r.id == id)?;
        let removed = self.page.items.remove(index);
        self.page.total_items = self.page.total_items.saturating_sub(1);
        Some(removed)
    }

    pub fn items(&self) -> &[ConnectionRequest] {
        &self.page.items
    }

    pub fn total_items(&self) -> u32 {
        self.page.total_items
    }

    pub fn current_page(&self) -> u32 {
        self.page.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.page.total_pages
    }

    pub fn page(&self) -> &RequestPage {
        &self.page
    }
}
