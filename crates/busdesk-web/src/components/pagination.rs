//! Pagination controller for navigating through list pages

use busdesk_core::PaginationState;

/// Page sizes offered by the footer selector
pub const DEFAULT_LIMIT_OPTIONS: [u32; 4] = [10, 20, 50, 100];

/// Largest page count shown without ellipses
const FULL_WINDOW: u32 = 7;

/// One entry in the page strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    /// Numbered page button
    Page(u32),
    /// Non-interactive gap marker
    Ellipsis,
}

/// Navigation request from the page strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageIntent {
    /// Jump to page 1
    First,
    /// One page back
    Previous,
    /// One page forward
    Next,
    /// Jump to the last page
    Last,
    /// Jump to a numbered page
    Goto(u32),
}

/// Compute the visible page strip for `page` out of `pages`
#[must_use]
pub fn page_window(page: u32, pages: u32) -> Vec<PageItem> {
    if pages <= FULL_WINDOW {
        return (1..=pages).map(PageItem::Page).collect();
    }

    let mut items = vec![PageItem::Page(1)];
    if page > 3 {
        items.push(PageItem::Ellipsis);
    }
    let start = page.saturating_sub(1).max(2);
    let end = page.saturating_add(1).min(pages - 1);
    items.extend((start..=end).map(PageItem::Page));
    if page < pages - 2 {
        items.push(PageItem::Ellipsis);
    }
    items.push(PageItem::Page(pages));
    items
}

/// Page strip with its navigation buttons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageStrip {
    /// Current page, highlighted in the strip
    pub current: u32,
    /// Numbered buttons and gaps
    pub items: Vec<PageItem>,
    /// "First" button enabled
    pub first: bool,
    /// "Previous" button enabled
    pub previous: bool,
    /// "Next" button enabled
    pub next: bool,
    /// "Last" button enabled
    pub last: bool,
}

/// Table footer: summary, page-size selector and optional page strip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterView {
    /// "Showing X to Y of Z results"
    pub summary: String,
    /// Selected page size
    pub limit: u32,
    /// Page sizes offered
    pub limit_options: Vec<u32>,
    /// Page strip, present only when there is more than one page
    pub strip: Option<PageStrip>,
}

/// Stateless view over a [`PaginationState`]
#[derive(Debug, Clone, Copy)]
pub struct PaginationController<'a> {
    state: &'a PaginationState,
}

impl<'a> PaginationController<'a> {
    /// Wrap the given pagination state
    #[must_use]
    pub const fn new(state: &'a PaginationState) -> Self {
        Self { state }
    }

    /// Whether First/Previous are enabled
    #[must_use]
    pub const fn can_go_back(&self) -> bool {
        self.state.page > 1
    }

    /// Whether Next/Last are enabled
    #[must_use]
    pub const fn can_go_forward(&self) -> bool {
        self.state.page < self.state.pages
    }

    /// Visible page strip
    #[must_use]
    pub fn window(&self) -> Vec<PageItem> {
        page_window(self.state.page, self.state.pages)
    }

    /// Resolve a navigation intent to the target page
    ///
    /// Returns `None` when the button is disabled or the target is the
    /// current page.
    #[must_use]
    pub fn resolve(&self, intent: PageIntent) -> Option<u32> {
        let PaginationState { page, pages, .. } = *self.state;
        match intent {
            PageIntent::First => self.can_go_back().then_some(1),
            PageIntent::Previous => self.can_go_back().then(|| page - 1),
            PageIntent::Next => self.can_go_forward().then(|| page + 1),
            PageIntent::Last => self.can_go_forward().then_some(pages),
            PageIntent::Goto(target) => {
                ((1..=pages).contains(&target) && target != page).then_some(target)
            }
        }
    }

    /// "Showing {start} to {end} of {total} results"
    #[must_use]
    pub fn summary(&self) -> String {
        let PaginationState {
            page, limit, total, ..
        } = *self.state;
        if total == 0 {
            return "Showing 0 to 0 of 0 results".to_string();
        }
        let start = self.state.offset() + 1;
        let end = (u64::from(page) * u64::from(limit)).min(total);
        format!("Showing {start} to {end} of {total} results")
    }

    /// Build the footer, or `None` when there is nothing to paginate
    #[must_use]
    pub fn footer(&self, limit_options: &[u32]) -> Option<FooterView> {
        if self.state.pages == 0 {
            return None;
        }
        let strip = (self.state.pages > 1).then(|| PageStrip {
            current: self.state.page,
            items: self.window(),
            first: self.can_go_back(),
            previous: self.can_go_back(),
            next: self.can_go_forward(),
            last: self.can_go_forward(),
        });
        Some(FooterView {
            summary: self.summary(),
            limit: self.state.limit,
            limit_options: limit_options.to_vec(),
            strip,
        })
    }
}
