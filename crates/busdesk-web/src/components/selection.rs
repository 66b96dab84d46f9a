//! Row selection tracking for controlled and uncontrolled tables
//!
//! In controlled mode the caller owns the set and passes it in on every
//! render; the tracker only computes the next set and hands it back. In
//! uncontrolled mode the tracker keeps the set itself.

use std::collections::BTreeSet;

/// Set of selected row identifiers
pub type SelectionSet = BTreeSet<String>;

/// Header checkbox state for the rows on the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelection {
    /// No page row is selected
    None,
    /// Some but not all page rows are selected
    Partial,
    /// Every page row is selected
    All,
}

impl PageSelection {
    /// Compute the header state for `page_ids` against `selected`
    #[must_use]
    pub fn of(selected: &SelectionSet, page_ids: &[String]) -> Self {
        let hits = page_ids.iter().filter(|id| selected.contains(*id)).count();
        if page_ids.is_empty() || hits == 0 {
            Self::None
        } else if hits == page_ids.len() {
            Self::All
        } else {
            Self::Partial
        }
    }
}

/// Selection tracker backing the table's checkbox column
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    internal: SelectionSet,
}

impl SelectionTracker {
    /// Create an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The set in effect: `external` when controlled, the internal one otherwise
    #[must_use]
    pub fn current<'a>(&'a self, external: Option<&'a SelectionSet>) -> &'a SelectionSet {
        external.unwrap_or(&self.internal)
    }

    /// Flip one row and return the new set
    pub fn toggle_row(&mut self, external: Option<&SelectionSet>, id: &str) -> SelectionSet {
        let mut next = self.current(external).clone();
        if !next.remove(id) {
            next.insert(id.to_string());
        }
        self.store(external, next)
    }

    /// "Select all" for the rows on the current page
    ///
    /// Controlled: removes the page ids when all are selected, otherwise
    /// unions them in; ids from other pages are kept. Uncontrolled: clears
    /// when all are selected, otherwise replaces the set with the page ids.
    /// A page without selectable rows leaves the selection untouched.
    pub fn toggle_page(&mut self, external: Option<&SelectionSet>, page_ids: &[String]) -> SelectionSet {
        let current = self.current(external);
        if page_ids.is_empty() {
            return current.clone();
        }
        let all_selected = PageSelection::of(current, page_ids) == PageSelection::All;

        let next = match (external, all_selected) {
            (Some(selected), true) => selected
                .iter()
                .filter(|id| !page_ids.contains(*id))
                .cloned()
                .collect(),
            (Some(selected), false) => {
                let mut next = selected.clone();
                next.extend(page_ids.iter().cloned());
                next
            }
            (None, true) => SelectionSet::new(),
            (None, false) => page_ids.iter().cloned().collect(),
        };
        self.store(external, next)
    }

    /// Drop every selection and return the empty set
    pub fn clear(&mut self, external: Option<&SelectionSet>) -> SelectionSet {
        self.store(external, SelectionSet::new())
    }

    fn store(&mut self, external: Option<&SelectionSet>, next: SelectionSet) -> SelectionSet {
        if external.is_none() {
            self.internal.clone_from(&next);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn set(values: &[&str]) -> SelectionSet {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_select_all_then_deselect_uncontrolled() {
        let mut tracker = SelectionTracker::new();
        let page = ids(&["a", "b", "c"]);

        let selected = tracker.toggle_page(None, &page);
        assert_eq!(selected, set(&["a", "b", "c"]));
        assert_eq!(tracker.current(None), &selected);

        let selected = tracker.toggle_page(None, &page);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_select_all_then_deselect_controlled() {
        let mut tracker = SelectionTracker::new();
        let page = ids(&["a", "b"]);

        let selected = tracker.toggle_page(Some(&SelectionSet::new()), &page);
        assert_eq!(selected, set(&["a", "b"]));

        let selected = tracker.toggle_page(Some(&selected), &page);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_controlled_select_all_keeps_other_pages() {
        let mut tracker = SelectionTracker::new();
        let external = set(&["p1-row"]);
        let page = ids(&["p2-a", "p2-b"]);

        let selected = tracker.toggle_page(Some(&external), &page);
        assert_eq!(selected, set(&["p1-row", "p2-a", "p2-b"]));

        let selected = tracker.toggle_page(Some(&selected), &page);
        assert_eq!(selected, set(&["p1-row"]));
    }

    #[test]
    fn test_uncontrolled_select_all_replaces_previous_selection() {
        let mut tracker = SelectionTracker::new();
        tracker.toggle_row(None, "old");

        let selected = tracker.toggle_page(None, &ids(&["a", "b"]));
        assert_eq!(selected, set(&["a", "b"]));
    }

    #[test]
    fn test_controlled_mode_does_not_touch_internal_state() {
        let mut tracker = SelectionTracker::new();
        let external = SelectionSet::new();

        let selected = tracker.toggle_row(Some(&external), "a");
        assert_eq!(selected, set(&["a"]));
        assert!(tracker.current(None).is_empty());
    }

    #[test]
    fn test_toggle_row_flips() {
        let mut tracker = SelectionTracker::new();
        assert_eq!(tracker.toggle_row(None, "a"), set(&["a"]));
        assert_eq!(tracker.toggle_row(None, "b"), set(&["a", "b"]));
        assert_eq!(tracker.toggle_row(None, "a"), set(&["b"]));
    }

    #[test]
    fn test_partial_page_is_completed_by_select_all() {
        let mut tracker = SelectionTracker::new();
        let page = ids(&["a", "b"]);
        let external = set(&["a"]);

        assert_eq!(PageSelection::of(&external, &page), PageSelection::Partial);
        let selected = tracker.toggle_page(Some(&external), &page);
        assert_eq!(PageSelection::of(&selected, &page), PageSelection::All);
    }

    #[test]
    fn test_select_all_on_empty_page_keeps_selection() {
        let mut tracker = SelectionTracker::new();
        tracker.toggle_row(None, "elsewhere");

        assert_eq!(tracker.toggle_page(None, &[]), set(&["elsewhere"]));
        assert_eq!(tracker.current(None), &set(&["elsewhere"]));

        let external = set(&["p1-row"]);
        assert_eq!(tracker.toggle_page(Some(&external), &[]), external);
    }

    #[test]
    fn test_page_selection_on_empty_page() {
        assert_eq!(PageSelection::of(&set(&["a"]), &[]), PageSelection::None);
    }

    #[test]
    fn test_clear() {
        let mut tracker = SelectionTracker::new();
        tracker.toggle_row(None, "a");
        assert!(tracker.clear(None).is_empty());
        assert!(tracker.current(None).is_empty());
    }
}
