//! Ordered selection set shared by the list-like widgets.

/// An ordered set of selected items with single/multiple mode.
///
/// With `required` set, the last remaining selected item cannot be removed.
/// `toggle` makes a repeated choose deselect instead of reselect.
#[derive(Debug, Clone)]
pub struct Selection<T> {
    items: Vec<T>,
    multiple: bool,
    required: bool,
    toggle: bool,
    last: Option<T>,
}

impl<T: PartialEq + Clone> Selection<T> {
    /// Creates an empty single-mode selection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            multiple: false,
            required: false,
            toggle: false,
            last: None,
        }
    }

    /// Allows more than one selected item.
    pub fn set_multiple(&mut self, multiple: bool) {
        self.multiple = multiple;
    }

    /// Requires at least one item to stay selected.
    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    /// Returns the required flag.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Makes a repeated choose deselect the item.
    pub fn set_toggle(&mut self, toggle: bool) {
        self.toggle = toggle;
    }

    /// Applies click semantics to an item. Returns true if the selection
    /// changed.
    pub fn choose(&mut self, item: T) -> bool {
        if self.contains(&item) {
            if self.toggle && (!self.required || self.items.len() > 1) {
                self.items.retain(|i| i != &item);
                return true;
            }
            if !self.multiple && self.items.len() > 1 {
                // Collapse a multi-selection onto the chosen item.
                self.items.clear();
                self.items.push(item.clone());
                self.last = Some(item);
                return true;
            }
            return false;
        }
        if !self.multiple {
            self.items.clear();
        }
        self.items.push(item.clone());
        self.last = Some(item);
        true
    }

    /// Replaces the selection with a single item.
    pub fn set(&mut self, item: T) {
        self.items.clear();
        self.items.push(item.clone());
        self.last = Some(item);
    }

    /// Adds an item (no-op if already selected).
    pub fn add(&mut self, item: T) {
        if !self.contains(&item) {
            if !self.multiple {
                self.items.clear();
            }
            self.items.push(item.clone());
            self.last = Some(item);
        }
    }

    /// Removes an item. Refused (returns false) when it is the last selected
    /// item and the selection is required.
    pub fn remove(&mut self, item: &T) -> bool {
        if !self.contains(item) {
            return false;
        }
        if self.required && self.items.len() == 1 {
            return false;
        }
        self.items.retain(|i| i != item);
        true
    }

    /// Clears the selection unconditionally.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Keeps only the items matching the predicate (for pruning items that
    /// no longer exist). Bypasses the required flag.
    pub fn retain(&mut self, f: impl Fn(&T) -> bool) {
        self.items.retain(|i| f(i));
        if let Some(last) = &self.last {
            if !f(last) {
                self.last = None;
            }
        }
    }

    /// Returns true if the item is selected.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.items.contains(item)
    }

    /// The first selected item, in selection order.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// The most recently chosen item (the range-selection anchor).
    #[must_use]
    pub fn last_selected(&self) -> Option<&T> {
        self.last.as_ref()
    }

    /// The selected items in selection order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// The number of selected items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: PartialEq + Clone> Default for Selection<T> {
    fn default() -> Self {
        Self::new()
    }
}
