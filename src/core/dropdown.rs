use crate::core::error::FormError;

pub const SENTINEL_LABEL: &str = "(no field selected)";

/// One entry of a dropdown. Value and label are the same string for column
/// options; only the sentinel differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    pub value: String,
    pub label: String,
}

impl DropdownOption {
    pub fn column(name: &str) -> Self {
        Self {
            value: name.to_string(),
            label: name.to_string(),
        }
    }

    pub fn sentinel() -> Self {
        Self {
            value: String::new(),
            label: SENTINEL_LABEL.to_string(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.value.is_empty()
    }
}

/// Single-select control state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dropdown {
    options: Vec<DropdownOption>,
    selected: Option<usize>,
    enabled: bool,
    has_sentinel: bool,
}

impl Dropdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// A dropdown whose first option always means "nothing chosen"
    pub fn with_sentinel() -> Self {
        Self {
            has_sentinel: true,
            ..Self::default()
        }
    }

    /// Replace every option. Blank candidates are skipped and order is kept.
    /// Calling this twice with the same candidates yields the same options.
    pub fn populate<S: AsRef<str>>(&mut self, candidates: &[S]) {
        self.options.clear();
        if self.has_sentinel {
            self.options.push(DropdownOption::sentinel());
        }
        for candidate in candidates {
            let trimmed = candidate.as_ref().trim();
            if trimmed.is_empty() {
                continue;
            }
            self.options.push(DropdownOption::column(trimmed));
        }
        self.selected = if self.options.is_empty() { None } else { Some(0) };
    }

    pub fn options(&self) -> &[DropdownOption] {
        &self.options
    }

    pub fn option_values(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.value.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn has_sentinel(&self) -> bool {
        self.has_sentinel
    }

    pub fn select(&mut self, index: usize) -> Result<(), FormError> {
        if index >= self.options.len() {
            return Err(FormError::OptionOutOfRange {
                index,
                len: self.options.len(),
            });
        }
        self.selected = Some(index);
        Ok(())
    }

    /// Select the first option with this value; returns false when absent
    pub fn select_value(&mut self, value: &str) -> bool {
        match self.options.iter().position(|o| o.value == value) {
            Some(idx) => {
                self.selected = Some(idx);
                true
            }
            None => false,
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// The chosen column name; the sentinel yields None
    pub fn selected_value(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.options.get(i))
            .filter(|o| !o.is_sentinel())
            .map(|o| o.value.as_str())
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.options.get(i))
            .map(|o| o.label.as_str())
    }
}

/// Multi-select control state, used for the destination category values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiSelect {
    options: Vec<String>,
    chosen: Vec<bool>,
    enabled: bool,
}

impl MultiSelect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every option and drop any previous choice
    pub fn populate<S: AsRef<str>>(&mut self, candidates: &[S]) {
        self.options = candidates
            .iter()
            .map(|c| c.as_ref().trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        self.chosen = vec![false; self.options.len()];
    }

    pub fn clear(&mut self) {
        self.options.clear();
        self.chosen.clear();
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_chosen(&self, index: usize) -> bool {
        self.chosen.get(index).copied().unwrap_or(false)
    }

    pub fn toggle(&mut self, index: usize) -> Result<(), FormError> {
        let len = self.chosen.len();
        let slot = self
            .chosen
            .get_mut(index)
            .ok_or(FormError::OptionOutOfRange { index, len })?;
        *slot = !*slot;
        Ok(())
    }

    pub fn chosen_values(&self) -> Vec<String> {
        self.options
            .iter()
            .zip(self.chosen.iter())
            .filter(|(_, chosen)| **chosen)
            .map(|(value, _)| value.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_populate_skips_blanks_and_keeps_order() {
        let mut dropdown = Dropdown::new();
        dropdown.populate(&["id", " ", "lat", "", " lon "]);
        assert_eq!(dropdown.option_values(), vec!["id", "lat", "lon"]);
        assert_eq!(dropdown.selected_index(), Some(0));
    }

    #[test]
    fn test_populate_is_idempotent() {
        let mut dropdown = Dropdown::with_sentinel();
        dropdown.populate(&["a", "b"]);
        let first = dropdown.clone();
        dropdown.populate(&["a", "b"]);
        assert_eq!(dropdown, first);
    }

    #[test]
    fn test_sentinel_is_first_and_not_a_value() {
        let mut dropdown = Dropdown::with_sentinel();
        dropdown.populate(&["kind", "group"]);
        assert_eq!(dropdown.len(), 3);
        assert_eq!(dropdown.options()[0].label, SENTINEL_LABEL);
        assert_eq!(dropdown.selected_value(), None);
        dropdown.select(2).unwrap();
        assert_eq!(dropdown.selected_value(), Some("group"));
    }

    #[test]
    fn test_select_out_of_range() {
        let mut dropdown = Dropdown::new();
        dropdown.populate(&["a"]);
        assert!(dropdown.select(1).is_err());
        assert_eq!(dropdown.selected_index(), Some(0));
    }

    #[test]
    fn test_select_value() {
        let mut dropdown = Dropdown::new();
        dropdown.populate(&["ID", "lat", "long"]);
        assert!(dropdown.select_value("long"));
        assert_eq!(dropdown.selected_index(), Some(2));
        assert!(!dropdown.select_value("lon"));
    }

    #[test]
    fn test_multi_select_toggle() {
        let mut multi = MultiSelect::new();
        multi.populate(&["1", "2", "3"]);
        multi.toggle(0).unwrap();
        multi.toggle(2).unwrap();
        multi.toggle(2).unwrap();
        assert_eq!(multi.chosen_values(), vec!["1".to_string()]);
        assert!(multi.toggle(3).is_err());
    }
}
