use std::collections::BTreeSet;

/// Distinct values found in the chosen category column of the destination body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryValueSet {
    values: Vec<String>,
}

impl CategoryValueSet {
    /// `selected_index` counts the sentinel as option 0, so column `n` of the
    /// header is option `n + 1`. Rows too short for the column are skipped.
    pub fn derive<S: AsRef<str>>(body: &[S], selected_index: usize) -> Self {
        if selected_index == 0 {
            return Self::default();
        }
        let column = selected_index - 1;
        let values: BTreeSet<String> = body
            .iter()
            .filter_map(|line| line.as_ref().split(',').nth(column))
            .map(str::to_string)
            .collect();
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sentinel_yields_empty_set() {
        let set = CategoryValueSet::derive(&["A,1,x", "B,2,y"], 0);
        assert!(set.is_empty());
    }

    #[test]
    fn test_dedup_and_sort() {
        let set = CategoryValueSet::derive(&["A,1,x", "B,2,y", "C,1,x"], 2);
        assert_eq!(set.values(), &["1", "2"]);
    }

    #[test]
    fn test_short_rows_skipped() {
        let set = CategoryValueSet::derive(&["A,school", "B", "", "C,clinic"], 2);
        assert_eq!(set.values(), &["clinic", "school"]);
    }

    #[test]
    fn test_case_sensitive_ordinal_order() {
        let set = CategoryValueSet::derive(&["b", "B", "a", "A"], 1);
        assert_eq!(set.values(), &["A", "B", "a", "b"]);
    }

    #[test]
    fn test_rederive_is_stable() {
        let body = vec!["x,3".to_string(), "y,1".to_string(), "z,3".to_string()];
        assert_eq!(
            CategoryValueSet::derive(&body, 2),
            CategoryValueSet::derive(&body, 2)
        );
    }
}
