use serde::{Deserialize, Deserializer, Serialize};

/// Members of a multi-select answer.
///
/// Keeps first-insertion order for display and export, and can never hold the
/// same value twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selection(Vec<String>);

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|member| member == value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Adds `value`. Returns `false` if it was already a member.
    pub fn insert(&mut self, value: &str) -> bool {
        if self.contains(value) {
            return false;
        }
        self.0.push(value.to_owned());
        true
    }

    /// Removes `value`. Returns `false` if it was not a member.
    pub fn remove(&mut self, value: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|member| member != value);
        self.0.len() != before
    }

    /// Replaces the whole selection with `{value}`.
    pub fn replace_with(&mut self, value: &str) {
        self.0.clear();
        self.0.push(value.to_owned());
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|member| keep(member));
    }

    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }
}

impl<S: AsRef<str>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Selection::new();
        for value in iter {
            selection.insert(value.as_ref());
        }
        selection
    }
}

impl<'de> Deserialize<'de> for Selection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = Vec::<String>::deserialize(deserializer)?;
        Ok(values.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_collapse_on_decode() {
        let selection: Selection = serde_json::from_str(r#"["time","tech","time"]"#).unwrap();
        assert_eq!(selection.as_slice(), ["time", "tech"]);
    }

    #[test]
    fn insert_and_remove_report_membership_changes() {
        let mut selection = Selection::new();
        assert!(selection.insert("weekly"));
        assert!(!selection.insert("weekly"));
        assert!(selection.remove("weekly"));
        assert!(!selection.remove("weekly"));
        assert!(selection.is_empty());
    }
}
