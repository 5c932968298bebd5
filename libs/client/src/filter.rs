//! Local filtering of fetched records

use crate::models::Entity;

/// Narrow a fetched list the way the list screens do
///
/// Facets left as `None` match everything. Facet values compare exactly;
/// the search text is matched case-insensitively against the title, the
/// main text and every tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub category: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: String,
}

impl RecordFilter {
    /// A filter on search text alone
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: text.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn matches<T: Entity>(&self, record: &T) -> bool {
        facet_matches(self.category.as_deref(), record.category())
            && facet_matches(self.status.as_deref(), record.status())
            && facet_matches(self.priority.as_deref(), record.priority())
            && self.search_matches(record)
    }

    pub fn apply<'a, T: Entity>(&self, records: &'a [T]) -> Vec<&'a T> {
        records.iter().filter(|r| self.matches(*r)).collect()
    }

    fn search_matches<T: Entity>(&self, record: &T) -> bool {
        if self.search.is_empty() {
            return true;
        }

        let needle = self.search.to_lowercase();
        record.title().to_lowercase().contains(&needle)
            || record.description().to_lowercase().contains(&needle)
            || record
                .tags()
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
    }
}

fn facet_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual == Some(wanted),
    }
}
