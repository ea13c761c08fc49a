use std::collections::HashMap;

/// Known renames from a foreign-key column name to the name it should
/// resolve against. Seeded with common audit-column conventions and
/// extended at runtime from `[mappings]` in rowforge.toml.
///
/// Lookups are case-insensitive; the mapped-to name is returned as
/// configured.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    entries: HashMap<String, String>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in exceptions: audit columns that reference a user row
    /// without following the `<table>_id` convention.
    pub fn with_defaults() -> Self {
        let mut map = Self::new();
        map.insert("created_by", "user_id");
        map.insert("updated_by", "user_id");
        map.insert("deleted_by", "user_id");
        map.insert("modified_by", "user_id");
        map
    }

    pub fn insert(&mut self, from: impl AsRef<str>, to: impl Into<String>) {
        self.entries
            .insert(from.as_ref().to_lowercase(), to.into());
    }

    pub fn lookup(&self, column: &str) -> Option<&str> {
        self.entries.get(&column.to_lowercase()).map(String::as_str)
    }

    pub fn extend<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (from, to) in pairs {
            self.insert(from, to);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
