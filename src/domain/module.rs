use indexmap::IndexMap;
use serde::Deserialize;

/// Ordered mapping from branch-relative path prefix to module display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ModuleMap(IndexMap<String, String>);

impl ModuleMap {
    pub fn resolve(&self, relative_path: &str) -> &str {
        // First declared prefix wins, even when a later one is more specific.
        self.0
            .iter()
            .find(|(prefix, _)| relative_path.starts_with(prefix.as_str()))
            .map(|(_, module)| module.as_str())
            .unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(prefix, module)| (prefix.as_str(), module.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pairs of prefixes where the first shadows or is shadowed by the second.
    pub fn overlapping_prefixes(&self) -> Vec<(&str, &str)> {
        let prefixes: Vec<&str> = self.0.keys().map(String::as_str).collect();
        let mut overlaps = Vec::new();
        for (index, first) in prefixes.iter().enumerate() {
            for second in &prefixes[index + 1..] {
                if first.starts_with(second) || second.starts_with(first) {
                    overlaps.push((*first, *second));
                }
            }
        }
        overlaps
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ModuleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(prefix, module)| (prefix.into(), module.into()))
                .collect(),
        )
    }
}

/// Number of live files found under one configured module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFileCount {
    pub module: String,
    pub files: usize,
}
