use std::collections::HashSet;
use shared::protocol::APP_VERSION;
use shared::types::AppEntry;

const DEFAULT_APP_COUNT: usize = 10;

/// Ordered application catalog. Order is preserved exactly as constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppCatalog {
    entries: Vec<AppEntry>,
}

impl AppCatalog {
    /// The placeholder catalog used when no custom apps are configured.
    pub fn default_catalog() -> Self {
        let entries = (1..=DEFAULT_APP_COUNT)
            .map(|i| AppEntry {
                id: i.to_string(),
                name: format!("Emulated App {}", i),
                version: APP_VERSION.to_string(),
            })
            .collect();
        Self { entries }
    }

    /// Build a catalog from a comma or newline separated list of `id:name`
    /// entries. Only the first colon separates the id, so names may contain
    /// colons. A token without an id gets the smallest unused numeric id.
    /// Absent input, or input yielding no entries, gives the default catalog.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default_catalog();
        };

        let tokens: Vec<(Option<&str>, &str)> = raw
            .split([',', '\n'])
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| match token.split_once(':') {
                Some((id, name)) => {
                    let id = id.trim();
                    ((!id.is_empty()).then_some(id), name.trim())
                }
                None => (None, token),
            })
            .collect();

        let mut used: HashSet<String> = tokens
            .iter()
            .filter_map(|(id, _)| id.map(str::to_string))
            .collect();
        let mut seen = HashSet::new();
        let mut next_fallback = 1usize;
        let mut entries = Vec::with_capacity(tokens.len());

        for (id, name) in tokens {
            if name.is_empty() {
                tracing::warn!("Skipping app entry with empty name (id {:?})", id);
                continue;
            }

            let id = match id {
                Some(id) => id.to_string(),
                None => {
                    while used.contains(&next_fallback.to_string()) {
                        next_fallback += 1;
                    }
                    let id = next_fallback.to_string();
                    used.insert(id.clone());
                    id
                }
            };

            if !seen.insert(id.clone()) {
                tracing::warn!("Skipping duplicate app id {}", id);
                continue;
            }

            entries.push(AppEntry {
                id,
                name: name.to_string(),
                version: APP_VERSION.to_string(),
            });
        }

        if entries.is_empty() {
            tracing::warn!("Custom app list yielded no entries, using default catalog");
            return Self::default_catalog();
        }

        Self { entries }
    }

    pub fn entries(&self) -> &[AppEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AppCatalog {
    fn default() -> Self {
        Self::default_catalog()
    }
}
