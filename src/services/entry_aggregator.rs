use std::collections::{BTreeMap, BTreeSet};

use crate::{
    domain::{
        models::{sort_entries, Entry},
        value_objects::{LogicalPath, UserId},
    },
    ports::storage::BlobInfo,
    services::PathResolver,
};

/// Reduces a flat listing into the direct children of one directory
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryAggregator {
    resolver: PathResolver,
}

impl EntryAggregator {
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    /// Fold `raw` into entries directly under `dir`.
    ///
    /// A sub-directory's count is the number of distinct direct children seen
    /// under it; its own marker and deeper descendants add nothing extra.
    pub fn aggregate(&self, user: UserId, dir: &LogicalPath, raw: &[BlobInfo]) -> Vec<Entry> {
        let mut directories: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut files: BTreeMap<String, Entry> = BTreeMap::new();

        for info in raw {
            let logical = self.resolver.unresolve(user, &info.key);
            let Some(rest) = logical.strip_prefix(dir.as_str()) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }

            match rest.split_once('/') {
                Some((name, remainder)) => {
                    let children = directories.entry(name.to_string()).or_default();
                    let child = match remainder.find('/') {
                        Some(idx) => &remainder[..=idx],
                        None => remainder,
                    };
                    if !child.is_empty() {
                        children.insert(child.to_string());
                    }
                }
                None => {
                    let entry = Entry::file(logical.clone(), rest, info.size, info.last_modified);
                    files.insert(logical, entry);
                }
            }
        }

        let mut entries: Vec<Entry> = directories
            .into_iter()
            .map(|(name, children)| {
                let path = format!("{}{}/", dir, name);
                Entry::directory(path, name, children.len() as u64)
            })
            .chain(files.into_values())
            .collect();

        sort_entries(&mut entries);
        entries
    }
}
