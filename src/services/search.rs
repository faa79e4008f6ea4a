use std::{collections::BTreeMap, ops::Range, sync::Arc};
use tracing::info;

use crate::{
    domain::{
        errors::StorageResult,
        models::{sort_entries, Entry},
        value_objects::UserId,
    },
    ports::services::FileStorage,
};

/// Byte ranges of `haystack` that match `needle`, ignoring case.
///
/// Matching is done on lowercased characters, and ranges point back into the
/// original string even where lowercasing changes the byte length.
pub(crate) fn match_ranges(haystack: &str, needle: &str) -> Vec<Range<usize>> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return Vec::new();
    }

    let folded: Vec<(usize, usize, char)> = haystack
        .char_indices()
        .flat_map(|(idx, c)| {
            let end = idx + c.len_utf8();
            c.to_lowercase().map(move |lower| (idx, end, lower))
        })
        .collect();

    let mut ranges: Vec<Range<usize>> = Vec::new();
    if folded.len() < needle.len() {
        return ranges;
    }

    for window in folded.windows(needle.len()) {
        if window.iter().map(|(_, _, c)| *c).eq(needle.iter().copied()) {
            let start = window[0].0;
            let end = window[needle.len() - 1].1;
            if ranges.last().map_or(true, |last| last.start != start) {
                ranges.push(start..end);
            }
        }
    }

    ranges
}

/// Shortest prefix of `path` that contains `matched` and ends on a segment boundary
fn fold_to_segment(path: &str, matched: &Range<usize>) -> String {
    if path[..matched.end].ends_with('/') {
        return path[..matched.end].to_string();
    }
    match path[matched.end..].find('/') {
        Some(idx) => path[..matched.end + idx + 1].to_string(),
        None => path.to_string(),
    }
}

fn last_segment(path: &str) -> &str {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Breadcrumb-level search across a user's files
#[derive(Clone)]
pub struct SearchService {
    storage: Arc<dyn FileStorage>,
}

impl SearchService {
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self { storage }
    }

    /// Files and folders whose path contains `query`, ignoring case.
    ///
    /// Every occurrence is folded to the segment that contains it, so a hit
    /// inside a folder name yields the folder rather than each file in it.
    pub async fn search(&self, user: UserId, query: &str) -> StorageResult<Vec<Entry>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let raw = self.storage.search_entries(user, "", query).await?;

        let mut folded: BTreeMap<String, Option<Entry>> = BTreeMap::new();
        for entry in raw {
            for matched in match_ranges(&entry.path, query) {
                let prefix = fold_to_segment(&entry.path, &matched);
                if prefix == entry.path {
                    folded.insert(prefix, Some(entry.clone()));
                } else {
                    folded.entry(prefix).or_insert(None);
                }
            }
        }

        let mut results = Vec::with_capacity(folded.len());
        for (path, source) in folded {
            if path.ends_with('/') {
                let child_count = self.storage.get_direct_child_count(user, &path).await?;
                let name = last_segment(&path).to_string();
                results.push(Entry::directory(path, name, child_count));
            } else if let Some(entry) = source {
                results.push(entry);
            }
        }

        sort_entries(&mut results);
        info!(
            "Search for '{}' by user {} found {} entries",
            query,
            user,
            results.len()
        );

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_ranges_ignores_case() {
        assert_eq!(match_ranges("root/folder/firstFile.txt", "file"), vec![17..21]);
        assert_eq!(match_ranges("File/file.txt", "FILE"), vec![0..4, 5..9]);
        assert!(match_ranges("NotContain/FolderName/", "file").is_empty());
        assert!(match_ranges("abc", "").is_empty());
    }

    #[test]
    fn test_match_ranges_map_back_to_original_bytes() {
        // 'İ' lowercases to two chars
        let path = "İfile/a.txt";
        let ranges = match_ranges(path, "file");
        assert_eq!(ranges.len(), 1);
        assert_eq!(&path[ranges[0].clone()], "file");

        assert_eq!(match_ranges("Документы/", "документы"), vec![0..18]);
    }

    #[test]
    fn test_fold_to_segment() {
        let path = "photos/summer/beach.jpg";
        assert_eq!(fold_to_segment(path, &(7..10)), "photos/summer/");
        assert_eq!(fold_to_segment(path, &(14..19)), "photos/summer/beach.jpg");
        assert_eq!(fold_to_segment(path, &(0..7)), "photos/");
    }
}
