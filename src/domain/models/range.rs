use crate::domain::errors::{StorageError, StorageResult};

/// Whether a read covers the whole object or a sub-range of it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentStatus {
    Full,
    Partial,
}

/// Inclusive byte range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Check the range against an object of `total` bytes, clamping `end`
    pub fn fit_to(self, total: u64) -> StorageResult<ByteRange> {
        if self.start > self.end || self.start >= total {
            return Err(StorageError::RangeNotSatisfiable {
                start: self.start,
                end: self.end,
                length: total,
            });
        }
        Ok(ByteRange::new(self.start, self.end.min(total - 1)))
    }

    /// `bytes start-end/total`
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, total)
    }

    /// Parse a single-range `Range` header value against an object size.
    ///
    /// Returns `Ok(None)` for values that are not a single `bytes=` range,
    /// which callers answer with the full content.
    pub fn from_header(value: &str, total: u64) -> StorageResult<Option<ByteRange>> {
        let spec = match value.trim().strip_prefix("bytes=") {
            Some(spec) if !spec.contains(',') => spec.trim(),
            _ => return Ok(None),
        };
        let (first, last) = match spec.split_once('-') {
            Some(parts) => parts,
            None => return Ok(None),
        };

        let range = match (first.trim(), last.trim()) {
            ("", "") => return Ok(None),
            ("", suffix) => {
                let Ok(suffix) = suffix.parse::<u64>() else {
                    return Ok(None);
                };
                if suffix == 0 || total == 0 {
                    return Err(StorageError::RangeNotSatisfiable {
                        start: total,
                        end: total,
                        length: total,
                    });
                }
                ByteRange::new(total.saturating_sub(suffix), total - 1)
            }
            (start, "") => {
                let Ok(start) = start.parse::<u64>() else {
                    return Ok(None);
                };
                ByteRange::new(start, total.saturating_sub(1).max(start))
            }
            (start, end) => match (start.parse::<u64>(), end.parse::<u64>()) {
                (Ok(start), Ok(end)) => ByteRange::new(start, end),
                _ => return Ok(None),
            },
        };

        range.fit_to(total).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_to() {
        assert_eq!(ByteRange::new(0, 9).fit_to(100).unwrap(), ByteRange::new(0, 9));
        assert_eq!(ByteRange::new(90, 200).fit_to(100).unwrap(), ByteRange::new(90, 99));
        assert!(ByteRange::new(100, 120).fit_to(100).is_err());
        assert!(ByteRange::new(5, 4).fit_to(100).is_err());
        assert!(ByteRange::new(0, 0).fit_to(0).is_err());
    }

    #[test]
    fn test_header_forms() {
        assert_eq!(
            ByteRange::from_header("bytes=0-499", 1000).unwrap(),
            Some(ByteRange::new(0, 499))
        );
        assert_eq!(
            ByteRange::from_header("bytes=500-", 1000).unwrap(),
            Some(ByteRange::new(500, 999))
        );
        assert_eq!(
            ByteRange::from_header("bytes=-100", 1000).unwrap(),
            Some(ByteRange::new(900, 999))
        );
        assert_eq!(
            ByteRange::from_header("bytes=-5000", 1000).unwrap(),
            Some(ByteRange::new(0, 999))
        );
    }

    #[test]
    fn test_header_fallbacks_and_errors() {
        assert_eq!(ByteRange::from_header("items=0-1", 10).unwrap(), None);
        assert_eq!(ByteRange::from_header("bytes=0-1,4-5", 10).unwrap(), None);
        assert_eq!(ByteRange::from_header("bytes=x-1", 10).unwrap(), None);
        assert!(ByteRange::from_header("bytes=20-30", 10).is_err());
        assert!(ByteRange::from_header("bytes=-0", 10).is_err());
    }

    #[test]
    fn test_content_range() {
        let range = ByteRange::new(0, 1023);
        assert_eq!(range.len(), 1024);
        assert_eq!(range.content_range(4096), "bytes 0-1023/4096");
    }
}
