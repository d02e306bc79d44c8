use serde::{Serialize, Serializer};

/// Describes one page of a filtered collection.
///
/// The total page count is derived from the other fields on every read so it
/// can never drift from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationMetadata {
    total_item_count: u64,
    page_size: u32,
    current_page: u32,
}

impl PaginationMetadata {
    /// `page_size` must already be clamped to at least 1 by the caller.
    pub fn new(total_item_count: u64, page_size: u32, current_page: u32) -> Self {
        debug_assert!(page_size > 0, "page size must be clamped before paging");
        Self {
            total_item_count,
            page_size,
            current_page,
        }
    }

    pub fn total_item_count(&self) -> u64 {
        self.total_item_count
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_page_count(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_item_count.div_ceil(u64::from(self.page_size))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaginationMetadataWire {
    total_item_count: u64,
    total_page_count: u64,
    page_size: u32,
    current_page: u32,
}

impl Serialize for PaginationMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PaginationMetadataWire {
            total_item_count: self.total_item_count,
            total_page_count: self.total_page_count(),
            page_size: self.page_size,
            current_page: self.current_page,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_page_count_rounds_up() {
        assert_eq!(PaginationMetadata::new(25, 10, 1).total_page_count(), 3);
        assert_eq!(PaginationMetadata::new(20, 10, 1).total_page_count(), 2);
        assert_eq!(PaginationMetadata::new(1, 20, 1).total_page_count(), 1);
    }

    #[test]
    fn test_total_page_count_zero_only_for_empty() {
        for page_size in 1..=20u32 {
            assert_eq!(PaginationMetadata::new(0, page_size, 1).total_page_count(), 0);
            for total in 1..=100u64 {
                let metadata = PaginationMetadata::new(total, page_size, 1);
                let expected = (total + u64::from(page_size) - 1) / u64::from(page_size);
                assert_eq!(metadata.total_page_count(), expected);
                assert!(metadata.total_page_count() > 0);
            }
        }
    }

    #[test]
    fn test_serializes_derived_page_count() {
        let json = serde_json::to_value(PaginationMetadata::new(25, 10, 3)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "totalItemCount": 25,
                "totalPageCount": 3,
                "pageSize": 10,
                "currentPage": 3
            })
        );
    }
}
