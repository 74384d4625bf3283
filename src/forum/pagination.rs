//! Fixed-size pagination over in-memory sequences.

/// Items per page for every paginated list.
pub const PAGE_SIZE: usize = 6;

/// One page of `items` plus what is needed to render navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination<'a, T> {
    pub items: &'a [T],
    pub pages: Vec<&'a [T]>,
    pub page: &'a [T],
    pub index: i64,
    /// `-1` when there are no pages at all.
    pub last_index: i64,
    pub next: bool,
    pub prev: bool,
    /// More than one page exists.
    pub active: bool,
}

impl<T> Pagination<'_, T> {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Paginate with the system-wide [`PAGE_SIZE`].
pub fn paginate<T>(items: &[T], page_index: i64) -> Pagination<'_, T> {
    paginate_with(items, PAGE_SIZE, page_index)
}

/// Slice `items` into pages of `page_size` and pick page `page_index`.
///
/// Out-of-range indices (negative included) give an empty page.
///
/// # Panics
/// If `page_size` is zero.
pub fn paginate_with<T>(items: &[T], page_size: usize, page_index: i64) -> Pagination<'_, T> {
    assert!(page_size > 0, "page size must be positive");

    let pages: Vec<&[T]> = items.chunks(page_size).collect();
    let last_index = pages.len() as i64 - 1;
    let page = usize::try_from(page_index)
        .ok()
        .and_then(|i| pages.get(i).copied())
        .unwrap_or(&[]);

    Pagination {
        items,
        page,
        index: page_index,
        last_index,
        next: page_index < last_index,
        prev: page_index > 0,
        active: pages.len() > 1,
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thirteen() -> Vec<u32> {
        (0..13).collect()
    }

    #[test]
    fn test_first_page() {
        let items = thirteen();
        let p = paginate(&items, 0);

        let sizes: Vec<usize> = p.pages.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![6, 6, 1]);
        assert_eq!(p.page, &[0, 1, 2, 3, 4, 5]);
        assert_eq!(p.last_index, 2);
        assert!(p.next);
        assert!(!p.prev);
        assert!(p.active);
        assert_eq!(p.items.len(), 13);
    }

    #[test]
    fn test_last_page() {
        let items = thirteen();
        let p = paginate(&items, 2);

        assert_eq!(p.page, &[12]);
        assert!(!p.next);
        assert!(p.prev);
        assert_eq!(p.index, 2);
    }

    #[test]
    fn test_empty_items() {
        let items: Vec<u32> = Vec::new();
        let p = paginate(&items, 0);

        assert!(p.page.is_empty());
        assert_eq!(p.page_count(), 0);
        assert_eq!(p.last_index, -1);
        assert!(!p.active);
        assert!(!p.next);
        assert!(!p.prev);
    }

    #[test]
    fn test_out_of_range_index_is_empty() {
        let items = thirteen();

        let past_end = paginate(&items, 7);
        assert!(past_end.page.is_empty());
        assert!(!past_end.next);
        assert!(past_end.prev);

        let negative = paginate(&items, -1);
        assert!(negative.page.is_empty());
        assert!(!negative.prev);
        assert!(negative.next);
    }

    #[test]
    fn test_single_page_is_inactive() {
        let items = vec!["a", "b", "c", "d", "e", "f"];
        let p = paginate(&items, 0);
        assert_eq!(p.page_count(), 1);
        assert!(!p.active);
        assert!(!p.next);
    }

    #[test]
    fn test_custom_page_size() {
        let items = thirteen();
        let p = paginate_with(&items, 5, 1);
        assert_eq!(p.page, &[5, 6, 7, 8, 9]);
        assert_eq!(p.last_index, 2);
    }

    #[test]
    #[should_panic(expected = "page size must be positive")]
    fn test_zero_page_size_panics() {
        let items = thirteen();
        let _ = paginate_with(&items, 0, 0);
    }
}
