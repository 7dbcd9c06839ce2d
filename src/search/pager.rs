//! Fixed-size paging of result lists.

/// One page of a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based page number after clamping.
    pub number: usize,
    /// Number of pages, at least 1 even for an empty list.
    pub total_pages: usize,
    pub total_items: usize,
}

/// Number of pages needed for `len` items. A zero page size counts as 1.
pub const fn page_count(len: usize, page_size: usize) -> usize {
    let size = if page_size == 0 { 1 } else { page_size };
    len.div_ceil(size)
}

/// Slice `items` into the requested page, clamping `page_number` into range.
pub fn page<T>(items: &[T], page_size: usize, page_number: usize) -> Page<'_, T> {
    let size = page_size.max(1);
    let total_pages = page_count(items.len(), size).max(1);
    let number = page_number.clamp(1, total_pages);

    let start = ((number - 1) * size).min(items.len());
    let end = (start + size).min(items.len());

    Page {
        items: &items[start..end],
        number,
        total_pages,
        total_items: items.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case(1, &[1, 2, 3])]
    #[case(2, &[4, 5, 6])]
    #[case(3, &[7])]
    #[case(0, &[1, 2, 3])]
    #[case(9, &[7])]
    fn test_page_clamps_number(#[case] requested: usize, #[case] expected: &[i32]) {
        let items = [1, 2, 3, 4, 5, 6, 7];
        let page = page(&items, 3, requested);
        check!(page.items == expected);
        check!(page.total_pages == 3);
        check!(page.total_items == 7);
    }

    #[test]
    fn test_empty_list_has_one_empty_page() {
        let items: [u8; 0] = [];
        let page = page(&items, 10, 4);
        check!(page.items.is_empty());
        check!(page.number == 1);
        check!(page.total_pages == 1);
    }

    #[test]
    fn test_zero_page_size_is_one() {
        let items = ["a", "b"];
        let page = page(&items, 0, 2);
        check!(page.items == ["b"]);
        check!(page.total_pages == 2);
        check!(page_count(2, 0) == 2);
    }

    #[test]
    fn test_exact_multiple() {
        check!(page_count(20, 10) == 2);
        check!(page_count(21, 10) == 3);
        check!(page_count(0, 10) == 0);
    }
}
