//! Page-number pagination over an ordered collection.
//!
//! A [`Paginator`] knows the collection size and page size. It turns the raw
//! `?page=` value into a [`PageWindow`] (never failing: junk or out-of-range
//! numbers snap to the nearest valid page), and the caller fetches the slice
//! for that window and wraps it into a [`Page`].

use std::num::IntErrorKind;

use serde::Serialize;

/// Collection size plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: u64,
    per_page: u64,
}

/// The resolved page number and the slice bounds it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub offset: u64,
    pub limit: u64,
}

impl Paginator {
    pub fn new(count: u64, per_page: u64) -> Self {
        Self {
            count,
            per_page: per_page.max(1),
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// `ceil(count / per_page)`, with an empty collection still having one page.
    pub fn num_pages(&self) -> u64 {
        self.count.div_ceil(self.per_page).max(1)
    }

    /// Clamp a requested page number into `1..=num_pages`.
    pub fn clamp(&self, number: i64) -> u64 {
        if number < 1 {
            1
        } else {
            (number as u64).min(self.num_pages())
        }
    }

    /// Resolve the raw `page` query value. Missing or non-numeric input means
    /// page 1; integers too large for `i64` still count as past the end.
    pub fn get_page(&self, raw: Option<&str>) -> PageWindow {
        let requested = raw.and_then(parse_page_number).unwrap_or(1);
        let number = self.clamp(requested);

        PageWindow {
            number,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }
}

fn parse_page_number(raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(number) => Some(number),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

/// One page of results, ready for a template.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<u64>,
    pub previous_page_number: Option<u64>,
    /// 1-based index of the first item on this page (0 when empty).
    pub start_index: u64,
    /// 1-based index of the last item on this page (0 when empty).
    pub end_index: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow, paginator: &Paginator) -> Self {
        let num_pages = paginator.num_pages();
        let has_next = window.number < num_pages;
        let has_previous = window.number > 1;
        let (start_index, end_index) = if items.is_empty() {
            (0, 0)
        } else {
            (window.offset + 1, window.offset + items.len() as u64)
        };

        Self {
            items,
            number: window.number,
            num_pages,
            count: paginator.count(),
            has_next,
            has_previous,
            next_page_number: has_next.then(|| window.number + 1),
            previous_page_number: has_previous.then(|| window.number - 1),
            start_index,
            end_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(total: u64, per_page: u64, raw: Option<&str>) -> Page<u64> {
        let paginator = Paginator::new(total, per_page);
        let window = paginator.get_page(raw);
        let items = (0..total)
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .collect();
        Page::new(items, window, &paginator)
    }

    #[test]
    fn test_num_pages_is_ceiling() {
        for per_page in 1..=12 {
            for total in 0..=40 {
                let expected = if total == 0 {
                    1
                } else {
                    (total + per_page - 1) / per_page
                };
                assert_eq!(
                    Paginator::new(total, per_page).num_pages(),
                    expected,
                    "total={total} per_page={per_page}"
                );
            }
        }
    }

    #[test]
    fn test_empty_collection_has_one_empty_page() {
        let page = page_of(0, 10, None);
        assert!(page.items.is_empty());
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_previous);
        assert_eq!((page.start_index, page.end_index), (0, 0));
    }

    #[test]
    fn test_thirteen_items_split_into_two_pages() {
        let first = page_of(13, 10, Some("1"));
        assert_eq!(first.items.len(), 10);
        assert!(first.has_next);
        assert_eq!(first.next_page_number, Some(2));

        let second = page_of(13, 10, Some("2"));
        assert_eq!(second.items.len(), 3);
        assert!(!second.has_next);
        assert_eq!(second.previous_page_number, Some(1));
        assert_eq!((second.start_index, second.end_index), (11, 13));
    }

    #[test]
    fn test_junk_page_number_falls_back_to_first() {
        for raw in [None, Some(""), Some("abc"), Some("1.5")] {
            assert_eq!(Paginator::new(30, 10).get_page(raw).number, 1, "{raw:?}");
        }
    }

    #[test]
    fn test_out_of_range_numbers_are_clamped() {
        let paginator = Paginator::new(30, 10);
        assert_eq!(paginator.get_page(Some("0")).number, 1);
        assert_eq!(paginator.get_page(Some("-4")).number, 1);
        assert_eq!(paginator.get_page(Some("99")).number, 3);
        assert_eq!(paginator.get_page(Some("99")).offset, 20);
        assert_eq!(paginator.get_page(Some("99999999999999999999")).number, 3);
        assert_eq!(paginator.get_page(Some("-99999999999999999999")).number, 1);
    }

    #[test]
    fn test_zero_page_size_is_treated_as_one() {
        let paginator = Paginator::new(3, 0);
        assert_eq!(paginator.per_page(), 1);
        assert_eq!(paginator.num_pages(), 3);
    }
}
