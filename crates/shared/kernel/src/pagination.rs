//! Page-number pagination over an already filtered and ordered row set.

use std::borrow::Cow;

/// Page parameter value that selects the last page.
pub const LAST_PAGE: &str = "last";

#[taxi_derive::taxi_error]
pub enum PaginationError {
    /// Not an integer, below 1 or past the last page.
    #[error("Invalid page{}: {message}", format_context(.context))]
    InvalidPage { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(5)
    }
}

impl Paginator {
    /// A `page_size` of zero is treated as one.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self { page_size: page_size.max(1) }
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages for `count` rows. An empty set still has one (empty) page.
    #[must_use]
    pub const fn num_pages(&self, count: usize) -> usize {
        if count == 0 { 1 } else { count.div_ceil(self.page_size) }
    }

    /// Resolves the raw `page` parameter to a page number.
    ///
    /// # Errors
    /// [`PaginationError::InvalidPage`] when `raw` is neither an integer nor [`LAST_PAGE`],
    /// or the number is outside `1..=num_pages`.
    pub fn page_number(&self, raw: Option<&str>, count: usize) -> Result<usize, PaginationError> {
        let num_pages = self.num_pages(count);
        let number = match raw.map(str::trim) {
            None | Some("") => 1,
            Some(LAST_PAGE) => num_pages,
            Some(raw) => raw.parse::<usize>().map_err(|_| PaginationError::InvalidPage {
                message: format!("'{raw}' is not an integer").into(),
                context: None,
            })?,
        };

        if number == 0 || number > num_pages {
            return Err(PaginationError::InvalidPage {
                message: format!("page {number} is outside 1..={num_pages}").into(),
                context: None,
            });
        }

        Ok(number)
    }

    /// Cuts `rows` into the page selected by `raw`.
    ///
    /// # Errors
    /// See [`Paginator::page_number`].
    pub fn paginate<T>(&self, rows: Vec<T>, raw: Option<&str>) -> Result<Page<T>, PaginationError> {
        let count = rows.len();
        let number = self.page_number(raw, count)?;
        let object_list =
            rows.into_iter().skip((number - 1) * self.page_size).take(self.page_size).collect();

        Ok(Page { object_list, number, num_pages: self.num_pages(count), count })
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    /// 1-based.
    pub number: usize,
    pub num_pages: usize,
    /// Rows across all pages.
    pub count: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub const fn has_other_pages(&self) -> bool {
        self.has_next() || self.has_previous()
    }

    #[must_use]
    pub const fn next_page_number(&self) -> Option<usize> {
        if self.has_next() { Some(self.number + 1) } else { None }
    }

    #[must_use]
    pub const fn previous_page_number(&self) -> Option<usize> {
        if self.has_previous() { Some(self.number - 1) } else { None }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            object_list: self.object_list.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<usize> {
        (1..=n).collect()
    }

    #[test]
    fn first_page_by_default() {
        let page = Paginator::new(5).paginate(rows(12), None).unwrap();
        assert_eq!(page.object_list, vec![1, 2, 3, 4, 5]);
        assert_eq!((page.number, page.num_pages, page.count), (1, 3, 12));
        assert_eq!(page.next_page_number(), Some(2));
        assert_eq!(page.previous_page_number(), None);
    }

    #[test]
    fn last_keyword_and_partial_page() {
        let page = Paginator::new(5).paginate(rows(12), Some("last")).unwrap();
        assert_eq!(page.object_list, vec![11, 12]);
        assert!(!page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn empty_set_has_one_page() {
        let page = Paginator::new(5).paginate(Vec::<usize>::new(), None).unwrap();
        assert_eq!((page.number, page.num_pages, page.count), (1, 1, 0));
        assert!(!page.has_other_pages());
    }

    #[test]
    fn out_of_range_and_garbage_are_rejected() {
        let paginator = Paginator::new(5);
        for raw in ["0", "4", "abc", "1.5", "-1"] {
            let err = paginator.paginate(rows(12), Some(raw)).unwrap_err();
            assert_eq!(err.kind(), "InvalidPage", "page {raw:?}");
        }
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let paginator = Paginator::new(0);
        assert_eq!(paginator.page_size(), 1);
        assert_eq!(paginator.num_pages(3), 3);
    }

    #[test]
    fn map_keeps_page_numbers() {
        let page = Paginator::new(2).paginate(rows(5), Some("2")).unwrap().map(|n| n * 10);
        assert_eq!(page.object_list, vec![30, 40]);
        assert_eq!(page.number, 2);
    }
}
