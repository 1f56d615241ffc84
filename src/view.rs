//! Rendering rules shared by the terminal UI and the one-shot CLI output.
//!
//! Nothing here touches ratatui; these are the decisions about *what* is
//! shown (which poster, how many pages, which page control is inert).

use crate::api::{MovieSummary, NO_POSTER};

/// Results per page. The backend never reports this, it is assumed.
pub const PAGE_SIZE: u64 = 10;

pub const EMPTY_REVIEWS: &str = "No reviews yet. Be the first!";

/// A single page button in the pagination bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageControl {
    pub page: u32,
    pub disabled: bool,
}

/// Poster to show for a movie, substituting the placeholder for the "N/A" sentinel
pub fn poster_url<'a>(movie: &'a MovieSummary, placeholder: &'a str) -> &'a str {
    if movie.poster_url == NO_POSTER {
        placeholder
    } else {
        &movie.poster_url
    }
}

pub fn total_pages(total_count: u64) -> u32 {
    u32::try_from(total_count.div_ceil(PAGE_SIZE)).unwrap_or(u32::MAX)
}

/// An entry in the pagination bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Control(PageControl),
    /// Pages left out between two controls
    Gap,
}

/// Controls in ascending order with the current page disabled, at most
/// `max_items` entries. When every page fits, each page gets a control.
/// Otherwise the first and last page stay, plus a window around the current one.
/// Empty when everything fits on one page.
pub fn page_bar(current_page: u32, total_pages: u32, max_items: usize) -> Vec<PageItem> {
    if total_pages <= 1 {
        return Vec::new();
    }
    let current = current_page.clamp(1, total_pages);
    let control = |page: u32| {
        PageItem::Control(PageControl {
            page,
            disabled: page == current,
        })
    };

    if total_pages as usize <= max_items {
        return (1..=total_pages).map(control).collect();
    }

    // First, gap, window, gap, last
    let window = u32::try_from(max_items.saturating_sub(4).max(1)).unwrap_or(u32::MAX);
    let last_inner = total_pages - 1;
    let mut start = current.saturating_sub(window / 2).max(2);
    let mut end = start.saturating_add(window - 1);
    if end > last_inner {
        end = last_inner;
        start = end.saturating_sub(window - 1).max(2);
    }

    let mut items = vec![control(1)];
    if start > 2 {
        items.push(PageItem::Gap);
    }
    items.extend((start..=end).map(control));
    if end < last_inner {
        items.push(PageItem::Gap);
    }
    items.push(control(total_pages));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(poster: &str) -> MovieSummary {
        MovieSummary {
            id: "tt1".to_string(),
            title: "Batman".to_string(),
            year: "1989".to_string(),
            poster_url: poster.to_string(),
        }
    }

    #[test]
    fn test_poster_sentinel() {
        let placeholder = "https://placeholder/none.png";
        assert_eq!(poster_url(&movie("N/A"), placeholder), placeholder);
        assert_eq!(poster_url(&movie("http://img/b.jpg"), placeholder), "http://img/b.jpg");
        // Only the exact sentinel is replaced
        assert_eq!(poster_url(&movie("n/a"), placeholder), "n/a");
        assert_eq!(poster_url(&movie(""), placeholder), "");
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(10), 1);
        assert_eq!(total_pages(11), 2);
        assert_eq!(total_pages(15), 2);
        assert_eq!(total_pages(342), 35);
    }

    fn pages(items: &[PageItem]) -> Vec<Option<u32>> {
        items
            .iter()
            .map(|item| match item {
                PageItem::Control(c) => Some(c.page),
                PageItem::Gap => None,
            })
            .collect()
    }

    fn disabled(items: &[PageItem]) -> Vec<u32> {
        items
            .iter()
            .filter_map(|item| match item {
                PageItem::Control(c) if c.disabled => Some(c.page),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_no_controls_for_single_page() {
        assert!(page_bar(1, 0, 20).is_empty());
        assert!(page_bar(1, total_pages(10), 20).is_empty());
    }

    #[test]
    fn test_every_page_when_it_fits() {
        let items = page_bar(2, 3, 20);
        assert_eq!(
            items,
            vec![
                PageItem::Control(PageControl { page: 1, disabled: false }),
                PageItem::Control(PageControl { page: 2, disabled: true }),
                PageItem::Control(PageControl { page: 3, disabled: false }),
            ]
        );

        let items = page_bar(1, 35, 72);
        assert_eq!(items.len(), 35);
        assert_eq!(disabled(&items), vec![1]);
    }

    #[test]
    fn test_window_around_current_page() {
        let items = page_bar(20, 35, 11);
        assert_eq!(
            pages(&items),
            vec![
                Some(1),
                None,
                Some(17),
                Some(18),
                Some(19),
                Some(20),
                Some(21),
                Some(22),
                Some(23),
                None,
                Some(35)
            ]
        );
        assert_eq!(disabled(&items), vec![20]);
    }

    #[test]
    fn test_window_at_the_edges() {
        let items = page_bar(1, 35, 11);
        let expected: Vec<Option<u32>> = (1..=8).map(Some).collect();
        assert_eq!(pages(&items)[..8], expected[..]);
        assert_eq!(pages(&items)[8..], [None, Some(35)]);

        let items = page_bar(35, 35, 11);
        assert_eq!(pages(&items)[..2], [Some(1), None]);
        assert_eq!(*pages(&items).last().unwrap(), Some(35));
        assert_eq!(disabled(&items), vec![35]);
        assert!(items.len() <= 11);
    }

    #[test]
    fn test_huge_page_count_stays_bounded() {
        let total = total_pages(99_999_999_999);
        assert_eq!(total, u32::MAX);

        let items = page_bar(1, total, 24);
        assert!(items.len() <= 24);
        assert_eq!(*pages(&items).last().unwrap(), Some(u32::MAX));

        let items = page_bar(u32::MAX, total, 24);
        assert!(items.len() <= 24);
        assert_eq!(disabled(&items), vec![u32::MAX]);
    }
}
