// src/listing/pagination.rs
use serde::Serialize;

const MAX_PAGES_TO_SHOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "page", rename_all = "lowercase")]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

/// Compact page strip for the pagination control. Empty when there is at
/// most one page, since the control is not rendered then.
pub fn page_strip(current: usize, total_pages: usize) -> Vec<PageItem> {
    if total_pages <= 1 {
        return Vec::new();
    }

    let half = MAX_PAGES_TO_SHOW / 2;
    let pages = |range: std::ops::RangeInclusive<usize>| range.map(PageItem::Page);

    if total_pages <= MAX_PAGES_TO_SHOW {
        pages(1..=total_pages).collect()
    } else if current <= half + 1 {
        pages(1..=MAX_PAGES_TO_SHOW - 1)
            .chain([PageItem::Ellipsis, PageItem::Page(total_pages)])
            .collect()
    } else if current >= total_pages - half {
        [PageItem::Page(1), PageItem::Ellipsis]
            .into_iter()
            .chain(pages(total_pages - (MAX_PAGES_TO_SHOW - 2)..=total_pages))
            .collect()
    } else {
        [PageItem::Page(1), PageItem::Ellipsis]
            .into_iter()
            .chain(pages(current - 1..=current + 1))
            .chain([PageItem::Ellipsis, PageItem::Page(total_pages)])
            .collect()
    }
}
