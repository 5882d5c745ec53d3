#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PageLink {
    Page(u64),

    /// Some pages were left out here
    Ellipsis,
}

/// Numbered page controls for a listing currently showing page `current`
///
/// Shows the first page, the last page and every page within two of the
/// current one. Empty when there is nothing to paginate.
pub fn page_links(current: u64, total_pages: u64) -> Vec<PageLink> {
    if total_pages <= 1 {
        return Vec::new();
    }
    let current = current.clamp(1, total_pages);
    let mut res = Vec::new();
    for page in 1..=total_pages {
        let dist = page.abs_diff(current);
        if page == 1 || page == total_pages || dist <= 2 {
            res.push(PageLink::Page(page));
        } else if dist == 3 {
            res.push(PageLink::Ellipsis);
        }
    }
    res
}
