use std::future::Future;

use log::{debug, error};

use crate::error::Result;

pub const PAGE_SIZE: u32 = 100;

/// Position of the next page to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCursor {
    /// 1-based page number, as GitHub paginates.
    Page { page: u32, per_page: u32 },
    /// Offset window, as Azure DevOps paginates.
    Window { skip: u32, top: u32 },
}

impl PageCursor {
    pub fn first_page() -> Self {
        Self::Page {
            page: 1,
            per_page: PAGE_SIZE,
        }
    }

    pub fn first_window() -> Self {
        Self::Window {
            skip: 0,
            top: PAGE_SIZE,
        }
    }

    /// Page number and size, converting a window if needed.
    pub fn as_page(self) -> (u32, u32) {
        match self {
            Self::Page { page, per_page } => (page, per_page),
            Self::Window { skip, top } => (skip / top.max(1) + 1, top),
        }
    }

    /// Skip and top, converting a page number if needed.
    pub fn as_window(self) -> (u32, u32) {
        match self {
            Self::Page { page, per_page } => (page.saturating_sub(1) * per_page, per_page),
            Self::Window { skip, top } => (skip, top),
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Page { page, per_page } => Self::Page {
                page: page + 1,
                per_page,
            },
            Self::Window { skip, top } => Self::Window {
                skip: skip + top,
                top,
            },
        }
    }

    /// Page-numbered APIs only signal the end with an empty page; windowed
    /// APIs end on the first short page.
    fn is_last(self, fetched: usize) -> bool {
        match self {
            Self::Page { .. } => fetched == 0,
            Self::Window { top, .. } => fetched < top as usize,
        }
    }
}

/// Fetches pages starting at `cursor` and concatenates them.
///
/// A failed page ends the loop: the error is logged and whatever was already
/// collected is returned.
pub async fn collect_pages<T, F, Fut>(what: &str, mut cursor: PageCursor, mut fetch: F) -> Vec<T>
where
    F: FnMut(PageCursor) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut items = Vec::new();

    loop {
        let page = match fetch(cursor).await {
            Ok(page) => page,
            Err(e) => {
                error!("Error fetching {what}: {e}");
                break;
            }
        };

        let fetched = page.len();
        items.extend(page);

        debug!(
            "{what}: {cursor:?} returned {fetched} items (total: {})",
            items.len()
        );

        if cursor.is_last(fetched) {
            break;
        }

        cursor = cursor.next();
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommitLensError;
    use reqwest::StatusCode;

    fn pages(sizes: &[usize]) -> Vec<Vec<usize>> {
        sizes.iter().map(|&n| (0..n).collect()).collect()
    }

    #[tokio::test]
    async fn test_page_mode_runs_until_empty_page() {
        let mut responses = pages(&[100, 100, 37, 0]).into_iter();
        let mut requested = Vec::new();

        let items = collect_pages("commits", PageCursor::first_page(), |cursor| {
            requested.push(cursor);
            let page = responses.next().unwrap_or_default();
            async move { Ok::<_, CommitLensError>(page) }
        })
        .await;

        assert_eq!(items.len(), 237);
        assert_eq!(requested.len(), 4);
        assert_eq!(
            requested.last(),
            Some(&PageCursor::Page {
                page: 4,
                per_page: 100
            })
        );
    }

    #[tokio::test]
    async fn test_window_mode_stops_on_short_page() {
        let mut responses = pages(&[100, 100, 37]).into_iter();
        let mut requested = Vec::new();

        let items = collect_pages("commits", PageCursor::first_window(), |cursor| {
            requested.push(cursor);
            let page = responses.next().unwrap_or_default();
            async move { Ok::<_, CommitLensError>(page) }
        })
        .await;

        assert_eq!(items.len(), 237);
        assert_eq!(
            requested,
            vec![
                PageCursor::Window { skip: 0, top: 100 },
                PageCursor::Window {
                    skip: 100,
                    top: 100
                },
                PageCursor::Window {
                    skip: 200,
                    top: 100
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_first_page_makes_a_single_request() {
        let mut calls = 0;

        let items: Vec<usize> = collect_pages("repositories", PageCursor::first_page(), |_| {
            calls += 1;
            async { Ok::<_, CommitLensError>(Vec::new()) }
        })
        .await;

        assert!(items.is_empty());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_failed_page_keeps_partial_results() {
        let mut calls = 0;

        let items = collect_pages("branches", PageCursor::first_page(), |_| {
            calls += 1;
            let result = if calls == 1 {
                Ok(vec![1, 2, 3])
            } else {
                Err(CommitLensError::Api {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "boom".to_string(),
                })
            };
            async move { result }
        })
        .await;

        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_cursor_conversions() {
        assert_eq!(PageCursor::first_page().as_window(), (0, 100));
        assert_eq!(
            PageCursor::Page {
                page: 3,
                per_page: 100
            }
            .as_window(),
            (200, 100)
        );
        assert_eq!(
            PageCursor::Window {
                skip: 200,
                top: 100
            }
            .as_page(),
            (3, 100)
        );
    }
}
