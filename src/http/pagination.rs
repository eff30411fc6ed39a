use serde::{Deserialize, Serialize};

/// Zero-based page selection resolved against the configured limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    /// Missing or zero `size` falls back to `default_size`; anything above
    /// `max_size` is clamped.
    pub fn resolve(
        page: Option<usize>,
        size: Option<usize>,
        default_size: usize,
        max_size: usize,
    ) -> Self {
        let max_size = max_size.max(1);
        let size = match size {
            Some(0) | None => default_size,
            Some(requested) => requested,
        };
        Self {
            page: page.unwrap_or(0),
            size: size.clamp(1, max_size),
        }
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

/// One page of an already ordered result set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: usize,
    pub total_pages: usize,
    pub page: usize,
    pub size: usize,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn slice(items: Vec<T>, request: PageRequest) -> Self {
        let total_elements = items.len();
        let offset = request.offset();
        let content: Vec<T> = items
            .into_iter()
            .skip(offset)
            .take(request.size)
            .collect();
        let total_pages = total_elements.div_ceil(request.size);

        Self {
            has_more: offset.saturating_add(content.len()) < total_elements,
            content,
            total_elements,
            total_pages,
            page: request.page,
            size: request.size,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
