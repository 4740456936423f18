use serde::{Deserialize, Serialize};

/// A gallery album as listed by the album endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryAlbum {
    pub id: i64,
    pub name: String,
    /// Stable identifier used in album URLs
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    /// Computed by the server
    #[serde(default)]
    pub image_count: u32,
}

/// One page of a paginated listing.
///
/// Endpoints name the array after what they list (`albums`), which is accepted in place of
/// `items`. `has_more` is taken as sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(alias = "albums")]
    pub items: Vec<T>,
    pub total: u64,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Build a page the way the server does, deriving `has_more` from the page numbers.
    pub fn new(items: Vec<T>, total: u64, current_page: u32, total_pages: u32) -> Self {
        Self {
            items,
            total,
            current_page,
            total_pages,
            has_more: current_page < total_pages,
        }
    }
}
