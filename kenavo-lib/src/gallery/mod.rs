//! Gallery albums and the paginated loader behind the album list.

mod album;
mod loader;
mod source;

pub use album::{GalleryAlbum, Page};
pub use loader::{LoadOutcome, LoaderState, PageLoader};
pub use source::{HttpPageSource, PageSource};

use crate::{ApiClient, Cfg};

/// Loader over the configured album endpoint.
pub fn album_loader(
    client: ApiClient,
    cfg: &Cfg,
) -> PageLoader<GalleryAlbum, HttpPageSource<GalleryAlbum>> {
    let gallery = cfg.read().gallery.clone();
    PageLoader::from_config(HttpPageSource::new(client, &gallery.endpoint), &gallery)
}
