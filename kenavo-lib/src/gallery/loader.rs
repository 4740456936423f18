use getset::{CopyGetters, Getters};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{config::GalleryConfig, gallery::PageSource};

/// Observable state of a [`PageLoader`].
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct LoaderState<T> {
    /// Everything loaded so far, in page order
    #[getset(get = "pub")]
    items: Vec<T>,
    /// Last page successfully applied, 0 before the first load
    #[getset(get_copy = "pub")]
    page: u32,
    #[getset(get_copy = "pub")]
    total: u64,
    #[getset(get_copy = "pub")]
    has_more: bool,
    #[getset(get_copy = "pub")]
    in_flight: bool,
    /// Message of the last failed load, cleared by the next successful one
    #[getset(get = "pub")]
    error: Option<String>,
    /// Number of "load more" requests issued since the last reset
    #[getset(get_copy = "pub")]
    auto_load_count: u32,
    alive: bool,
}

impl<T> Default for LoaderState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            page: 0,
            total: 0,
            has_more: true,
            in_flight: false,
            error: None,
            auto_load_count: 0,
            alive: true,
        }
    }
}

/// What a load call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was appended, carrying this many items
    Appended(usize),
    /// The list was replaced by page 1
    Replaced(usize),
    /// The call was ignored: a request was in flight, nothing more to load, or detached
    Dropped,
    /// The request failed, see [`LoaderState::error`]
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Append,
    Replace,
}

/// Accumulates the pages of a paginated listing.
///
/// At most one request is in flight at a time; calls made meanwhile are dropped, not queued.
/// Pages therefore always apply in increasing order. A failed request leaves the loaded items
/// untouched and records its message in [`LoaderState::error`].
pub struct PageLoader<T, S> {
    source: S,
    page_size: u32,
    auto_load_ceiling: u32,
    state: Mutex<LoaderState<T>>,
}

impl<T, S> PageLoader<T, S>
where
    S: PageSource<T>,
{
    pub fn new(source: S, page_size: u32) -> Self {
        Self {
            source,
            page_size,
            auto_load_ceiling: GalleryConfig::default().auto_load_ceiling,
            state: Mutex::new(LoaderState::default()),
        }
    }

    pub fn from_config(source: S, cfg: &GalleryConfig) -> Self {
        Self::new(source, cfg.page_size).with_auto_load_ceiling(cfg.auto_load_ceiling)
    }

    pub fn with_auto_load_ceiling(mut self, ceiling: u32) -> Self {
        self.auto_load_ceiling = ceiling;
        self
    }

    /// Fetch page 1, replacing whatever is loaded.
    pub async fn load_initial(&self) -> LoadOutcome {
        self.fetch(Mode::Replace).await
    }

    /// Fetch the next page and append it.
    pub async fn load_more(&self) -> LoadOutcome {
        self.fetch(Mode::Append).await
    }

    /// Forget everything loaded and fetch page 1 again. Ignored while a request is in flight.
    pub async fn reset(&self) -> LoadOutcome {
        {
            let mut state = self.state.lock();
            if state.in_flight || !state.alive {
                trace!("Ignoring reset while a request is in flight");
                return LoadOutcome::Dropped;
            }
            state.items.clear();
            state.page = 0;
            state.total = 0;
            state.has_more = true;
            state.error = None;
            state.auto_load_count = 0;
        }

        self.fetch(Mode::Replace).await
    }

    /// Retry after a failure: page 1 if nothing is loaded yet, otherwise the next page.
    pub async fn retry(&self) -> LoadOutcome {
        let empty = self.state.lock().items.is_empty();
        if empty {
            self.fetch(Mode::Replace).await
        } else {
            self.fetch(Mode::Append).await
        }
    }

    /// Called when the end of the list scrolls into view. Only loads while under the
    /// auto-load ceiling; past it the user has to ask explicitly with [`Self::load_more`].
    pub async fn on_visible(&self) -> LoadOutcome {
        if !self.can_auto_load() {
            trace!("Auto-load ceiling of {} reached", self.auto_load_ceiling);
            return LoadOutcome::Dropped;
        }

        self.load_more().await
    }

    pub fn can_auto_load(&self) -> bool {
        let state = self.state.lock();
        state.has_more && state.auto_load_count < self.auto_load_ceiling
    }

    /// Stop applying responses. Requests already sent still run to completion but their
    /// results are discarded.
    pub fn detach(&self) {
        self.state.lock().alive = false;
    }

    pub fn is_detached(&self) -> bool {
        !self.state.lock().alive
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn fetch(&self, mode: Mode) -> LoadOutcome {
        let page = {
            let mut state = self.state.lock();
            if !state.alive {
                return LoadOutcome::Dropped;
            }
            if state.in_flight {
                trace!("Request already in flight, dropping {mode:?}");
                return LoadOutcome::Dropped;
            }

            let page = match mode {
                Mode::Append if !state.has_more => {
                    trace!("No more pages to load");
                    return LoadOutcome::Dropped;
                }
                Mode::Append => {
                    state.auto_load_count = state.auto_load_count.saturating_add(1);
                    state.page.saturating_add(1)
                }
                Mode::Replace => 1,
            };

            state.in_flight = true;
            page
        };

        debug!("Fetching page {page}");
        let result = self.source.fetch_page(page, self.page_size).await;

        let mut state = self.state.lock();
        state.in_flight = false;

        if !state.alive {
            warn!("Discarding page {page} that arrived after detach");
            return LoadOutcome::Dropped;
        }

        match result {
            Ok(fetched) => {
                let count = fetched.items.len();
                state.page = page;
                state.total = fetched.total;
                state.has_more = fetched.has_more;
                state.error = None;

                match mode {
                    Mode::Append => {
                        state.items.extend(fetched.items);
                        LoadOutcome::Appended(count)
                    }
                    Mode::Replace => {
                        state.items = fetched.items;
                        LoadOutcome::Replaced(count)
                    }
                }
            }
            Err(err) => {
                warn!("Failed to load page {page}: {err}");
                state.error = Some(err.to_string());
                LoadOutcome::Failed
            }
        }
    }
}

impl<T, S> PageLoader<T, S>
where
    T: Clone,
    S: PageSource<T>,
{
    /// A copy of the current state for rendering.
    pub fn snapshot(&self) -> LoaderState<T> {
        self.state.lock().clone()
    }

    pub fn items(&self) -> Vec<T> {
        self.state.lock().items.clone()
    }
}
