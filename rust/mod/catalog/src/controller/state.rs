//! Product listing state, published to views through a watch channel.

use catalog_core::{CatalogError, ListQuery, PageWindow, Pagination, Redirect};

use crate::model::{manufacturer_name, Manufacturer, Product, User};

/// Everything a products page renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductListState {
    pub current_page: u32,
    pub items_per_page: u32,
    pub total_items: u32,

    /// Whether `total_items` came from the server's count header.
    pub total_exact: bool,

    /// Raw search box text.
    pub search_term: String,

    /// Committed search term used by loads.
    pub debounced_search_term: String,

    pub products: Vec<Product>,
    pub manufacturers: Vec<Manufacturer>,
    pub user: Option<User>,
    pub loading: bool,

    /// Blocking page-level error from the last load.
    pub error: Option<CatalogError>,

    /// Set when the view must leave the page.
    pub redirect: Option<Redirect>,
}

impl ProductListState {
    pub fn new(items_per_page: u32) -> Self {
        Self {
            current_page: 1,
            items_per_page: items_per_page.max(1),
            total_items: 0,
            total_exact: false,
            search_term: String::new(),
            debounced_search_term: String::new(),
            products: Vec::new(),
            manufacturers: Vec::new(),
            user: None,
            loading: false,
            error: None,
            redirect: None,
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            current_page: self.current_page,
            items_per_page: self.items_per_page,
            total_items: self.total_items,
        }
    }

    /// Pager layout; hidden by views when the page is empty.
    pub fn page_window(&self) -> PageWindow {
        self.pagination().window()
    }

    /// Listing request for the current page and committed search.
    pub fn query(&self) -> ListQuery {
        ListQuery::new(
            self.current_page,
            self.items_per_page,
            self.debounced_search_term.clone(),
        )
    }

    pub fn manufacturer_name(&self, id: u64) -> &str {
        manufacturer_name(&self.manufacturers, id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Failure,
}

/// Transient notification emitted by mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Failure,
            message: message.into(),
        }
    }
}
