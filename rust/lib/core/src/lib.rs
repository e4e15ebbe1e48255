//! Shared building blocks for the catalog admin client: the error
//! taxonomy, pagination math and client settings.

pub mod config;
pub mod error;
pub mod types;

pub use config::{normalize_base_url, CatalogSettings};
pub use error::{CatalogError, Redirect, Surface};
pub use types::{
    total_pages, ListQuery, Page, PageRedirect, PageWindow, Pagination, TOTAL_COUNT_HEADER,
};
