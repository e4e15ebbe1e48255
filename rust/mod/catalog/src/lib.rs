//! Catalog admin: domain model, the remote API seam, the breadcrumb
//! resolver and the product list controller.

pub mod api;
pub mod controller;
pub mod model;
pub mod service;

#[cfg(test)]
mod testing;

pub use api::{CatalogApi, HttpCatalog};
pub use controller::{
    CreateOutcome, LoadOutcome, Notice, NoticeLevel, ProductListController, ProductListState,
};
