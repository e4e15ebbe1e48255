pub mod auth;
pub mod breadcrumb;
