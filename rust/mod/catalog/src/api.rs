//! Remote catalog seam.
//!
//! Everything the admin logic needs from the REST API goes through
//! [`CatalogApi`]. [`HttpCatalog`] is the production implementation; tests
//! substitute an in-memory one. Every request-issuing call receives the
//! caller's [`Session`] explicitly.

use catalog_client::{multipart, ApiError, NoAuth, RestClient, Session};
use catalog_core::{ListQuery, Page};

use crate::model::{
    BreadcrumbNode, ImageUpload, LoginRequest, LoginResponse, Manufacturer, MeResponse, Product,
    ProductDraft, ProductPatch, User,
};

#[async_trait::async_trait]
pub trait CatalogApi: Send + Sync {
    /// `POST /login`, anonymous.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// `GET /me`
    async fn me(&self, session: &Session) -> Result<User, ApiError>;

    /// `GET /breadcrumbs`
    async fn breadcrumbs(&self, session: &Session) -> Result<Vec<BreadcrumbNode>, ApiError>;

    /// `GET /products?_page=&_limit=&q=`
    async fn products(&self, query: &ListQuery, session: &Session) -> Result<Page<Product>, ApiError>;

    /// `GET /products/{id}`
    async fn product(&self, id: u64, session: &Session) -> Result<Product, ApiError>;

    /// `POST /products`
    async fn create_product(&self, draft: &ProductDraft, session: &Session) -> Result<Product, ApiError>;

    /// `PATCH /products/{id}`
    async fn update_product(
        &self,
        id: u64,
        patch: &ProductPatch,
        image: Option<ImageUpload>,
        session: &Session,
    ) -> Result<Product, ApiError>;

    /// `DELETE /products/{id}`
    async fn delete_product(&self, id: u64, session: &Session) -> Result<(), ApiError>;

    /// `GET /manufacturers`
    async fn manufacturers(&self, session: &Session) -> Result<Vec<Manufacturer>, ApiError>;
}

/// [`CatalogApi`] over HTTP.
pub struct HttpCatalog {
    rest: RestClient,
}

impl HttpCatalog {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    pub fn base_url(&self) -> &str {
        self.rest.base_url()
    }
}

fn product_path(id: u64) -> String {
    format!("/products/{}", id)
}

/// Multipart body for an edit that carries an image.
fn patch_form(patch: &ProductPatch, image: ImageUpload) -> Result<multipart::Form, ApiError> {
    let part = multipart::Part::bytes(image.bytes)
        .file_name(image.file_name)
        .mime_str(&image.content_type)?;
    Ok(multipart::Form::new()
        .text("name", patch.name.clone())
        .text("quantity", patch.quantity.to_string())
        .text("price", patch.price.clone())
        .text("manufacturerId", patch.manufacturer_id.to_string())
        .part("image", part))
}

#[async_trait::async_trait]
impl CatalogApi for HttpCatalog {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.rest.post("/login", &body, &NoAuth).await
    }

    async fn me(&self, session: &Session) -> Result<User, ApiError> {
        let me: MeResponse = self.rest.get("/me", session).await?;
        Ok(me.user)
    }

    async fn breadcrumbs(&self, session: &Session) -> Result<Vec<BreadcrumbNode>, ApiError> {
        self.rest.get("/breadcrumbs", session).await
    }

    async fn products(&self, query: &ListQuery, session: &Session) -> Result<Page<Product>, ApiError> {
        self.rest.list("/products", query, session).await
    }

    async fn product(&self, id: u64, session: &Session) -> Result<Product, ApiError> {
        self.rest.get(&product_path(id), session).await
    }

    async fn create_product(&self, draft: &ProductDraft, session: &Session) -> Result<Product, ApiError> {
        self.rest.post("/products", draft, session).await
    }

    async fn update_product(
        &self,
        id: u64,
        patch: &ProductPatch,
        image: Option<ImageUpload>,
        session: &Session,
    ) -> Result<Product, ApiError> {
        match image {
            Some(image) => {
                let form = patch_form(patch, image)?;
                self.rest.patch_multipart(&product_path(id), form, session).await
            }
            None => self.rest.patch(&product_path(id), patch, session).await,
        }
    }

    async fn delete_product(&self, id: u64, session: &Session) -> Result<(), ApiError> {
        self.rest.delete(&product_path(id), session).await
    }

    async fn manufacturers(&self, session: &Session) -> Result<Vec<Manufacturer>, ApiError> {
        self.rest.get("/manufacturers", session).await
    }
}
