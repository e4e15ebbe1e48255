//! In-memory [`CatalogApi`] for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use catalog_client::{ApiError, Session};
use catalog_core::{ListQuery, Page};
use tokio::sync::oneshot;

use crate::api::CatalogApi;
use crate::model::{
    BreadcrumbNode, ImageUpload, LoginResponse, Manufacturer, Price, Product, ProductDraft,
    ProductPatch, Role, User,
};

pub const TOKEN: &str = "test-token";
pub const PASSWORD: &str = "secret";

pub fn admin() -> User {
    User {
        id: 1,
        name: "Admin".into(),
        email: "admin@example.com".into(),
        roles: vec![Role::from_id(1)],
    }
}

pub fn plain_user() -> User {
    User {
        id: 2,
        name: "Bob".into(),
        email: "bob@example.com".into(),
        roles: vec![Role::from_id(2)],
    }
}

pub fn product(id: u64, name: &str) -> Product {
    Product {
        id,
        name: name.into(),
        quantity: 1,
        price: Price::Number(10.0),
        manufacturer_id: 1,
        photo_url: String::new(),
    }
}

pub fn draft(name: &str) -> ProductDraft {
    ProductDraft {
        name: name.into(),
        quantity: 2,
        price: "15.50".into(),
        photo_url: String::new(),
        manufacturer_id: 1,
    }
}

/// Lets a test observe a listing request and decide when it completes.
pub struct Gate {
    entered: oneshot::Sender<()>,
    release: oneshot::Receiver<()>,
}

struct Store {
    user: User,
    products: Vec<Product>,
    next_id: u64,
    manufacturers: Vec<Manufacturer>,
    breadcrumbs: Vec<BreadcrumbNode>,
    send_total: bool,
    fail_lists: bool,
    fail_mutations: bool,
    revoked: bool,
    list_calls: Vec<ListQuery>,
    images: Vec<(u64, String)>,
}

pub struct FakeCatalog {
    store: Mutex<Store>,
    gates: Mutex<HashMap<u32, Gate>>,
}

impl FakeCatalog {
    pub fn new(user: User) -> Self {
        Self {
            store: Mutex::new(Store {
                user,
                products: Vec::new(),
                next_id: 1,
                manufacturers: vec![
                    Manufacturer { id: 1, name: "Acme".into() },
                    Manufacturer { id: 2, name: "Globex".into() },
                ],
                breadcrumbs: Vec::new(),
                send_total: true,
                fail_lists: false,
                fail_mutations: false,
                revoked: false,
                list_calls: Vec::new(),
                images: Vec::new(),
            }),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Seed `count` products named `Item 1` .. `Item {count}`.
    pub fn with_products(user: User, count: u64) -> Self {
        let api = Self::new(user);
        for i in 1..=count {
            api.add_product(&format!("Item {}", i));
        }
        api
    }

    pub fn add_product(&self, name: &str) -> u64 {
        let mut store = self.store.lock().unwrap();
        let id = store.next_id;
        store.next_id += 1;
        store.products.push(product(id, name));
        id
    }

    pub fn set_breadcrumbs(&self, nodes: Vec<BreadcrumbNode>) {
        self.store.lock().unwrap().breadcrumbs = nodes;
    }

    pub fn set_send_total(&self, on: bool) {
        self.store.lock().unwrap().send_total = on;
    }

    pub fn set_fail_lists(&self, on: bool) {
        self.store.lock().unwrap().fail_lists = on;
    }

    pub fn set_fail_mutations(&self, on: bool) {
        self.store.lock().unwrap().fail_mutations = on;
    }

    /// Reject the test token from now on.
    pub fn revoke(&self) {
        self.store.lock().unwrap().revoked = true;
    }

    pub fn list_calls(&self) -> Vec<ListQuery> {
        self.store.lock().unwrap().list_calls.clone()
    }

    pub fn product_count(&self) -> usize {
        self.store.lock().unwrap().products.len()
    }

    pub fn images(&self) -> Vec<(u64, String)> {
        self.store.lock().unwrap().images.clone()
    }

    /// Hold the next listing of `page`. The first receiver fires once the
    /// request arrives; the request completes when the sender fires.
    pub fn hold_page(&self, page: u32) -> (oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(
            page,
            Gate {
                entered: entered_tx,
                release: release_rx,
            },
        );
        (entered_rx, release_tx)
    }

    fn check(&self, session: &Session) -> Result<(), ApiError> {
        let Some(token) = session.bearer() else {
            return Err(ApiError::Auth("no active session".into()));
        };
        if token != TOKEN || self.store.lock().unwrap().revoked {
            return Err(unauthorized());
        }
        Ok(())
    }

    fn check_mutation(&self, session: &Session) -> Result<(), ApiError> {
        self.check(session)?;
        if self.store.lock().unwrap().fail_mutations {
            return Err(ApiError::Server {
                status: 500,
                message: "write failed".into(),
            });
        }
        Ok(())
    }
}

fn unauthorized() -> ApiError {
    ApiError::Server {
        status: 401,
        message: "unauthorized".into(),
    }
}

fn not_found(id: u64) -> ApiError {
    ApiError::Server {
        status: 404,
        message: format!("product {} not found", id),
    }
}

#[async_trait::async_trait]
impl CatalogApi for FakeCatalog {
    async fn login(&self, _email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        if password != PASSWORD {
            return Err(unauthorized());
        }
        Ok(LoginResponse {
            token: TOKEN.into(),
            user: self.store.lock().unwrap().user.clone(),
        })
    }

    async fn me(&self, session: &Session) -> Result<User, ApiError> {
        self.check(session)?;
        Ok(self.store.lock().unwrap().user.clone())
    }

    async fn breadcrumbs(&self, session: &Session) -> Result<Vec<BreadcrumbNode>, ApiError> {
        self.check(session)?;
        Ok(self.store.lock().unwrap().breadcrumbs.clone())
    }

    async fn products(&self, query: &ListQuery, session: &Session) -> Result<Page<Product>, ApiError> {
        self.check(session)?;
        self.store.lock().unwrap().list_calls.push(query.clone());

        let gate = self.gates.lock().unwrap().remove(&query.page);
        if let Some(gate) = gate {
            let _ = gate.entered.send(());
            let _ = gate.release.await;
        }

        let store = self.store.lock().unwrap();
        if store.fail_lists {
            return Err(ApiError::Server {
                status: 500,
                message: "listing failed".into(),
            });
        }
        let needle = query.q.to_lowercase();
        let matching: Vec<&Product> = store
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .collect();
        let total = matching.len() as u32;
        let start = ((query.page - 1) * query.limit) as usize;
        let items: Vec<Product> = matching
            .into_iter()
            .skip(start)
            .take(query.limit as usize)
            .cloned()
            .collect();
        Ok(Page::from_parts(items, store.send_total.then_some(total)))
    }

    async fn product(&self, id: u64, session: &Session) -> Result<Product, ApiError> {
        self.check(session)?;
        let store = self.store.lock().unwrap();
        store
            .products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn create_product(&self, draft: &ProductDraft, session: &Session) -> Result<Product, ApiError> {
        self.check_mutation(session)?;
        let mut store = self.store.lock().unwrap();
        let created = Product {
            id: store.next_id,
            name: draft.name.clone(),
            quantity: draft.quantity,
            price: Price::Text(draft.price.clone()),
            manufacturer_id: draft.manufacturer_id,
            photo_url: draft.photo_url.clone(),
        };
        store.next_id += 1;
        store.products.push(created.clone());
        Ok(created)
    }

    async fn update_product(
        &self,
        id: u64,
        patch: &ProductPatch,
        image: Option<ImageUpload>,
        session: &Session,
    ) -> Result<Product, ApiError> {
        self.check_mutation(session)?;
        let mut store = self.store.lock().unwrap();
        if let Some(image) = image {
            store.images.push((id, image.file_name));
        }
        let existing = store
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found(id))?;
        existing.name = patch.name.clone();
        existing.quantity = patch.quantity;
        existing.price = Price::Text(patch.price.clone());
        existing.manufacturer_id = patch.manufacturer_id;
        Ok(existing.clone())
    }

    async fn delete_product(&self, id: u64, session: &Session) -> Result<(), ApiError> {
        self.check_mutation(session)?;
        let mut store = self.store.lock().unwrap();
        let before = store.products.len();
        store.products.retain(|p| p.id != id);
        if store.products.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn manufacturers(&self, session: &Session) -> Result<Vec<Manufacturer>, ApiError> {
        self.check(session)?;
        Ok(self.store.lock().unwrap().manufacturers.clone())
    }
}
