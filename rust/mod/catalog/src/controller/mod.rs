//! Product list controller.
//!
//! Owns the products page state and drives it from user intents: search
//! typing (debounced), paging, manual refresh and the create / update /
//! delete mutations. State is published through a `watch` channel and
//! mutation notices through an unbounded `mpsc` channel.
//!
//! Loads are tagged with a monotonically increasing generation. Starting a
//! load cancels the token of the one in flight, and results are applied
//! only while their generation is still the latest.

mod state;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use catalog_client::{ApiError, Session};
use catalog_core::{CatalogError, CatalogSettings, ListQuery, Page, PageRedirect, Redirect};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::CatalogApi;
use crate::model::{ImageUpload, Manufacturer, Product, ProductDraft, ProductPatch, User};
use crate::service::auth::EDIT_ALLOWED_ROLES;

pub use state::{Notice, NoticeLevel, ProductListState};

/// What happened to a requested load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Fresh results are in the state.
    Applied,
    /// A newer load started first; these results were dropped.
    Superseded,
    /// Nothing changed, so nothing was fetched.
    Unchanged,
}

/// Result of a successful creation.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOutcome {
    pub product: Product,
    /// Page the listing moved to, when the record landed elsewhere.
    pub navigated_to: Option<u32>,
}

struct Loaded {
    user: User,
    page: Page<Product>,
    manufacturers: Vec<Manufacturer>,
}

pub struct ProductListController {
    api: Arc<dyn CatalogApi>,
    session: Arc<Session>,
    settings: CatalogSettings,
    state: watch::Sender<ProductListState>,
    generation: AtomicU64,
    inflight: Mutex<Option<CancellationToken>>,
    pending_search: Mutex<Option<CancellationToken>>,
    notices: mpsc::UnboundedSender<Notice>,
}

impl ProductListController {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        session: Arc<Session>,
        settings: CatalogSettings,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<Notice>) {
        let (state, _) = watch::channel(ProductListState::new(settings.page_size()));
        let (notices, notices_rx) = mpsc::unbounded_channel();
        let controller = Arc::new(Self {
            api,
            session,
            settings,
            state,
            generation: AtomicU64::new(0),
            inflight: Mutex::new(None),
            pending_search: Mutex::new(None),
            notices,
        });
        (controller, notices_rx)
    }

    pub fn subscribe(&self) -> watch::Receiver<ProductListState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ProductListState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // ── Search ──────────────────────────────────────────────────────

    /// Record raw search text and schedule a debounced commit.
    ///
    /// Only the most recent keystroke commits; each call replaces the
    /// pending one.
    pub fn search_term_changed(self: &Arc<Self>, text: impl Into<String>) {
        let text = text.into();
        self.state.send_modify(|s| s.search_term = text.clone());

        let token = CancellationToken::new();
        self.replace_pending_search(Some(token.clone()));

        let delay = self.settings.search_debounce();
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if let Err(e) = this.commit_search(text).await {
                        warn!("debounced search failed: {}", e);
                    }
                }
            }
        });
    }

    /// Commit `text` right away, dropping any pending debounced commit.
    pub async fn submit_search(&self, text: impl Into<String>) -> Result<LoadOutcome, CatalogError> {
        let text = text.into();
        self.replace_pending_search(None);
        self.state.send_modify(|s| s.search_term = text.clone());
        self.commit_search(text).await
    }

    async fn commit_search(&self, term: String) -> Result<LoadOutcome, CatalogError> {
        let changed = self.state.send_if_modified(|s| {
            if s.debounced_search_term == term && s.current_page == 1 {
                return false;
            }
            s.debounced_search_term = term;
            s.current_page = 1;
            true
        });
        if !changed {
            return Ok(LoadOutcome::Unchanged);
        }
        self.load().await
    }

    fn replace_pending_search(&self, next: Option<CancellationToken>) {
        let mut slot = self
            .pending_search
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(prev) = std::mem::replace(&mut *slot, next) {
            prev.cancel();
        }
    }

    // ── Paging ──────────────────────────────────────────────────────

    /// Move to `page`, clamped to 1 and, when the total is known exactly,
    /// to the last page.
    pub async fn set_page(&self, page: u32) -> Result<LoadOutcome, CatalogError> {
        let changed = self.state.send_if_modified(|s| {
            let mut target = page.max(1);
            if s.total_exact && s.total_items > 0 {
                target = target.min(s.pagination().last_page());
            }
            if target == s.current_page {
                return false;
            }
            s.current_page = target;
            true
        });
        if !changed {
            return Ok(LoadOutcome::Unchanged);
        }
        self.load().await
    }

    /// Manual retry.
    pub async fn refresh(&self) -> Result<LoadOutcome, CatalogError> {
        self.load().await
    }

    // ── Loading ─────────────────────────────────────────────────────

    /// Fetch identity, the current product page and manufacturers, then
    /// apply all three at once.
    ///
    /// A failure leaves the previous data in place and records the error.
    /// When an exact total puts the current page past the last page, the
    /// page is pulled back and loaded again.
    pub async fn load(&self) -> Result<LoadOutcome, CatalogError> {
        loop {
            let (outcome, clamped) = self.load_once().await?;
            if clamped.is_none() {
                return Ok(outcome);
            }
        }
    }

    async fn load_once(&self) -> Result<(LoadOutcome, Option<u32>), CatalogError> {
        let (generation, cancel) = self.begin_load();
        let query = self.state.borrow().query();
        self.state.send_modify(|s| s.loading = true);
        debug!(generation, page = query.page, q = %query.q, "loading products");

        let fetched = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(generation, "load superseded");
                return Ok((LoadOutcome::Superseded, None));
            }
            fetched = self.fetch(&query) => fetched,
        };

        match fetched {
            Ok(loaded) => {
                if !loaded.page.total_exact {
                    debug!(generation, "total count missing; using page length");
                }
                let mut clamped = None;
                let applied = self.state.send_if_modified(|s| {
                    if !self.is_current(generation) {
                        return false;
                    }
                    s.user = Some(loaded.user);
                    s.total_items = loaded.page.total;
                    s.total_exact = loaded.page.total_exact;
                    s.products = loaded.page.items;
                    s.manufacturers = loaded.manufacturers;
                    s.loading = false;
                    s.error = None;
                    let last = s.pagination().last_page();
                    if s.total_exact && s.total_items > 0 && s.current_page > last {
                        s.current_page = last;
                        clamped = Some(last);
                    }
                    true
                });
                if let Some(last) = clamped {
                    debug!(generation, page = last, "page out of range; moving to last page");
                }
                Ok(if applied {
                    (LoadOutcome::Applied, clamped)
                } else {
                    (LoadOutcome::Superseded, None)
                })
            }
            Err(e) => {
                if !self.is_current(generation) {
                    return Ok((LoadOutcome::Superseded, None));
                }
                let err = e.into_load_error();
                warn!(generation, "load failed: {}", err);
                self.fail_load(&err);
                Err(err)
            }
        }
    }

    async fn fetch(&self, query: &ListQuery) -> Result<Loaded, ApiError> {
        let session = self.session.as_ref();
        let user = self.api.me(session).await?;
        let page = self.api.products(query, session).await?;
        let manufacturers = self.api.manufacturers(session).await?;
        Ok(Loaded {
            user,
            page,
            manufacturers,
        })
    }

    fn begin_load(&self) -> (u64, CancellationToken) {
        let token = CancellationToken::new();
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(prev) = inflight.replace(token.clone()) {
            prev.cancel();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        (generation, token)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn fail_load(&self, err: &CatalogError) {
        if err.is_auth_expired() {
            self.expire_session();
        }
        self.state.send_modify(|s| {
            s.loading = false;
            s.error = Some(err.clone());
        });
    }

    fn expire_session(&self) {
        if self.session.teardown() {
            info!("session expired");
        }
        self.state.send_modify(|s| s.redirect = Some(Redirect::Login));
    }

    // ── Mutations ───────────────────────────────────────────────────

    /// Create a product and reconcile pagination.
    ///
    /// When the current page is not the last page after the insert, the
    /// listing moves to the last page and reloads. Otherwise the record is
    /// appended in place.
    pub async fn create_product(&self, draft: ProductDraft) -> Result<CreateOutcome, CatalogError> {
        let manufacturers = self.state.borrow().manufacturers.clone();
        if let Err(e) = draft.validate(&manufacturers) {
            self.notify(Notice::failure(e.to_string()));
            return Err(e);
        }

        let product = match self.api.create_product(&draft, &self.session).await {
            Ok(product) => product,
            Err(e) => return Err(self.fail_mutation(e, "failed to add product")),
        };
        info!(id = product.id, "product created");

        let mut navigated_to = None;
        self.state.send_modify(|s| {
            s.total_items += 1;
            let last = s.pagination().last_page();
            if s.current_page != last {
                s.current_page = last;
                navigated_to = Some(last);
            } else {
                s.products.push(product.clone());
            }
        });
        self.notify(Notice::success("Product added"));

        if navigated_to.is_some() {
            if let Err(e) = self.load().await {
                warn!("reload after create failed: {}", e);
            }
        }
        Ok(CreateOutcome {
            product,
            navigated_to,
        })
    }

    /// Edit a product, optionally replacing its image.
    pub async fn update_product(
        &self,
        id: u64,
        patch: ProductPatch,
        image: Option<ImageUpload>,
    ) -> Result<Product, CatalogError> {
        self.require_editor()?;
        if let Err(e) = patch.validate() {
            self.notify(Notice::failure(e.to_string()));
            return Err(e);
        }

        let product = match self.api.update_product(id, &patch, image, &self.session).await {
            Ok(product) => product,
            Err(e) => return Err(self.fail_mutation(e, "failed to update product")),
        };
        info!(id, "product updated");

        self.state.send_if_modified(|s| {
            match s.products.iter_mut().find(|p| p.id == id) {
                Some(slot) => {
                    *slot = product.clone();
                    true
                }
                None => false,
            }
        });
        self.notify(Notice::success("Product updated"));
        Ok(product)
    }

    /// Fetch one product for the edit form.
    pub async fn product(&self, id: u64) -> Result<Product, CatalogError> {
        self.api.product(id, &self.session).await.map_err(|e| {
            let err = e.into_load_error();
            if err.is_auth_expired() {
                self.expire_session();
            }
            err
        })
    }

    /// Delete a product, re-fetch the current page and report whether the
    /// caller should move to an earlier page.
    ///
    /// A failed or superseded re-fetch leaves the caller where it is.
    pub async fn delete_product(&self, id: u64) -> Result<PageRedirect, CatalogError> {
        self.require_editor()?;
        if let Err(e) = self.api.delete_product(id, &self.session).await {
            return Err(self.fail_mutation(e, "failed to delete product"));
        }
        info!(id, "product deleted");
        self.notify(Notice::success("Product deleted"));

        let (generation, cancel) = self.begin_load();
        let query = self.state.borrow().query();
        let stay = PageRedirect::stay(query.page);

        let fetched = tokio::select! {
            _ = cancel.cancelled() => return Ok(stay),
            fetched = self.api.products(&query, &self.session) => fetched,
        };
        if !self.is_current(generation) {
            return Ok(stay);
        }

        match fetched {
            Ok(page) => {
                let redirect = PageRedirect::after_delete(
                    query.page,
                    page.items.len(),
                    page.total,
                    query.limit,
                );
                self.state.send_modify(|s| {
                    s.total_items = page.total;
                    s.total_exact = page.total_exact;
                    s.products = page.items;
                    s.loading = false;
                    s.error = None;
                });
                Ok(redirect)
            }
            Err(e) => {
                let err = e.into_load_error();
                warn!("refetch after delete failed: {}", err);
                self.fail_load(&err);
                Ok(stay)
            }
        }
    }

    /// Edit and delete are limited to administrators. The user comes from
    /// the last applied load.
    fn require_editor(&self) -> Result<(), CatalogError> {
        let allowed = self
            .state
            .borrow()
            .user
            .as_ref()
            .is_some_and(|u| u.has_any_role(EDIT_ALLOWED_ROLES));
        if allowed {
            return Ok(());
        }
        let err = CatalogError::Forbidden("only administrators may edit or delete products".to_string());
        warn!("{}", err);
        self.notify(Notice::failure(err.to_string()));
        Err(err)
    }

    fn fail_mutation(&self, e: ApiError, action: &str) -> CatalogError {
        let err = e.into_mutation_error(action);
        warn!("{}", err);
        if err.is_auth_expired() {
            self.expire_session();
        }
        self.notify(Notice::failure(err.to_string()));
        err
    }

    fn notify(&self, notice: Notice) {
        if self.notices.send(notice).is_err() {
            debug!("notice dropped: no listener");
        }
    }
}
