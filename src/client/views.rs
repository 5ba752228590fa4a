use std::fmt::Display;

use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    client::{
        api::{ApiClient, ClientError, ListRequest},
        routes::Route,
        session::{AuthContext, Session},
    },
    products::{
        dto::ProductPayload,
        model::{Analytics, Product, ProductPage, DEFAULT_PAGE_SIZE},
    },
};

/// Page size used by the admin table.
pub const ADMIN_PAGE_SIZE: u32 = 5;

/// `Idle -> Loading -> (Loaded | Failed) -> Idle` after [`ViewState::reset`].
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        ViewState::Idle
    }
}

impl<T> ViewState<T> {
    pub fn start(&mut self) {
        *self = ViewState::Loading;
    }

    pub fn settle<E: Display>(&mut self, result: Result<T, E>) {
        *self = match result {
            Ok(value) => ViewState::Loaded(value),
            Err(e) => ViewState::Failed(e.to_string()),
        };
    }

    pub fn reset(&mut self) {
        *self = ViewState::Idle;
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub page: ProductPage,
    pub analytics: Analytics,
}

/// Table position plus the last fetched page and analytics.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    pub state: ViewState<Snapshot>,
}

impl Listing {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            search: String::new(),
            state: ViewState::Idle,
        }
    }

    pub fn request(&self) -> ListRequest {
        ListRequest {
            page: self.page,
            limit: self.limit,
            name: self.search.clone(),
        }
    }

    /// Fetches the product page and analytics concurrently.
    pub async fn refresh(&mut self, client: &ApiClient, auth: &AuthContext) {
        self.state.start();
        let request = self.request();
        let result = tokio::try_join!(
            client.list_products(auth, &request),
            client.analytics(auth)
        )
        .map(|(page, analytics)| Snapshot { page, analytics });
        if let Err(e) = &result {
            debug!(error = %e, "listing refresh failed");
        }
        self.state.settle(result);
    }

    fn known_pages(&self) -> Option<u64> {
        self.state.data().map(|s| s.page.pages)
    }
}

#[derive(Debug, Clone)]
pub struct LoginView {
    client: ApiClient,
    pub username: String,
    pub password: String,
    pub state: ViewState<Route>,
}

impl LoginView {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            username: String::new(),
            password: String::new(),
            state: ViewState::Idle,
        }
    }

    /// Logs in, stores the session in `auth` and returns where to go next.
    pub async fn submit(&mut self, auth: &mut AuthContext) -> Option<Route> {
        self.state.start();
        let result = match self.client.login(&self.username, &self.password).await {
            Ok(res) => auth
                .sign_in(Session::from(res))
                .map(|()| Route::Dashboard)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        if result.is_ok() {
            self.password.clear();
        }
        self.state.settle(result);
        self.state.data().copied()
    }
}

/// Read-only table and analytics.
#[derive(Debug, Clone)]
pub struct DashboardView {
    client: ApiClient,
    pub listing: Listing,
}

impl DashboardView {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            listing: Listing::new(DEFAULT_PAGE_SIZE),
        }
    }

    pub async fn refresh(&mut self, auth: &AuthContext) {
        self.listing.refresh(&self.client, auth).await;
    }

    pub fn logout(&mut self, auth: &mut AuthContext) -> Route {
        self.listing = Listing::new(self.listing.limit);
        sign_out(auth)
    }
}

/// Drops the session. The in-memory session is gone even if the store fails.
fn sign_out(auth: &mut AuthContext) -> Route {
    if let Err(e) = auth.sign_out() {
        warn!(error = %e, "failed to clear stored credentials");
    }
    Route::Login
}

/// Text fields of the create/edit form, kept as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub kind: String,
    pub sku: String,
    pub image_url: String,
    pub description: String,
    pub price: String,
    pub quantity: String,
}

impl ProductForm {
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            kind: product.kind.clone(),
            sku: product.sku.clone(),
            image_url: product.image_url.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            quantity: product.quantity.to_string(),
        }
    }

    /// Blank inputs are omitted; numbers go out as strings for the server to coerce.
    pub fn to_payload(&self) -> ProductPayload {
        let text = |v: &str| (!v.trim().is_empty()).then(|| v.to_string());
        ProductPayload {
            name: text(&self.name),
            kind: text(&self.kind),
            sku: text(&self.sku),
            image_url: text(&self.image_url),
            description: text(&self.description),
            quantity: text(&self.quantity).map(Value::String),
            price: text(&self.price).map(Value::String),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update(Uuid),
}

/// Dashboard plus create/edit form, inline quantity editor and delete.
#[derive(Debug, Clone)]
pub struct AdminPortalView {
    client: ApiClient,
    pub listing: Listing,
    pub form: ProductForm,
    editing: Option<Uuid>,
    /// Outcome of the last mutating action; holds the server's message.
    pub action: ViewState<String>,
}

impl AdminPortalView {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            listing: Listing::new(ADMIN_PAGE_SIZE),
            form: ProductForm::default(),
            editing: None,
            action: ViewState::Idle,
        }
    }

    pub fn mode(&self) -> FormMode {
        match self.editing {
            Some(id) => FormMode::Update(id),
            None => FormMode::Create,
        }
    }

    /// Stages `product` for editing and loads it into the form.
    pub fn edit(&mut self, product: &Product) {
        self.form = ProductForm::from_product(product);
        self.editing = Some(product.id);
    }

    pub fn cancel_edit(&mut self) {
        self.form = ProductForm::default();
        self.editing = None;
    }

    pub async fn refresh(&mut self, auth: &AuthContext) {
        self.listing.refresh(&self.client, auth).await;
    }

    pub fn logout(&mut self, auth: &mut AuthContext) -> Route {
        self.cancel_edit();
        self.action.reset();
        self.listing = Listing::new(ADMIN_PAGE_SIZE);
        sign_out(auth)
    }

    /// Creates or updates depending on [`AdminPortalView::mode`].
    pub async fn submit(&mut self, auth: &AuthContext) {
        self.action.start();
        let payload = self.form.to_payload();
        let result = match self.mode() {
            FormMode::Create => self.client.create_product(auth, &payload).await,
            FormMode::Update(id) => self.client.update_product(auth, id, &payload).await,
        };
        self.finish(auth, result.map(|m| m.message), true).await;
    }

    /// Commit-on-blur for the inline quantity editor.
    pub async fn commit_quantity(&mut self, auth: &AuthContext, id: Uuid, raw: &str) {
        self.action.start();
        let result = self.client.update_quantity(auth, id, raw.trim()).await;
        self.finish(auth, result.map(|m| m.message), false).await;
    }

    pub async fn delete(&mut self, auth: &AuthContext, id: Uuid) {
        self.action.start();
        let result = self.client.delete_product(auth, id).await;
        if result.is_ok() && self.editing == Some(id) {
            self.cancel_edit();
        }
        self.finish(auth, result.map(|m| m.message), false).await;
    }

    /// Moves to `page`, kept within the known page range.
    pub async fn set_page(&mut self, auth: &AuthContext, page: u32) {
        let mut page = page.max(1);
        if let Some(pages) = self.listing.known_pages().filter(|p| *p > 0) {
            page = page.min(u32::try_from(pages).unwrap_or(u32::MAX));
        }
        self.listing.page = page;
        self.refresh(auth).await;
    }

    /// A new search starts from the first page.
    pub async fn set_search(&mut self, auth: &AuthContext, search: &str) {
        self.listing.search = search.to_string();
        self.listing.page = 1;
        self.refresh(auth).await;
    }

    async fn finish(
        &mut self,
        auth: &AuthContext,
        result: Result<String, ClientError>,
        reset_form: bool,
    ) {
        let succeeded = result.is_ok();
        self.action.settle(result);
        if succeeded {
            if reset_form {
                self.cancel_edit();
            }
            self.refresh(auth).await;
        }
    }
}
