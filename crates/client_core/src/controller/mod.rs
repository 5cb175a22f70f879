//! Session controller: the Login / Register / Catalog state machine.
//!
//! The controller owns the [`Session`] and mirrors every change into its
//! [`SessionStore`]. Each user action issues at most the backend calls it
//! needs, and every outcome is reported as exactly one [`Notification`].
//! Failures never escape an action; the screen and last-known data are left
//! as they were.

use std::{future::Future, sync::Arc};

use shared::{
    domain::ItemId,
    protocol::{Credentials, Item},
};
use tracing::{debug, info, warn};

use crate::{
    auth::AuthApi,
    cart::{describe_cart, CartApi},
    catalog::{CatalogApi, CatalogEntry},
    error::{require, ClientError},
    orders::{describe_orders, OrderApi},
    session::{AuthToken, Session, SessionStore},
    StorefrontApi,
};

mod busy;
pub mod events;

pub use busy::BusyActions;
pub use events::{Action, Notification, NotificationKind, Screen};

pub const REGISTERED: &str = "Registration successful! You can now log in.";
pub const ITEM_ADDED: &str = "Item added to cart";
pub const CART_EMPTY: &str = "Cart is empty";
pub const ORDER_PLACED: &str = "Order successful";
pub const NO_ORDERS: &str = "No orders found";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerOptions {
    /// End the session when an authenticated call is rejected with 401/403.
    /// Off by default: the rejection is only reported.
    pub auto_logout_on_auth_error: bool,
}

pub struct SessionController {
    api: Arc<dyn StorefrontApi>,
    store: Box<dyn SessionStore>,
    options: ControllerOptions,
    session: Session,
    screen: Screen,
    items: Vec<Item>,
    busy: BusyActions,
    notifications: Vec<Notification>,
}

impl SessionController {
    /// Loads the persisted session. A stored session goes straight to the
    /// catalog; its token is not re-validated until the next authenticated call.
    pub fn start(
        api: Arc<dyn StorefrontApi>,
        store: Box<dyn SessionStore>,
        options: ControllerOptions,
    ) -> Self {
        let session = store.load().unwrap_or_else(|err| {
            warn!(error = %err, "failed to load persisted session; starting logged out");
            Session::default()
        });
        let screen = if session.is_authenticated() {
            Screen::Catalog
        } else {
            Screen::Login
        };
        info!(screen = screen.label(), "session controller started");

        Self {
            api,
            store,
            options,
            session,
            screen,
            items: Vec::new(),
            busy: BusyActions::default(),
            notifications: Vec::new(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn display_name(&self) -> Option<&str> {
        self.session.display_name()
    }

    /// Last successfully fetched product list.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.items.iter().map(CatalogEntry::from).collect()
    }

    pub fn is_busy(&self, action: Action) -> bool {
        self.busy.contains(action)
    }

    /// Shared view of the busy flags, readable while an action is running.
    pub fn busy_actions(&self) -> BusyActions {
        self.busy.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.is_busy(Action::LoadItems)
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn show_register(&mut self) {
        if self.require_screen(Screen::Login, "register") {
            self.screen = Screen::Register;
        }
    }

    pub fn show_login(&mut self) {
        if self.require_screen(Screen::Register, "return to login") {
            self.screen = Screen::Login;
        }
    }

    pub async fn login(&mut self, username: &str, password: &str) {
        if !self.require_screen(Screen::Login, "log in") {
            return;
        }
        let credentials = match check_credentials(username, password) {
            Ok(credentials) => credentials,
            Err(err) => return self.report(&err, "Login failed"),
        };

        let api = Arc::clone(&self.api);
        let result = self.run(Action::Login, api.login(&credentials)).await;
        match result {
            Ok(token) => {
                self.session = Session::authenticated(token, username);
                if let Err(err) = self.store.save(&self.session) {
                    warn!(error = %err, "failed to persist session; it will not survive a restart");
                }
                self.screen = Screen::Catalog;
                info!(username, "logged in");
                self.refresh_items().await;
            }
            Err(err) => self.report(&err, "Invalid username/password"),
        }
    }

    pub async fn register(&mut self, username: &str, password: &str) {
        if !self.require_screen(Screen::Register, "register") {
            return;
        }
        let credentials = match check_credentials(username, password) {
            Ok(credentials) => credentials,
            Err(err) => return self.report(&err, "Registration failed"),
        };

        let api = Arc::clone(&self.api);
        let result = self.run(Action::Register, api.register(&credentials)).await;
        match result {
            Ok(()) => {
                self.screen = Screen::Login;
                self.notifications.push(Notification::info(REGISTERED));
            }
            Err(err) => self.report(&err, "Registration failed"),
        }
    }

    pub async fn refresh_items(&mut self) {
        if !self.require_screen(Screen::Catalog, "load products") {
            return;
        }
        let api = Arc::clone(&self.api);
        let result = self.run(Action::LoadItems, api.list_items()).await;
        match result {
            Ok(items) => {
                debug!(count = items.len(), "catalog loaded");
                self.items = items;
            }
            Err(err) => self.report(&err, "Failed to fetch items"),
        }
    }

    pub async fn add_to_cart(&mut self, item_id: ItemId) {
        let Some(token) = self.catalog_token("add items to the cart") else {
            return;
        };
        let api = Arc::clone(&self.api);
        let result = self.run(Action::AddToCart, api.add_to_cart(&item_id, &token)).await;
        match result {
            Ok(()) => self.notifications.push(Notification::info(ITEM_ADDED)),
            Err(err) => self.report(&err, "Failed to add item to cart"),
        }
    }

    pub async fn view_cart(&mut self) {
        let Some(token) = self.catalog_token("view the cart") else {
            return;
        };
        let api = Arc::clone(&self.api);
        let result = self.run(Action::ViewCart, api.get_cart(&token)).await;
        match result {
            Ok(cart) if cart.is_empty() => self.notifications.push(Notification::info(CART_EMPTY)),
            Ok(cart) => self
                .notifications
                .push(Notification::info(describe_cart(&cart).join("\n"))),
            Err(err) => self.report(&err, "Failed to fetch cart items"),
        }
    }

    /// Orders the current cart, then reloads the catalog.
    pub async fn checkout(&mut self) {
        let Some(token) = self.catalog_token("check out") else {
            return;
        };
        let api = Arc::clone(&self.api);
        let result = self.run(Action::Checkout, api.checkout(&token)).await;
        match result {
            Ok(_) => {
                self.notifications.push(Notification::info(ORDER_PLACED));
                self.refresh_items().await;
            }
            Err(err) => self.report(&err, "Failed to checkout"),
        }
    }

    pub async fn view_orders(&mut self) {
        let Some(token) = self.catalog_token("view orders") else {
            return;
        };
        let api = Arc::clone(&self.api);
        let result = self.run(Action::ViewOrders, api.list_orders(&token)).await;
        match result {
            Ok(orders) if orders.is_empty() => {
                self.notifications.push(Notification::info(NO_ORDERS))
            }
            Ok(orders) => self
                .notifications
                .push(Notification::info(describe_orders(&orders).join("\n"))),
            Err(err) => self.report(&err, "Failed to fetch orders"),
        }
    }

    /// Clears the session locally; no backend call. Safe to repeat.
    pub fn logout(&mut self) {
        if !self.screen.is_authenticated() {
            // Already logged out: stay on Login/Register, drop any stray entries.
            if let Err(err) = self.store.clear() {
                warn!(error = %err, "failed to clear persisted session");
            }
            return;
        }
        info!(username = ?self.session.display_name(), "logged out");
        self.end_session();
    }

    fn end_session(&mut self) {
        self.session = Session::default();
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear persisted session");
        }
        self.items.clear();
        self.screen = Screen::Login;
    }

    /// Marks `action` busy while `call` runs. Actions take `&mut self`, so the
    /// same controller never has two calls in flight.
    async fn run<T, F>(&self, action: Action, call: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        let _guard = self.busy.begin(action);
        debug!(action = action.label(), "action started");
        call.await
    }

    fn require_screen(&mut self, expected: Screen, what: &str) -> bool {
        if self.screen == expected {
            return true;
        }
        let message = match (expected, self.screen) {
            (Screen::Catalog, _) => format!("Log in to {what}"),
            (_, Screen::Catalog) => format!("Log out to {what}"),
            (Screen::Register, _) => format!("Open the registration screen to {what}"),
            (Screen::Login, _) => format!("Return to the login screen to {what}"),
        };
        debug!(
            expected = expected.label(),
            current = self.screen.label(),
            "action rejected on current screen"
        );
        self.notifications.push(Notification::rejected(message));
        false
    }

    fn catalog_token(&mut self, what: &str) -> Option<AuthToken> {
        if !self.require_screen(Screen::Catalog, what) {
            return None;
        }
        // Catalog is only ever entered with an authenticated session.
        self.session.token().cloned()
    }

    fn report(&mut self, err: &ClientError, failure: &str) {
        warn!(error = %err, kind = ?err.kind(), screen = self.screen.label(), "{failure}");
        let message = match err {
            ClientError::Validation(message) => message.clone(),
            ClientError::Registration | ClientError::NoCart | ClientError::MissingField { .. } => {
                err.to_string()
            }
            ClientError::Auth(_) if self.screen.is_authenticated() => {
                format!("{failure}: session rejected, please log in again")
            }
            _ => failure.to_string(),
        };
        self.notifications
            .push(Notification::error(err.kind(), message));

        if err.is_auth() && self.screen.is_authenticated() && self.options.auto_logout_on_auth_error
        {
            info!("ending session after rejected token");
            self.end_session();
        }
    }
}

fn check_credentials(username: &str, password: &str) -> Result<Credentials, ClientError> {
    require(username, "username")?;
    require(password, "password")?;
    Ok(Credentials::new(username, password))
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
