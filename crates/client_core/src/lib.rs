//! Client side of the storefront: typed REST clients, the persisted session
//! and the controller that drives the login → catalog → cart → order workflow.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod controller;
pub mod error;
pub mod http;
pub mod orders;
pub mod session;

pub use auth::AuthApi;
pub use cart::CartApi;
pub use catalog::{CatalogApi, CatalogEntry};
pub use controller::{
    Action, BusyActions, ControllerOptions, Notification, NotificationKind, Screen,
    SessionController,
};
pub use error::{ClientError, ErrorKind};
pub use http::HttpStorefront;
pub use orders::OrderApi;
pub use session::{
    AuthToken, FileSessionStore, MemorySessionStore, PersistedSession, Session, SessionStore,
    SessionStoreError,
};

/// Everything the controller needs from the backend.
pub trait StorefrontApi: AuthApi + CatalogApi + OrderApi {}

impl<T> StorefrontApi for T where T: AuthApi + CatalogApi + OrderApi {}
