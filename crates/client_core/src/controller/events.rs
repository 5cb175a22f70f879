//! Screens, user actions and the notifications the controller raises.

use crate::error::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    Register,
    Catalog,
}

impl Screen {
    pub fn is_authenticated(self) -> bool {
        self == Self::Catalog
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::Catalog => "catalog",
        }
    }
}

/// Actions that issue a backend call and carry a busy flag while in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Login,
    Register,
    LoadItems,
    AddToCart,
    ViewCart,
    Checkout,
    ViewOrders,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::LoadItems => "load_items",
            Self::AddToCart => "add_to_cart",
            Self::ViewCart => "view_cart",
            Self::Checkout => "checkout",
            Self::ViewOrders => "view_orders",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error(ErrorKind),
    /// The action is not available on the current screen; nothing was sent.
    Rejected,
}

/// A short message for the user, one per completed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error(kind),
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Rejected,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self.kind, NotificationKind::Info)
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self.kind {
            NotificationKind::Error(kind) => Some(kind),
            _ => None,
        }
    }
}
