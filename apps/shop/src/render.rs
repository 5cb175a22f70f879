use client_core::{CatalogEntry, Notification, Screen, SessionController};

pub fn notification(notification: &Notification) -> String {
    if notification.is_error() {
        format!("error: {}", notification.message)
    } else {
        notification.message.clone()
    }
}

pub fn catalog(entries: &[CatalogEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["No items available".to_string()];
    }
    entries
        .iter()
        .map(|entry| {
            format!(
                "[{}] {}  {}\n    {}",
                entry.id, entry.name, entry.price_label, entry.description
            )
        })
        .collect()
}

pub fn status(controller: &SessionController) -> String {
    match (controller.screen(), controller.display_name()) {
        (Screen::Catalog, Some(name)) => format!("Logged in as {name}"),
        _ => "Not logged in".to_string(),
    }
}

pub fn welcome(name: &str) -> String {
    format!("Welcome back, {name}!")
}

#[cfg(test)]
mod tests {
    use client_core::ErrorKind;
    use shared::domain::ItemId;

    use super::*;

    #[test]
    fn errors_are_prefixed() {
        assert_eq!(
            notification(&Notification::error(
                ErrorKind::Auth,
                "Invalid username/password"
            )),
            "error: Invalid username/password"
        );
        assert_eq!(
            notification(&Notification::rejected("Log in to view the cart")),
            "error: Log in to view the cart"
        );
        assert_eq!(notification(&Notification::info("Order successful")), "Order successful");
    }

    #[test]
    fn catalog_lines_show_price_and_description() {
        let entries = vec![CatalogEntry {
            id: ItemId::from(1),
            name: "Widget".into(),
            description: "No description available".into(),
            price_label: "₹10".into(),
        }];
        assert_eq!(
            catalog(&entries),
            vec!["[1] Widget  ₹10\n    No description available".to_string()]
        );
        assert_eq!(catalog(&[]), vec!["No items available".to_string()]);
    }
}
