use std::{convert::Infallible, path::PathBuf};

use clap::{Parser, Subcommand};
use shared::domain::ItemId;

#[derive(Parser, Debug)]
#[command(name = "shop", about = "Log in, browse the catalog, fill a cart and place orders")]
pub struct Args {
    /// Backend base URL, e.g. http://127.0.0.1:8080
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Where the session token is kept between runs
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log in and remember the session
    Login { username: String, password: String },
    /// Create an account
    Register { username: String, password: String },
    /// List the product catalog
    Items,
    /// Add an item to the cart
    Add {
        #[arg(value_parser = parse_item_id)]
        item_id: ItemId,
    },
    /// Show the current cart
    Cart,
    /// Order everything in the current cart
    Checkout,
    /// List past orders
    Orders,
    Logout,
    /// Show who is logged in
    Status,
}

/// Goes through `FromStr` so decimal ids stay numeric on the wire.
fn parse_item_id(raw: &str) -> Result<ItemId, Infallible> {
    raw.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_item_ids_parse_as_numbers() {
        let args = Args::try_parse_from(["shop", "add", "7"]).expect("numeric id");
        assert_eq!(args.command, Command::Add { item_id: ItemId::from(7) });

        let args = Args::try_parse_from(["shop", "add", "sku-9"]).expect("text id");
        assert_eq!(args.command, Command::Add { item_id: ItemId::from("sku-9") });
    }

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let args = Args::try_parse_from([
            "shop",
            "orders",
            "--api-url",
            "http://shop.test",
            "--session-file",
            "/tmp/s.json",
        ])
        .expect("args");
        assert_eq!(args.command, Command::Orders);
        assert_eq!(args.api_url.as_deref(), Some("http://shop.test"));
        assert_eq!(args.session_file, Some(PathBuf::from("/tmp/s.json")));
    }

    #[test]
    fn login_requires_both_credentials() {
        assert!(Args::try_parse_from(["shop", "login", "alice"]).is_err());
    }
}
