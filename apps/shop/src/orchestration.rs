//! Maps a parsed command onto controller actions and collects what to print.

use client_core::{Notification, Screen, SessionController};

use crate::{cli::Command, render};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub lines: Vec<String>,
    pub failed: bool,
}

pub async fn dispatch(controller: &mut SessionController, command: &Command) -> Report {
    let was_logged_in = controller.screen().is_authenticated();
    let command_name = match command {
        Command::Login { username, password } => {
            controller.login(username, password).await;
            "login"
        }
        Command::Register { username, password } => {
            controller.show_register();
            if controller.screen() == Screen::Register {
                controller.register(username, password).await;
            }
            "register"
        }
        Command::Items => {
            controller.refresh_items().await;
            "items"
        }
        Command::Add { item_id } => {
            controller.add_to_cart(item_id.clone()).await;
            "add"
        }
        Command::Cart => {
            controller.view_cart().await;
            "cart"
        }
        Command::Checkout => {
            controller.checkout().await;
            "checkout"
        }
        Command::Orders => {
            controller.view_orders().await;
            "orders"
        }
        Command::Logout => {
            controller.logout();
            "logout"
        }
        Command::Status => "status",
    };
    tracing::debug!(command = command_name, screen = controller.screen().label(), "command finished");

    // A login that reached the catalog succeeded even if the follow-up
    // catalog fetch failed; the session is saved either way.
    let logged_in = matches!(command, Command::Login { .. })
        && !was_logged_in
        && controller.screen().is_authenticated();

    let notifications = controller.take_notifications();
    let failed = !logged_in && notifications.iter().any(Notification::is_error);
    let mut lines: Vec<String> = notifications.iter().map(render::notification).collect();

    match command {
        Command::Login { .. } if logged_in => {
            if let Some(name) = controller.display_name() {
                lines.push(render::welcome(name));
            }
        }
        Command::Items if !failed => lines.extend(render::catalog(&controller.catalog())),
        Command::Logout => lines.push("Logged out".to_string()),
        Command::Status => lines.push(render::status(controller)),
        _ => {}
    }

    Report { lines, failed }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        extract::State,
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use clap::Parser;
    use client_core::{
        ControllerOptions, HttpStorefront, MemorySessionStore, PersistedSession,
    };
    use serde_json::{json, Value};
    use shared::domain::ItemId;
    use tokio::{net::TcpListener, sync::Mutex};
    use url::Url;

    use super::*;
    use crate::cli::Args;

    type CartBodies = Arc<Mutex<Vec<Value>>>;

    fn controller_at(base: Url, entries: PersistedSession) -> SessionController {
        SessionController::start(
            Arc::new(HttpStorefront::new(base)),
            Box::new(MemorySessionStore::with_entries(entries)),
            ControllerOptions::default(),
        )
    }

    // Nothing listens here; tests that reach the network expect a refused connection.
    fn controller(entries: PersistedSession) -> SessionController {
        controller_at(Url::parse("http://127.0.0.1:9").expect("url"), entries)
    }

    async fn record_cart_body(
        State(bodies): State<CartBodies>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let numeric = body.get("itemId").is_some_and(Value::is_u64);
        bodies.lock().await.push(body);
        if numeric {
            (StatusCode::OK, Json(json!({ "cartId": 1 })))
        } else {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid request" })))
        }
    }

    /// Accepts any login, fails the catalog, and binds `itemId` as an unsigned
    /// number the way the storefront backend does.
    async fn spawn_backend(bodies: CartBodies) -> Url {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let app = Router::new()
            .route(
                "/api/users/login",
                post(|| async { Json(json!({ "token": "tok-1" })) }),
            )
            .route(
                "/api/items",
                get(|| async {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "database unavailable" })),
                    )
                }),
            )
            .route("/api/carts", post(record_cart_body))
            .with_state(bodies);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Url::parse(&format!("http://{addr}")).expect("url")
    }

    #[tokio::test]
    async fn add_command_posts_numeric_item_id() {
        let bodies = CartBodies::default();
        let base = spawn_backend(Arc::clone(&bodies)).await;
        let mut resumed = controller_at(base, logged_in());

        let args = Args::try_parse_from(["shop", "add", "7"]).expect("args");
        let report = dispatch(&mut resumed, &args.command).await;

        assert_eq!(
            report,
            Report {
                lines: vec!["Item added to cart".into()],
                failed: false
            }
        );
        assert_eq!(*bodies.lock().await, vec![json!({ "itemId": 7 })]);
    }

    #[tokio::test]
    async fn login_succeeds_even_when_the_catalog_fetch_fails() {
        let base = spawn_backend(CartBodies::default()).await;
        let mut fresh = controller_at(base, PersistedSession::default());

        let report = dispatch(
            &mut fresh,
            &Command::Login {
                username: "alice".into(),
                password: "pw123".into(),
            },
        )
        .await;

        assert!(!report.failed);
        assert_eq!(
            report.lines,
            vec![
                "error: Failed to fetch items".to_string(),
                "Welcome back, alice!".to_string(),
            ]
        );
        assert_eq!(fresh.screen(), Screen::Catalog);
    }

    fn logged_in() -> PersistedSession {
        PersistedSession {
            user_token: Some("tok-1".into()),
            username: Some("alice".into()),
        }
    }

    #[tokio::test]
    async fn status_reports_the_resumed_session() {
        let mut resumed = controller(logged_in());
        let report = dispatch(&mut resumed, &Command::Status).await;
        assert_eq!(
            report,
            Report {
                lines: vec!["Logged in as alice".into()],
                failed: false
            }
        );

        let mut fresh = controller(PersistedSession::default());
        let report = dispatch(&mut fresh, &Command::Status).await;
        assert_eq!(report.lines, vec!["Not logged in".to_string()]);
    }

    #[tokio::test]
    async fn cart_commands_need_a_session() {
        let mut fresh = controller(PersistedSession::default());
        let report = dispatch(
            &mut fresh,
            &Command::Add {
                item_id: ItemId::from(1),
            },
        )
        .await;
        assert!(report.failed);
        assert_eq!(report.lines, vec!["error: Log in to add items to the cart".to_string()]);
    }

    #[tokio::test]
    async fn register_is_rejected_while_logged_in() {
        let mut resumed = controller(logged_in());
        let report = dispatch(
            &mut resumed,
            &Command::Register {
                username: "bob".into(),
                password: "pw".into(),
            },
        )
        .await;
        assert!(report.failed);
        assert_eq!(report.lines.len(), 1);
        assert_eq!(resumed.screen(), Screen::Catalog);
    }

    #[tokio::test]
    async fn unreachable_backend_reads_as_bad_credentials() {
        let mut fresh = controller(PersistedSession::default());
        let report = dispatch(
            &mut fresh,
            &Command::Login {
                username: "alice".into(),
                password: "pw123".into(),
            },
        )
        .await;
        assert!(report.failed);
        assert_eq!(report.lines, vec!["error: Invalid username/password".to_string()]);
    }

    #[tokio::test]
    async fn logout_is_reported_even_when_already_logged_out() {
        let mut resumed = controller(logged_in());
        assert_eq!(
            dispatch(&mut resumed, &Command::Logout).await.lines,
            vec!["Logged out".to_string()]
        );
        let report = dispatch(&mut resumed, &Command::Logout).await;
        assert!(!report.failed);
        assert_eq!(resumed.screen(), Screen::Login);
    }
}
