//! Integration tests for Friends Store.
//!
//! Everything runs in process over loopback HTTP: the mailer router is
//! served on an ephemeral port with a recording transport, and the admin
//! side talks to it through the real notifier. No database or SMTP server
//! is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p friends-store-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use secrecy::SecretString;
use url::Url;

use friends_store_admin::db::{MemoryOrderStore, MemoryProductStore};
use friends_store_admin::middleware::create_session_layer;
use friends_store_admin::services::{OrderNotifier, OrderWorkflow};
use friends_store_admin::state::AppState;
use friends_store_mailer::{EmailSender, OutboxTransport, OutgoingEmail};

/// Admin access token used by [`TestContext::admin_router`].
pub const ADMIN_TOKEN: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6";

/// SMTP settings the mailer reads on each request.
#[must_use]
pub fn smtp_env() -> HashMap<String, String> {
    [
        ("SMTP_HOST", "smtp.friendsstore.test"),
        ("SMTP_PORT", "587"),
        ("SMTP_USER", "orders@friendsstore.in"),
        ("SMTP_PASS", "kQ9#vL2$wX7!pR4"),
        ("SMTP_FROM_EMAIL", "orders@friendsstore.in"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Serve `router` on an ephemeral loopback port.
///
/// # Panics
///
/// Panics if the listener cannot be bound.
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    addr
}

/// A running mailer, an in-memory order store and a workflow wired to both.
pub struct TestContext {
    pub store: Arc<MemoryOrderStore>,
    pub notifier: OrderNotifier,
    pub workflow: OrderWorkflow,
    pub outbox: OutboxTransport,
    pub mailer_url: Url,
}

impl TestContext {
    /// Start a mailer with a complete SMTP configuration.
    pub async fn new() -> Self {
        Self::with_smtp_env(smtp_env()).await
    }

    /// Start a mailer that sees `env` as its environment.
    ///
    /// # Panics
    ///
    /// Panics if the mailer cannot be started.
    pub async fn with_smtp_env(env: HashMap<String, String>) -> Self {
        let outbox = OutboxTransport::new();
        let sender = EmailSender::new(Arc::new(env), Arc::new(outbox.clone()));
        let addr = spawn(friends_store_mailer::router(sender)).await;
        let mailer_url = Url::parse(&format!("http://{addr}")).expect("Invalid mailer URL");

        let endpoint = mailer_url
            .join("/send-order-email")
            .expect("Invalid endpoint URL");
        let store = Arc::new(MemoryOrderStore::new());
        let notifier = OrderNotifier::new(store.clone(), reqwest::Client::new(), Some(endpoint));
        let workflow = OrderWorkflow::new(store.clone(), notifier.clone());

        Self {
            store,
            notifier,
            workflow,
            outbox,
            mailer_url,
        }
    }

    /// Emails the mailer has accepted so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.outbox.sent()
    }

    /// The admin panel over this context's workflow, with in-memory sessions.
    #[must_use]
    pub fn admin_router(&self) -> Router {
        let state = AppState::new(
            SecretString::from(ADMIN_TOKEN),
            self.workflow.clone(),
            Arc::new(MemoryProductStore::new()),
        );
        friends_store_admin::routes::routes()
            .layer(create_session_layer(
                tower_sessions::MemoryStore::default(),
                "http://127.0.0.1",
            ))
            .with_state(state)
    }
}
