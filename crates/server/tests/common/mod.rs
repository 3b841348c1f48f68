//! # Common Test Utilities
//!
//! `TestApp` spawns a real server on a random port, configured with a temporary
//! knowledge base and, optionally, a mock language model served by an
//! `httpmock::MockServer`.

// Not every test file uses every helper.
#![allow(unused)]

use agrobot_server::{
    config::{self, AppConfig},
    router,
    state::{build_app_state, AppState},
};
use agrobot_test_utils::setup_tracing;
use anyhow::Result;
use axum::serve;
use httpmock::MockServer;
use reqwest::Client;
use serde_json::Value;
use std::{fs, net::SocketAddr, path::PathBuf};
use tempfile::TempDir;
use tokio::{net::TcpListener, task::JoinHandle};

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub kb_path: PathBuf,
    pub app_state: AppState,
    _config_dir: TempDir,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    /// Spawns a server answering from `kb` with no language model configured.
    pub async fn spawn(kb: &Value) -> Result<Self> {
        Self::spawn_with(kb, false).await
    }

    /// Spawns a server answering from `kb` whose model points at the mock server.
    pub async fn spawn_with_model(kb: &Value) -> Result<Self> {
        Self::spawn_with(kb, true).await
    }

    async fn spawn_with(kb: &Value, with_model: bool) -> Result<Self> {
        setup_tracing();
        let mock_server = MockServer::start_async().await;

        let config_dir = TempDir::new()?;
        let kb_path = config_dir.path().join("kb.json");
        fs::write(&kb_path, kb.to_string())?;

        let model_section = if with_model {
            format!(
                "model:\n  api_url: \"{}\"\n  api_key: \"test-key\"\n  model_name: \"mock-chat-model\"\n",
                mock_server.url("/v1/chat/completions")
            )
        } else {
            String::new()
        };
        let config_path = config_dir.path().join("config.yml");
        fs::write(
            &config_path,
            format!(
                "port: 0\nkb_path: \"{}\"\ndetector: \"script\"\ncapability_timeout_secs: 5\n{model_section}",
                kb_path.display()
            ),
        )?;

        let mut config: AppConfig = config::get_config(config_path.to_str())?;
        if !with_model {
            // An OPENAI_API_KEY in the developer's environment must not leak in.
            config.model.api_key = None;
        }
        let app_state = build_app_state(config).await?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let app = router::create_router(app_state.clone());
        let server_handle = tokio::spawn(async move {
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            kb_path,
            app_state,
            _config_dir: config_dir,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Posts `body` as JSON to `route` and returns the response.
    pub async fn post_json(&self, route: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{route}", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
