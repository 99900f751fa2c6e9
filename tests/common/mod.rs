use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::json;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Cargo points us at the built binary. DATABASE_URL is stripped so
        // the server runs on the in-memory store and the suite never touches
        // a real database.
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_scribe-api"));
        cmd.env("SCRIBE_API_PORT", port.to_string())
            .env_remove("DATABASE_URL")
            .env_remove("APP_ENV")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Register a user and exchange credentials for a bearer token.
#[allow(dead_code)]
pub async fn register_and_login(
    server: &TestServer,
    client: &reqwest::Client,
    username: &str,
) -> Result<String> {
    let res = client
        .post(format!("{}/register/", server.base_url))
        .json(&json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "test-password",
        }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "registration of {} failed: {}",
        username,
        res.status()
    );

    let res = client
        .post(format!("{}/api/v1/api-token-auth/", server.base_url))
        .json(&json!({ "username": username, "password": "test-password" }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::OK,
        "token exchange for {} failed: {}",
        username,
        res.status()
    );

    let body = res.json::<serde_json::Value>().await?;
    let token = body["token"]
        .as_str()
        .context("token missing from response")?;
    Ok(token.to_string())
}
