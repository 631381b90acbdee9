//! Test helpers for integration tests
//!
//! Provides a gateway spawned on an ephemeral port, a thin WebSocket client speaking the
//! relay protocol, and polling helpers for the diagnostics endpoints.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, Response};
use routelink_common::AppConfig;
use routelink_gateway::{create_app, create_gateway_state, serve};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// How long a test waits for an expected frame
pub const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a test listens to conclude that nothing was delivered
pub const QUIET_PERIOD: Duration = Duration::from_millis(300);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Gateway instance serving on a loopback port for the lifetime of the test
pub struct TestGateway {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestGateway {
    /// Start a gateway with test defaults
    pub async fn start() -> Result<Self> {
        Self::start_with_config(AppConfig::for_tests()).await
    }

    /// Start a gateway with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.gateway.address()).await?;
        let addr = listener.local_addr()?;

        let app = create_app(create_gateway_state(config));

        let handle = tokio::spawn(async move {
            serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the WebSocket endpoint URL
    pub fn socket_url(&self) -> String {
        format!("ws://{}/socket", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Open a relay connection and consume its hello
    pub async fn connect(&self) -> Result<TestClient> {
        TestClient::connect(&self.socket_url()).await
    }

    /// Open a relay connection and join it as `user_id`
    pub async fn connect_as(&self, user_id: &str) -> Result<TestClient> {
        let mut client = self.connect().await?;
        client.join(user_id).await?;
        Ok(client)
    }

    /// Current `(userId, connectionId)` pairs from the diagnostics endpoint
    pub async fn active(&self) -> Result<Vec<(String, String)>> {
        let body: Value = self.get("/api/socket/active").await?.json().await?;
        let active = body["active"]
            .as_array()
            .context("active is not an array")?
            .iter()
            .map(|pair| {
                let user = pair[0].as_str().unwrap_or_default().to_string();
                let conn = pair[1].as_str().unwrap_or_default().to_string();
                (user, conn)
            })
            .collect();
        Ok(active)
    }

    /// Connection id currently registered for `user_id`, if any
    pub async fn lookup(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self
            .active()
            .await?
            .into_iter()
            .find(|(user, _)| user == user_id)
            .map(|(_, conn)| conn))
    }

    /// Live connection count from `/api/health`
    pub async fn connection_count(&self) -> Result<u64> {
        let body: Value = self.get("/api/health").await?.json().await?;
        body["connections"]
            .as_u64()
            .context("connections is not a number")
    }

    /// Wait until the gateway has cleaned up down to `expected` live connections
    pub async fn wait_for_connection_count(&self, expected: u64) -> Result<()> {
        wait_until(|| async { Ok(self.connection_count().await? == expected) })
            .await
            .with_context(|| format!("connection count never reached {expected}"))
    }
}

/// Poll `check` until it returns true or `FRAME_TIMEOUT` elapses
pub async fn wait_until<F, Fut>(mut check: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = tokio::time::Instant::now() + FRAME_TIMEOUT;
    loop {
        if check().await? {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            anyhow::bail!("condition not met within {FRAME_TIMEOUT:?}");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// WebSocket client speaking the relay protocol
pub struct TestClient {
    ws: WsStream,
    /// Connection id announced in `hello`
    pub connection_id: String,
    /// Heartbeat interval announced in `hello`
    pub heartbeat_interval: u64,
}

impl TestClient {
    /// Connect and read the `hello` frame
    pub async fn connect(url: &str) -> Result<Self> {
        let (ws, _) = tokio_tungstenite::connect_async(url).await?;
        let mut client = Self {
            ws,
            connection_id: String::new(),
            heartbeat_interval: 0,
        };

        let hello = client.next_frame().await?;
        anyhow::ensure!(hello["event"] == "hello", "expected hello, got {hello}");
        client.connection_id = hello["data"]["connectionId"]
            .as_str()
            .context("hello without connectionId")?
            .to_string();
        client.heartbeat_interval = hello["data"]["heartbeatInterval"]
            .as_u64()
            .context("hello without heartbeatInterval")?;

        Ok(client)
    }

    /// Send a raw text frame
    pub async fn send_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.ws.send(Message::Text(text.into())).await?;
        Ok(())
    }

    /// Send a relay event
    pub async fn send_event(&mut self, event: &str, data: Value) -> Result<()> {
        self.send_text(json!({"event": event, "data": data}).to_string())
            .await
    }

    /// Send a heartbeat and wait for its ack
    ///
    /// Frames from one connection are handled in order, so once the ack arrives every frame
    /// sent before the heartbeat has been processed.
    pub async fn sync(&mut self) -> Result<()> {
        self.send_text(json!({"event": "heartbeat"}).to_string())
            .await?;
        let frame = self.next_frame().await?;
        anyhow::ensure!(
            frame["event"] == "heartbeatAck",
            "expected heartbeatAck, got {frame}"
        );
        Ok(())
    }

    /// Join as `user_id` and wait until the gateway has registered it
    pub async fn join(&mut self, user_id: &str) -> Result<()> {
        self.send_event("join", json!(user_id)).await?;
        self.sync().await
    }

    /// Send a chat message
    pub async fn send_message(
        &mut self,
        sender_id: &str,
        receiver_id: &str,
        chat_id: &str,
        message: &str,
    ) -> Result<()> {
        self.send_event(
            "sendMessage",
            json!({
                "receiverId": receiver_id,
                "senderId": sender_id,
                "message": message,
                "chatId": chat_id,
            }),
        )
        .await
    }

    /// Send a request status update
    pub async fn request_update(
        &mut self,
        receiver_id: &str,
        request_id: &str,
        status: &str,
    ) -> Result<()> {
        self.send_event(
            "requestUpdate",
            json!({
                "receiverId": receiver_id,
                "requestId": request_id,
                "status": status,
            }),
        )
        .await
    }

    /// Read the next text frame as JSON, skipping control frames
    pub async fn next_frame(&mut self) -> Result<Value> {
        loop {
            let msg = tokio::time::timeout(FRAME_TIMEOUT, self.ws.next())
                .await
                .context("timed out waiting for a frame")?
                .context("connection ended")??;
            match msg {
                Message::Text(text) => return Ok(serde_json::from_str(&text)?),
                Message::Ping(_) | Message::Pong(_) => {}
                other => anyhow::bail!("unexpected message: {other:?}"),
            }
        }
    }

    /// Assert that no text frame arrives within `QUIET_PERIOD`
    pub async fn expect_silence(&mut self) -> Result<()> {
        match tokio::time::timeout(QUIET_PERIOD, self.ws.next()).await {
            Err(_) => Ok(()),
            Ok(Some(Ok(Message::Text(text)))) => anyhow::bail!("unexpected frame: {text}"),
            Ok(other) => anyhow::bail!("unexpected socket activity: {other:?}"),
        }
    }

    /// Wait for the server to close the connection and return its close frame
    pub async fn expect_close(&mut self) -> Result<Option<CloseFrame<'static>>> {
        loop {
            let msg = tokio::time::timeout(FRAME_TIMEOUT, self.ws.next())
                .await
                .context("timed out waiting for close")?;
            match msg {
                Some(Ok(Message::Close(frame))) => return Ok(frame),
                Some(Ok(_)) => {}
                Some(Err(e)) => anyhow::bail!("socket error before close frame: {e}"),
                None => return Ok(None),
            }
        }
    }

    /// Send a binary frame
    pub async fn send_binary(&mut self, bytes: Vec<u8>) -> Result<()> {
        self.ws.send(Message::Binary(bytes)).await?;
        Ok(())
    }

    /// Close the connection from the client side
    pub async fn close(mut self) -> Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}
