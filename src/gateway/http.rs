//! Janus REST transport: requests are plain POSTs, events come back through
//! a long poll on the session endpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use tokio::task::AbortHandle;

use super::protocol::{parse_poll_body, JanusMessage, JanusRequest};
use super::{Gateway, GatewayError, GatewayEvent, GatewaySession, PluginHandle};
use crate::config::PhoneConfig;
use crate::event_handler::EventForwarder;
use crate::media::Jsep;

/// Consecutive long-poll failures tolerated before the session is declared lost.
const MAX_POLL_FAILURES: u32 = 3;
const POLL_RETRY_DELAY: Duration = Duration::from_millis(200);

async fn post(client: &reqwest::Client, url: &str, request: &JanusRequest) -> Result<JanusMessage, GatewayError> {
    debug!("POST {} ({})", url, request.janus);
    let response = client.post(url).json(request).send().await?.error_for_status()?;
    let message: JanusMessage = response.json().await?;
    message.into_result()
}

pub struct HttpGateway {
    client: reqwest::Client,
    servers: Vec<String>,
    keepalive_interval: Duration,
    max_events: u32,
}

impl HttpGateway {
    pub fn new(config: &PhoneConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            servers: config.servers.clone(),
            keepalive_interval: config.keepalive_interval,
            max_events: config.long_poll_max_events,
        })
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn create_session(&self, events: EventForwarder) -> Result<Arc<dyn GatewaySession>, GatewayError> {
        if self.servers.is_empty() {
            return Err(GatewayError::NoServers);
        }

        // First server that hands out a session wins
        let mut failures = Vec::new();
        for server in &self.servers {
            info!("Creating session on {}", server);

            let created = post(&self.client, server, &JanusRequest::new("create"))
                .await
                .and_then(|message| message.created_id());

            match created {
                Ok(session_id) => {
                    info!("Created session {} on {}", session_id, server);
                    let session = HttpSession::open(
                        self.client.clone(),
                        format!("{}/{}", server.trim_end_matches('/'), session_id),
                        session_id,
                        events,
                        self.keepalive_interval,
                        self.max_events,
                    );
                    return Ok(Arc::new(session));
                }
                Err(e) => {
                    warn!("Server {} failed: {}", server, e);
                    failures.push(format!("{}: {}", server, e));
                }
            }
        }

        Err(GatewayError::Unreachable(failures.join("; ")))
    }
}

pub struct HttpSession {
    client: reqwest::Client,
    url: String,
    id: u64,
    closed: Arc<AtomicBool>,
    tasks: Vec<AbortHandle>,
}

impl HttpSession {
    fn open(
        client: reqwest::Client,
        url: String,
        id: u64,
        events: EventForwarder,
        keepalive_interval: Duration,
        max_events: u32,
    ) -> Self {
        let closed = Arc::new(AtomicBool::new(false));

        let poll = tokio::spawn(long_poll(client.clone(), url.clone(), max_events, events, closed.clone()));
        let keepalive = tokio::spawn(keepalive(client.clone(), url.clone(), keepalive_interval, closed.clone()));

        Self {
            client,
            url,
            id,
            closed,
            tasks: vec![poll.abort_handle(), keepalive.abort_handle()],
        }
    }

    fn ensure_open(&self) -> Result<(), GatewayError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(GatewayError::SessionClosed(self.id));
        }
        Ok(())
    }
}

#[async_trait]
impl GatewaySession for HttpSession {
    fn id(&self) -> u64 {
        self.id
    }

    async fn attach(&self, plugin: &str, opaque_id: &str) -> Result<Arc<dyn PluginHandle>, GatewayError> {
        self.ensure_open()?;

        let handle_id = post(&self.client, &self.url, &JanusRequest::attach(plugin, opaque_id))
            .await?
            .created_id()?;

        Ok(Arc::new(HttpPluginHandle {
            client: self.client.clone(),
            url: format!("{}/{}", self.url, handle_id),
            id: handle_id,
            plugin: plugin.to_string(),
        }))
    }

    async fn destroy(&self) -> Result<(), GatewayError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        info!("Destroying session {}", self.id);
        let result = post(&self.client, &self.url, &JanusRequest::new("destroy")).await.map(|_| ());
        for task in &self.tasks {
            task.abort();
        }
        result
    }
}

impl Drop for HttpSession {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

pub struct HttpPluginHandle {
    client: reqwest::Client,
    url: String,
    id: u64,
    plugin: String,
}

#[async_trait]
impl PluginHandle for HttpPluginHandle {
    fn id(&self) -> u64 {
        self.id
    }

    fn plugin(&self) -> &str {
        &self.plugin
    }

    async fn send_message(&self, body: serde_json::Value, jsep: Option<Jsep>) -> Result<(), GatewayError> {
        post(&self.client, &self.url, &JanusRequest::message(body, jsep)).await.map(|_| ())
    }

    async fn hangup(&self) -> Result<(), GatewayError> {
        post(&self.client, &self.url, &JanusRequest::new("hangup")).await.map(|_| ())
    }

    async fn detach(&self) -> Result<(), GatewayError> {
        post(&self.client, &self.url, &JanusRequest::new("detach")).await.map(|_| ())
    }
}

async fn poll_once(client: &reqwest::Client, url: &str) -> Result<Vec<JanusMessage>, GatewayError> {
    let body = client.get(url).send().await?.error_for_status()?.text().await?;
    parse_poll_body(&body).map_err(|e| GatewayError::UnexpectedResponse(e.to_string()))
}

async fn long_poll(client: reqwest::Client, url: String, max_events: u32, events: EventForwarder, closed: Arc<AtomicBool>) {
    let mut failures = 0;

    while !closed.load(Ordering::SeqCst) && !events.is_closed() {
        let poll_url = format!("{}?rid={}&maxev={}", url, chrono::Utc::now().timestamp_millis(), max_events);

        match poll_once(&client, &poll_url).await {
            Ok(messages) => {
                failures = 0;
                for message in messages {
                    let Some(event) = message.into_event() else {
                        continue;
                    };
                    let terminal = matches!(event, GatewayEvent::SessionDestroyed | GatewayEvent::SessionError(_));
                    if closed.load(Ordering::SeqCst) {
                        return;
                    }
                    events.gateway(event);
                    if terminal {
                        closed.store(true, Ordering::SeqCst);
                        return;
                    }
                }
            }
            Err(e) => {
                if closed.load(Ordering::SeqCst) {
                    return;
                }
                failures += 1;
                warn!("Long poll failed ({}/{}): {}", failures, MAX_POLL_FAILURES, e);
                if failures >= MAX_POLL_FAILURES {
                    error!("Lost connection to {}", url);
                    closed.store(true, Ordering::SeqCst);
                    events.gateway(GatewayEvent::SessionError("Lost connection to the server (is it down?)".to_string()));
                    return;
                }
                tokio::time::sleep(POLL_RETRY_DELAY).await;
            }
        }
    }
}

async fn keepalive(client: reqwest::Client, url: String, interval: Duration, closed: Arc<AtomicBool>) {
    let mut ticker = tokio::time::interval(interval);
    // First tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if closed.load(Ordering::SeqCst) {
            return;
        }
        if let Err(e) = post(&client, &url, &JanusRequest::new("keepalive")).await {
            warn!("Keepalive for {} failed: {}", url, e);
        }
    }
}
