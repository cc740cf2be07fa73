use anyhow::{anyhow, Result};
use serde_json::Value;
use std::thread::{self, JoinHandle};
use textsim_core::{Dispatcher, EngineConfig, Response};
use tokio::sync::{mpsc, oneshot};

type Job = (Value, oneshot::Sender<Response>);

/// Cloneable handle to the engine thread. Requests are served one at a time in
/// arrival order; the thread exits once every handle has been dropped.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<Job>,
}

impl EngineHandle {
    pub fn spawn(config: EngineConfig) -> Result<(Self, JoinHandle<()>)> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let worker = thread::Builder::new().name("textsim-engine".into()).spawn(move || {
            let mut dispatcher = Dispatcher::new(config);
            tracing::info!(config = ?dispatcher.config(), "engine worker started");
            while let Some((request, reply)) = rx.blocking_recv() {
                let response = dispatcher.dispatch(request);
                // Receiver gone means the caller stopped waiting.
                let _ = reply.send(response);
            }
            tracing::info!("engine worker stopped");
        })?;
        Ok((Self { tx }, worker))
    }

    /// Send one request envelope and wait for its response.
    pub async fn call(&self, request: Value) -> Result<Response> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send((request, reply_tx)).map_err(|_| anyhow!("engine worker stopped"))?;
        reply_rx.await.map_err(|_| anyhow!("engine worker stopped"))
    }
}
