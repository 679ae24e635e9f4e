//! A mock Detector/Pose Solver websocket endpoint for exercising the core's
//! Supervisor and Transport against a real socket, without a real camera or
//! solver process on the other end.

use std::sync::{Arc, Mutex};

use controller_protocol::{RequestRecord, ResponseRecord};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::protocol::Message;

pub type Handler = dyn Fn(&RequestRecord) -> ResponseRecord + Send + Sync + 'static;

/// A mock peer endpoint for integration testing.
///
/// Binds to a random port and, for every connection, answers each request
/// record through the supplied `handler`. Every request record that
/// crosses the wire is recorded in submission order so tests can assert on
/// exact tag sequences (spec.md §8 scenario 1).
pub struct MockPeerServer {
    port: u16,
    received: Arc<Mutex<Vec<RequestRecord>>>,
    _task: tokio::task::JoinHandle<()>,
}

impl MockPeerServer {
    pub async fn start(handler: impl Fn(&RequestRecord) -> ResponseRecord + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock peer listener");
        let port = listener.local_addr().expect("local_addr").port();
        let handler: Arc<Handler> = Arc::new(handler);
        let received = Arc::new(Mutex::new(Vec::new()));

        let accept_received = received.clone();
        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _peer)) = listener.accept().await else { break };
                let handler = handler.clone();
                let received = accept_received.clone();
                tokio::spawn(async move {
                    let _ = handle_connection(stream, handler, received).await;
                });
            }
        });

        Self { port, received, _task: task }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Every request record received so far, in submission order, across
    /// every series and every connection this server has accepted.
    pub fn received_records(&self) -> Vec<RequestRecord> {
        self.received.lock().expect("received lock").clone()
    }

    /// The wire `parsable_type` tag of each received record, in order —
    /// the shape spec.md §8 scenario 1 asserts against.
    pub fn received_tags(&self) -> Vec<String> {
        self.received_records().iter().map(record_tag).collect()
    }
}

fn record_tag(record: &RequestRecord) -> String {
    serde_json::to_value(record)
        .ok()
        .and_then(|v| v.get("parsable_type").and_then(|t| t.as_str()).map(str::to_owned))
        .unwrap_or_default()
}

async fn handle_connection(
    stream: tokio::net::TcpStream,
    handler: Arc<Handler>,
    received: Arc<Mutex<Vec<RequestRecord>>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut write, mut read) = ws_stream.split();

    while let Some(msg_result) = read.next().await {
        let text = match msg_result? {
            Message::Text(t) => t,
            Message::Close(_) => break,
            Message::Ping(data) => {
                write.send(Message::Pong(data)).await?;
                continue;
            }
            _ => continue,
        };

        let envelope: serde_json::Value = serde_json::from_str(&text)?;
        let raw_series = envelope.get("series").and_then(|s| s.as_array()).cloned().unwrap_or_default();

        let mut response_records = Vec::with_capacity(raw_series.len());
        for raw in &raw_series {
            let record: RequestRecord = serde_json::from_value(raw.clone())?;
            let response = handler(&record);
            received.lock().expect("received lock").push(record);
            response_records.push(response);
        }

        let envelope_out = serde_json::json!({ "series": response_records });
        write.send(Message::Text(envelope_out.to_string().into())).await?;
    }

    Ok(())
}

/// A handler that answers everything with a plain acknowledgement — useful
/// for tests that only care about connection lifecycle, not payloads.
pub fn always_empty(_record: &RequestRecord) -> ResponseRecord {
    ResponseRecord::Empty
}
