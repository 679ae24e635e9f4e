//! Websocket Transport (C2): open a session to a peer's
//! `ws://host:port/websocket` endpoint, and run one request/response
//! exchange per call (spec.md §4.2).

use controller_protocol::{RequestSeries, ResponseSeries};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::debug;

use crate::error::TransportError;
use crate::peer::PeerAddress;

pub type PeerSocket = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Open a websocket to `address`. tokio-tungstenite issues no automatic
/// pings and applies no read/write deadline of its own, which is what
/// spec.md §4.2 asks for ("ping/open/close timeouts are disabled") — there
/// is no affirmative timeout to disable, only one not to add.
///
/// `max_frame_bytes` bounds both the per-frame and whole-message size so an
/// uncompressed full-resolution capture never trips tungstenite's own
/// (much smaller) default ceiling.
pub async fn connect(address: &PeerAddress, max_frame_bytes: u64) -> Result<PeerSocket, TransportError> {
    let max_frame_bytes = usize::try_from(max_frame_bytes).unwrap_or(usize::MAX);
    let config = tokio_tungstenite::tungstenite::protocol::WebSocketConfig::default()
        .max_message_size(Some(max_frame_bytes))
        .max_frame_size(Some(max_frame_bytes));
    let (socket, _response) = tokio_tungstenite::connect_async_with_config(address.ws_url(), Some(config), false).await?;
    Ok(socket)
}

/// Serialize `request` onto `socket` as a single text frame, then await and
/// decode exactly one reply frame (spec.md §4.2). `responder_label` is
/// stamped onto the decoded [`ResponseSeries`] since the wire envelope
/// itself carries no reliable peer identity.
pub async fn exchange(
    socket: &mut PeerSocket,
    request: &RequestSeries,
    responder_label: &str,
) -> Result<ResponseSeries, TransportError> {
    let text = serde_json::to_string(request)?;
    socket.send(Message::Text(text.into())).await?;

    loop {
        match socket.next().await {
            None => return Err(TransportError::Closed),
            Some(Err(e)) => return Err(TransportError::Ws(e)),
            Some(Ok(Message::Text(text))) => {
                let envelope: serde_json::Value = serde_json::from_str(&text)?;
                let series = controller_protocol::codec::decode_response_series(&envelope, responder_label)?;
                return Ok(series);
            }
            Some(Ok(Message::Close(_))) => return Err(TransportError::Closed),
            Some(Ok(Message::Ping(payload))) => {
                let _ = socket.send(Message::Pong(payload)).await;
                continue;
            }
            Some(Ok(_)) => continue,
        }
    }
}

/// Close `socket` cleanly, logging but not propagating failure — a close
/// that races the peer's own teardown is not a supervisor-visible error.
pub async fn close(socket: &mut PeerSocket) {
    if let Err(e) = socket.close(None).await {
        debug!(error = %e, "error closing peer socket");
    }
}
