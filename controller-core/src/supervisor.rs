//! Connection Supervisor (C4): drives one peer's session state machine each
//! tick, and performs the per-tick I/O work while `Connected` (spec.md §4.4).

use std::time::Instant;

use controller_protocol::{RequestRecord, RequestSeries, Severity, StatusMessage};
use tracing::{info, warn};

use crate::config::CoreConfig;
use crate::correlator::Correlator;
use crate::peer::{PeerRecord, SessionStatus};
use crate::status_sink::StatusSink;
use crate::transport;

/// Arm a peer for connection: reset the attempt counter and request
/// `Connecting` (spec.md §4.8 `ConnectPeer`). A peer already `Connected` or
/// `Connecting` is left alone — re-arming it here would open a second
/// socket on top of the live one and silently drop it along with anything
/// still in its outbound queue, never closing it cleanly. `Aborted` is the
/// only status this can re-arm from besides `Disconnected`.
pub fn connect_peer(peer: &mut PeerRecord, status: &mut StatusSink) {
    if matches!(peer.live.status, SessionStatus::Connected | SessionStatus::Connecting) {
        status.push(StatusMessage::new(
            Severity::Warning,
            peer.address.label.clone(),
            "ConnectPeer ignored: already connected or connecting".to_owned(),
        ));
        return;
    }
    peer.live.attempt_count = 0;
    peer.live.next_attempt_at = None;
    peer.live.status = SessionStatus::Connecting;
}

/// Request `Disconnecting` (spec.md §4.8 `DisconnectPeer`).
pub fn disconnect_peer(peer: &mut PeerRecord) {
    peer.live.status = SessionStatus::Disconnecting;
}

/// Advance one peer by one tick: the Connecting/Disconnecting transitions,
/// and, while Connected, the outbound-drain plus status-drain I/O
/// described in spec.md §4.4.
pub async fn tick(
    peer: &mut PeerRecord,
    correlator: &mut Correlator,
    status: &mut StatusSink,
    config: &CoreConfig,
) {
    match peer.live.status {
        SessionStatus::Disconnected | SessionStatus::Aborted => {}
        SessionStatus::Connecting => tick_connecting(peer, config, status).await,
        SessionStatus::Connected => tick_connected(peer, correlator, status).await,
        SessionStatus::Disconnecting => tick_disconnecting(peer).await,
    }
}

async fn tick_connecting(peer: &mut PeerRecord, config: &CoreConfig, status: &mut StatusSink) {
    if let Some(at) = peer.live.next_attempt_at {
        if Instant::now() < at {
            return;
        }
    }

    peer.live.attempt_count += 1;
    match transport::connect(&peer.address, config.websocket_max_frame_bytes).await {
        Ok(socket) => {
            peer.live.socket = Some(socket);
            peer.live.status = SessionStatus::Connected;
            peer.live.attempt_count = 0;
            peer.live.next_attempt_at = None;
            info!(peer = %peer.address.label, "peer connected");
        }
        Err(e) => {
            if peer.live.attempt_count >= config.attempt_count_maximum {
                peer.live.status = SessionStatus::Aborted;
                status.push(StatusMessage::new(
                    Severity::Error,
                    peer.address.label.clone(),
                    format!("giving up after {} attempts: {e}", peer.live.attempt_count),
                ));
            } else {
                peer.live.next_attempt_at = Some(Instant::now() + config.attempt_time_gap);
                status.push(StatusMessage::new(
                    Severity::Warning,
                    peer.address.label.clone(),
                    format!("connect attempt {} failed: {e}", peer.live.attempt_count),
                ));
            }
        }
    }
}

async fn tick_connected(peer: &mut PeerRecord, correlator: &mut Correlator, status: &mut StatusSink) {
    let label = peer.address.label.clone();
    let Some(socket) = peer.live.socket.as_mut() else {
        // No socket while Connected is a bookkeeping bug elsewhere; treat it
        // like a dropped connection rather than panicking mid-tick.
        peer.live.status = SessionStatus::Connecting;
        peer.live.attempt_count = 0;
        return;
    };

    let mut pending = correlator.take_outbound(&label).into_iter();
    let mut dropped_connection = false;
    let mut unsent = Vec::new();
    for (series, id) in pending.by_ref() {
        match transport::exchange(socket, &series, &label).await {
            Ok(response) => correlator.post_response(id, response),
            Err(e) => {
                warn!(peer = %label, error = %e, "transport error mid-batch, reconnecting");
                unsent.push((series, id));
                dropped_connection = true;
                break;
            }
        }
    }
    unsent.extend(pending);

    if dropped_connection {
        // Whatever didn't get a reply this tick is re-queued so it is
        // retried once the peer reconnects, preserving submission order.
        if !unsent.is_empty() {
            correlator.requeue_front(&label, unsent);
        }
        peer.live.socket = None;
        peer.live.status = SessionStatus::Connecting;
        peer.live.attempt_count = 0;
        peer.live.next_attempt_at = None;
        return;
    }

    let drain_request = RequestSeries::single(RequestRecord::DequeueStatusMessages);
    match transport::exchange(socket, &drain_request, &label).await {
        Ok(response) => {
            for record in response.series {
                if let controller_protocol::ResponseRecord::DequeueStatusMessages { status_messages } = record {
                    for mut message in status_messages {
                        message.source_label = label.clone();
                        status.push(message);
                    }
                }
            }
        }
        Err(e) => {
            warn!(peer = %label, error = %e, "status drain failed, reconnecting");
            peer.live.socket = None;
            peer.live.status = SessionStatus::Connecting;
            peer.live.attempt_count = 0;
        }
    }
}

async fn tick_disconnecting(peer: &mut PeerRecord) {
    if let Some(mut socket) = peer.live.socket.take() {
        transport::close(&mut socket).await;
    }
    peer.live.status = SessionStatus::Disconnected;
}
