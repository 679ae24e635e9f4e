//! Request/Response Correlator (C5): the mailbox that decouples submitting
//! a request series from consuming its eventual reply (spec.md §4.5).

use std::collections::HashMap;

use controller_protocol::{RequestSeries, ResponseSeries};
use uuid::Uuid;

use crate::error::CoreError;

/// Two mappings, as spec.md §3 describes: outbound per-peer FIFO queues of
/// not-yet-transmitted series, and an inbound table from id to reply (or
/// "not yet"). The Correlator is the only place request ids are allocated.
#[derive(Default)]
pub struct Correlator {
    outbound: HashMap<String, Vec<(RequestSeries, Uuid)>>,
    inbound: HashMap<Uuid, Option<ResponseSeries>>,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh id, enqueue `series` behind `label`'s outbound FIFO,
    /// and mark the id "not yet received" in the inbound map.
    pub fn submit(&mut self, label: &str, series: RequestSeries) -> Uuid {
        let id = Uuid::new_v4();
        self.outbound.entry(label.to_owned()).or_default().push((series, id));
        self.inbound.insert(id, None);
        id
    }

    /// `Some(series)` if the reply has arrived, consuming the inbound slot.
    /// `None` if it is still pending. An id the Correlator never issued (or
    /// has already had claimed) is a programmer error.
    pub fn try_claim(&mut self, id: Uuid) -> Result<Option<ResponseSeries>, CoreError> {
        match self.inbound.get(&id) {
            None => Err(CoreError::UnknownRequestId(id)),
            Some(None) => Ok(None),
            Some(Some(_)) => Ok(self.inbound.remove(&id).flatten()),
        }
    }

    /// Drop `id` from both maps without error, whether or not it is present
    /// (spec.md §4.5).
    pub fn ignore(&mut self, label: &str, id: Uuid) {
        if let Some(queue) = self.outbound.get_mut(label) {
            queue.retain(|(_, queued_id)| *queued_id != id);
        }
        self.inbound.remove(&id);
    }

    /// Take the entirety of `label`'s outbound queue, in submission order,
    /// leaving it empty. Used by the Supervisor once per `Connected` tick
    /// (spec.md §4.4 step 1).
    pub fn take_outbound(&mut self, label: &str) -> Vec<(RequestSeries, Uuid)> {
        self.outbound.remove(label).unwrap_or_default()
    }

    /// Put `items` back at the front of `label`'s outbound queue, ahead of
    /// anything submitted since. Used when a transport error interrupts a
    /// batch mid-dispatch, so the undelivered remainder is retried in
    /// submission order once the peer reconnects.
    pub fn requeue_front(&mut self, label: &str, items: Vec<(RequestSeries, Uuid)>) {
        let queue = self.outbound.entry(label.to_owned()).or_default();
        for (offset, item) in items.into_iter().enumerate() {
            queue.insert(offset, item);
        }
    }

    /// Record `series` as the reply for `id`. Called by the Supervisor
    /// after a successful exchange.
    pub fn post_response(&mut self, id: Uuid, series: ResponseSeries) {
        self.inbound.insert(id, Some(series));
    }

    pub fn is_pending(&self, id: Uuid) -> bool {
        matches!(self.inbound.get(&id), Some(None))
    }
}
