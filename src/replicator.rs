//! Build-plan replication: change detection for a node's own queue, the
//! host-side relay guard and the shadow copies of other peers' queues.

use std::collections::BTreeMap;

use crate::catalog::BlockCatalog;
use crate::codec;
use crate::config::PLAN_PACKET_HARD_LIMIT;
use crate::domain::{BuildPlan, PeerDirectory, PeerId};

/// A node's own pending queue plus the last snapshot it shipped. The
/// change detector is textual: the queue is re-encoded each tick and
/// compared against the previous payload.
#[derive(Debug, Default)]
pub struct LocalPlans {
    queue: Vec<BuildPlan>,
    last_sent: String,
}

impl LocalPlans {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self) -> &[BuildPlan] {
        &self.queue
    }

    pub fn push(&mut self, plan: BuildPlan) {
        self.queue.push(plan);
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Replace the whole queue, e.g. after the engine reorders it.
    pub fn replace(&mut self, plans: Vec<BuildPlan>) {
        self.queue = plans;
    }

    /// Change-detection poll, run every update cycle. Emits the encoded
    /// snapshot only while paused on a live session and only when it
    /// differs from the last one sent. The first send after a change to
    /// an empty queue is the empty payload, which clears the far side.
    pub fn tick(&mut self, paused: bool, connected: bool) -> Option<String> {
        if !paused || !connected {
            return None;
        }
        let encoded = codec::encode_plans(&self.queue);
        if encoded == self.last_sent {
            return None;
        }
        self.last_sent = encoded.clone();
        Some(encoded)
    }
}

/// Host-side guard for a client snapshot: reject oversized payloads, tag
/// the rest with the sender for fan-out. The body is passed through
/// opaquely, not re-encoded.
pub fn relay_from_client(from: PeerId, payload: &str) -> Option<String> {
    if payload.len() > PLAN_PACKET_HARD_LIMIT {
        return None;
    }
    Some(codec::encode_plans_update(from, payload))
}

/// Last known plan queues of other peers, keyed by sender. Updates are
/// wholesale: each snapshot replaces the previous queue entirely.
#[derive(Debug, Default)]
pub struct ShadowPlans {
    queues: BTreeMap<PeerId, Vec<BuildPlan>>,
}

impl ShadowPlans {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, peer: PeerId) -> Option<&[BuildPlan]> {
        self.queues.get(&peer).map(Vec::as_slice)
    }

    pub fn replace(&mut self, peer: PeerId, queue: Vec<BuildPlan>) {
        self.queues.insert(peer, queue);
    }

    /// Forget a departed peer.
    pub fn remove(&mut self, peer: PeerId) {
        self.queues.remove(&peer);
    }

    pub fn iter(&self) -> impl Iterator<Item = (PeerId, &[BuildPlan])> + '_ {
        self.queues.iter().map(|(id, q)| (*id, q.as_slice()))
    }

    /// Decode one fanned-out snapshot and apply it. Returns the sender
    /// whose shadow changed, or `None` when the message was ignored: no
    /// separator, unparseable or unknown sender, or our own echo.
    pub fn apply_update(
        &mut self,
        data: &str,
        self_id: PeerId,
        directory: &PeerDirectory,
        catalog: &BlockCatalog,
    ) -> Option<PeerId> {
        let (from, body) = codec::decode_plans_update(data)?;
        if from == self_id || !directory.contains(from) {
            return None;
        }
        self.replace(from, codec::decode_plans(body, catalog));
        Some(from)
    }
}
