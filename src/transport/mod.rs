//! Message transport between a host and its clients.
//!
//! The engine exposes reliable, ordered, named channels; the traits here
//! model exactly that and nothing more. Sends never block: they queue on
//! the link and return. Receives come in two shapes, an async wait for
//! service-style loops and a non-blocking poll for frame-driven callers.

use std::fmt;

use crate::domain::PeerId;

/// Logical channel a packet travels on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Client asks the host to toggle the pause state.
    PauseRequest,
    /// Host announces the authoritative state to everyone.
    StateUpdate,
    /// Client ships its own plan snapshot to the host.
    PlansSync,
    /// Host fans a sender-tagged snapshot out to everyone.
    PlansUpdate,
    /// Plain chat line; carries the resync command.
    Chat,
}

impl Channel {
    pub fn name(self) -> &'static str {
        match self {
            Channel::PauseRequest => "pause-request",
            Channel::StateUpdate => "pause-state-update",
            Channel::PlansSync => "plans-sync",
            Channel::PlansUpdate => "plans-update",
            Channel::Chat => "chat",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One reliable, ordered message on a channel. Payloads are text; the
/// encodings live in [`crate::codec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub channel: Channel,
    pub data: String,
}

impl Packet {
    pub fn new(channel: Channel, data: impl Into<String>) -> Self {
        Self {
            channel,
            data: data.into(),
        }
    }
}

/// The host end of a star network: one link per connected client.
#[async_trait::async_trait]
pub trait HostTransport: Send {
    /// Queue a packet to one client. Errors when no such link exists.
    fn send_to(&mut self, peer: PeerId, packet: Packet) -> anyhow::Result<()>;

    /// Queue a packet to every connected client, dead links excluded.
    fn broadcast(&mut self, packet: Packet) -> anyhow::Result<()>;

    /// Wait for the next client packet. `None` once every link is gone.
    async fn recv(&mut self) -> anyhow::Result<Option<(PeerId, Packet)>>;

    /// Non-blocking poll; `None` when nothing is queued right now.
    fn try_recv(&mut self) -> Option<(PeerId, Packet)>;
}

/// A client's single link up to the host.
#[async_trait::async_trait]
pub trait ClientTransport: Send {
    /// Queue a packet to the host. Errors when the link is down.
    fn send(&mut self, packet: Packet) -> anyhow::Result<()>;

    /// Wait for the next host packet. `None` once the link closes.
    async fn recv(&mut self) -> anyhow::Result<Option<Packet>>;

    /// Non-blocking poll; `None` when nothing is queued right now.
    fn try_recv(&mut self) -> Option<Packet>;
}

pub mod in_memory;
