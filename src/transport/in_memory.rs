//! In-memory star network for tests and the simulator. Each link is an
//! unbounded queue, so delivery is ordered and lossless like the
//! engine's reliable channel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::domain::PeerId;
use crate::transport::{ClientTransport, HostTransport, Packet};

type Outboxes = Arc<Mutex<HashMap<PeerId, UnboundedSender<Packet>>>>;

/// Hub wiring any number of client ends to a single host end. Clients
/// may connect and disconnect while the session runs.
pub struct LoopbackNet {
    to_host: UnboundedSender<(PeerId, Packet)>,
    outboxes: Outboxes,
}

/// The host end of the star.
pub struct LoopbackHost {
    inbox: UnboundedReceiver<(PeerId, Packet)>,
    outboxes: Outboxes,
}

/// One client end. Dropping it closes the upward link once the hub's own
/// handle is gone too.
pub struct LoopbackClient {
    peer: PeerId,
    to_host: UnboundedSender<(PeerId, Packet)>,
    inbox: UnboundedReceiver<Packet>,
}

impl LoopbackNet {
    /// Build the hub together with its host end.
    pub fn new() -> (Self, LoopbackHost) {
        let (to_host, inbox) = unbounded_channel();
        let outboxes: Outboxes = Arc::new(Mutex::new(HashMap::new()));
        (
            Self {
                to_host,
                outboxes: outboxes.clone(),
            },
            LoopbackHost { inbox, outboxes },
        )
    }

    /// Open a link for the given peer and hand back its client end.
    pub fn connect(&self, peer: PeerId) -> LoopbackClient {
        let (tx, inbox) = unbounded_channel();
        self.outboxes.lock().unwrap().insert(peer, tx);
        LoopbackClient {
            peer,
            to_host: self.to_host.clone(),
            inbox,
        }
    }

    /// Tear down the host-to-client direction of a link. The client end
    /// sees its inbox close after draining what was already queued.
    pub fn disconnect(&self, peer: PeerId) {
        self.outboxes.lock().unwrap().remove(&peer);
    }
}

#[async_trait::async_trait]
impl HostTransport for LoopbackHost {
    fn send_to(&mut self, peer: PeerId, packet: Packet) -> anyhow::Result<()> {
        let outboxes = self.outboxes.lock().unwrap();
        let Some(tx) = outboxes.get(&peer) else {
            anyhow::bail!("no link for peer {peer}");
        };
        tx.send(packet)
            .map_err(|_| anyhow::anyhow!("link to peer {peer} closed"))
    }

    fn broadcast(&mut self, packet: Packet) -> anyhow::Result<()> {
        // Dead links are pruned rather than failing the whole broadcast.
        let mut outboxes = self.outboxes.lock().unwrap();
        outboxes.retain(|_, tx| tx.send(packet.clone()).is_ok());
        Ok(())
    }

    async fn recv(&mut self) -> anyhow::Result<Option<(PeerId, Packet)>> {
        Ok(self.inbox.recv().await)
    }

    fn try_recv(&mut self) -> Option<(PeerId, Packet)> {
        self.inbox.try_recv().ok()
    }
}

#[async_trait::async_trait]
impl ClientTransport for LoopbackClient {
    fn send(&mut self, packet: Packet) -> anyhow::Result<()> {
        self.to_host
            .send((self.peer, packet))
            .map_err(|_| anyhow::anyhow!("host link closed"))
    }

    async fn recv(&mut self) -> anyhow::Result<Option<Packet>> {
        Ok(self.inbox.recv().await)
    }

    fn try_recv(&mut self) -> Option<Packet> {
        self.inbox.try_recv().ok()
    }
}
