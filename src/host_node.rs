//! Host-side session node. Owns the authoritative pause state, relays
//! client plan snapshots and keeps shadow copies of every queue. The
//! embedder drives it either frame-by-frame with [`HostNode::pump`] or
//! as a service with [`HostNode::run`].

use log::{debug, info};

use crate::catalog::BlockCatalog;
use crate::codec;
use crate::config::{Settings, RESYNC_COMMAND, TICK_INTERVAL};
use crate::coordinator::{PauseCoordinator, StateChange};
use crate::domain::{strip_markup, BuildPlan, GameState, PauseNotice, Peer, PeerDirectory, PeerId};
use crate::preview::RequirementReport;
use crate::replicator::{self, LocalPlans, ShadowPlans};
use crate::transport::{Channel, HostTransport, Packet};

pub struct HostNode {
    me: Peer,
    settings: Settings,
    directory: PeerDirectory,
    coordinator: PauseCoordinator,
    local: LocalPlans,
    shadows: ShadowPlans,
    catalog: BlockCatalog,
    transport: Box<dyn HostTransport>,
    notices: Vec<PauseNotice>,
    sync_requests: u64,
}

impl HostNode {
    /// A freshly hosted session starts in the playing state with only the
    /// host's own peer in the directory.
    pub fn new(
        me: Peer,
        settings: Settings,
        catalog: BlockCatalog,
        transport: Box<dyn HostTransport>,
    ) -> Self {
        let mut directory = PeerDirectory::new();
        directory.insert(me.clone());
        Self {
            me,
            settings,
            directory,
            coordinator: PauseCoordinator::new(GameState::Playing),
            local: LocalPlans::new(),
            shadows: ShadowPlans::new(),
            catalog,
            transport,
            notices: Vec::new(),
            sync_requests: 0,
        }
    }

    pub fn state(&self) -> GameState {
        self.coordinator.state()
    }

    /// Engine-driven transition (map load, return to menu).
    pub fn set_state(&mut self, state: GameState) {
        self.coordinator.set_state(state);
    }

    pub fn directory(&self) -> &PeerDirectory {
        &self.directory
    }

    /// Admit a peer. A latecomer to a paused session is caught up with a
    /// targeted state update and every known plan snapshot, so its mirror
    /// converges without waiting for the next change.
    pub fn connect_peer(&mut self, peer: Peer) -> anyhow::Result<()> {
        let id = peer.id;
        info!("peer {} ({}) joined", id, strip_markup(&peer.name));
        self.directory.insert(peer);
        if !self.state().is_paused() {
            return Ok(());
        }
        let by = self.coordinator.last_changed_by().unwrap_or(self.me.id);
        self.transport.send_to(
            id,
            Packet::new(Channel::StateUpdate, codec::encode_state_update(by, true)),
        )?;
        if !self.local.queue().is_empty() {
            let snapshot = codec::encode_plans(self.local.queue());
            self.transport.send_to(
                id,
                Packet::new(
                    Channel::PlansUpdate,
                    codec::encode_plans_update(self.me.id, &snapshot),
                ),
            )?;
        }
        for (peer, plans) in self.shadows.iter() {
            let snapshot = codec::encode_plans(plans);
            self.transport.send_to(
                id,
                Packet::new(
                    Channel::PlansUpdate,
                    codec::encode_plans_update(peer, &snapshot),
                ),
            )?;
        }
        Ok(())
    }

    /// Drop a departed peer and its shadow queue.
    pub fn disconnect_peer(&mut self, id: PeerId) {
        info!("peer {id} left");
        self.directory.remove(id);
        self.shadows.remove(id);
    }

    pub fn queue_plan(&mut self, plan: BuildPlan) {
        self.local.push(plan);
    }

    pub fn clear_plans(&mut self) {
        self.local.clear();
    }

    /// The host's own pause input, e.g. the pause key.
    pub fn toggle_local(&mut self) -> anyhow::Result<()> {
        let Some(change) = self.coordinator.toggle_local(self.me.id) else {
            return Ok(());
        };
        self.announce(change)
    }

    /// Take the toasts accumulated since the last call.
    pub fn drain_notices(&mut self) -> Vec<PauseNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Aggregate requirements over the host's own queue and every shadow.
    pub fn requirement_report(&self) -> RequirementReport {
        let mut queues: Vec<(PeerId, &[BuildPlan])> = vec![(self.me.id, self.local.queue())];
        queues.extend(self.shadows.iter());
        RequirementReport::compute(queues, &self.catalog)
    }

    pub fn shadow_plans(&self, peer: PeerId) -> Option<&[BuildPlan]> {
        self.shadows.get(peer)
    }

    /// Resync commands seen on chat so far. The engine-level resync
    /// itself is the embedder's job.
    pub fn sync_requests(&self) -> u64 {
        self.sync_requests
    }

    /// Dispatch one inbound packet. Malformed or unauthorized traffic is
    /// dropped here; only transport faults surface as errors.
    pub fn handle_packet(&mut self, from: PeerId, packet: Packet) -> anyhow::Result<()> {
        match packet.channel {
            Channel::PauseRequest => self.on_pause_request(from),
            Channel::PlansSync => self.on_plans_sync(from, &packet.data),
            Channel::Chat => {
                self.on_chat(from, &packet.data);
                Ok(())
            }
            Channel::StateUpdate | Channel::PlansUpdate => {
                debug!("dropping client-bound {} packet from {from}", packet.channel);
                Ok(())
            }
        }
    }

    fn on_pause_request(&mut self, from: PeerId) -> anyhow::Result<()> {
        let Some(peer) = self.directory.get(from) else {
            debug!("pause request from unknown peer {from}");
            return Ok(());
        };
        let Some(change) = self.coordinator.handle_toggle_request(peer, &self.settings) else {
            debug!("pause request from {from} denied");
            return Ok(());
        };
        self.announce(change)
    }

    fn announce(&mut self, change: StateChange) -> anyhow::Result<()> {
        info!(
            "{} by peer {}",
            if change.paused { "paused" } else { "unpaused" },
            change.by
        );
        self.transport.broadcast(Packet::new(
            Channel::StateUpdate,
            codec::encode_state_update(change.by, change.paused),
        ))?;
        if self.settings.toasts {
            let by = self.directory.get(change.by).map(|p| strip_markup(&p.name));
            self.notices.push(PauseNotice {
                by,
                paused: change.paused,
            });
        }
        Ok(())
    }

    fn on_plans_sync(&mut self, from: PeerId, data: &str) -> anyhow::Result<()> {
        if !self.state().is_game() {
            debug!("plan snapshot from {from} while in menu");
            return Ok(());
        }
        if !self.directory.contains(from) {
            debug!("plan snapshot from unknown peer {from}");
            return Ok(());
        }
        let Some(tagged) = replicator::relay_from_client(from, data) else {
            debug!("oversized plan snapshot from {from} ({} bytes)", data.len());
            return Ok(());
        };
        // The host keeps its own shadow of the queue before fanning the
        // payload out untouched, originator included.
        self.shadows
            .replace(from, codec::decode_plans(data, &self.catalog));
        self.transport
            .broadcast(Packet::new(Channel::PlansUpdate, tagged))
    }

    fn on_chat(&mut self, from: PeerId, line: &str) {
        if line.trim() == RESYNC_COMMAND {
            debug!("resync requested by peer {from}");
            self.sync_requests += 1;
        }
    }

    /// Per-frame work: ship the host's own snapshot when it changed.
    pub fn tick(&mut self) -> anyhow::Result<()> {
        if let Some(snapshot) = self.local.tick(self.state().is_paused(), true) {
            let tagged = codec::encode_plans_update(self.me.id, &snapshot);
            self.transport
                .broadcast(Packet::new(Channel::PlansUpdate, tagged))?;
        }
        Ok(())
    }

    /// Drain everything queued right now, then tick. For frame-driven
    /// embedders.
    pub fn pump(&mut self) -> anyhow::Result<()> {
        while let Some((from, packet)) = self.transport.try_recv() {
            self.handle_packet(from, packet)?;
        }
        self.tick()
    }

    /// Service-style loop: dispatch until every client link is gone.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut frames = tokio::time::interval(TICK_INTERVAL);
        loop {
            let inbound = tokio::select! {
                inbound = self.transport.recv() => Some(inbound?),
                _ = frames.tick() => None,
            };
            match inbound {
                Some(Some((from, packet))) => self.handle_packet(from, packet)?,
                Some(None) => {
                    info!("all client links closed, host loop ending");
                    return Ok(());
                }
                None => self.tick()?,
            }
        }
    }
}
