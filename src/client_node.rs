//! Client-side session node. Mirrors the host's pause state, ships its
//! own plan snapshots upward and applies fanned-out snapshots from other
//! peers. Same two driving styles as the host node.

use std::time::Instant;

use log::{debug, info};

use crate::catalog::BlockCatalog;
use crate::codec;
use crate::config::{Settings, RESYNC_COMMAND, TICK_INTERVAL};
use crate::coordinator::{PauseMirror, ResyncDecision, ResyncScheduler};
use crate::domain::{strip_markup, BuildPlan, GameState, PauseNotice, Peer, PeerDirectory, PeerId};
use crate::preview::RequirementReport;
use crate::replicator::{LocalPlans, ShadowPlans};
use crate::transport::{Channel, ClientTransport, Packet};

pub struct ClientNode {
    me: Peer,
    settings: Settings,
    directory: PeerDirectory,
    mirror: PauseMirror,
    scheduler: ResyncScheduler,
    local: LocalPlans,
    shadows: ShadowPlans,
    catalog: BlockCatalog,
    transport: Box<dyn ClientTransport>,
    notices: Vec<PauseNotice>,
}

impl ClientNode {
    /// Joining an already running session, so the mirror starts out
    /// playing; a catch-up broadcast corrects it if the host is paused.
    pub fn new(
        me: Peer,
        settings: Settings,
        catalog: BlockCatalog,
        transport: Box<dyn ClientTransport>,
    ) -> Self {
        let mut directory = PeerDirectory::new();
        directory.insert(me.clone());
        Self {
            me,
            settings,
            directory,
            mirror: PauseMirror::new(GameState::Playing),
            scheduler: ResyncScheduler::new(),
            local: LocalPlans::new(),
            shadows: ShadowPlans::new(),
            catalog,
            transport,
            notices: Vec::new(),
        }
    }

    pub fn state(&self) -> GameState {
        self.mirror.state()
    }

    /// Engine-driven transition, e.g. back to the menu.
    pub fn set_state(&mut self, state: GameState) {
        self.mirror.set_state(state);
    }

    pub fn directory(&self) -> &PeerDirectory {
        &self.directory
    }

    /// Membership bookkeeping; the embedder relays engine join events.
    pub fn peer_joined(&mut self, peer: Peer) {
        self.directory.insert(peer);
    }

    pub fn peer_left(&mut self, id: PeerId) {
        self.directory.remove(id);
        self.shadows.remove(id);
    }

    pub fn queue_plan(&mut self, plan: BuildPlan) {
        self.local.push(plan);
    }

    pub fn clear_plans(&mut self) {
        self.local.clear();
    }

    /// Ask the host to toggle the pause state. A no-op in the menu; the
    /// host applies its own authorization on top.
    pub fn request_toggle(&mut self) -> anyhow::Result<()> {
        if !self.mirror.state().is_game() {
            return Ok(());
        }
        debug!("requesting pause toggle");
        self.transport.send(Packet::new(Channel::PauseRequest, ""))
    }

    /// Take the toasts accumulated since the last call.
    pub fn drain_notices(&mut self) -> Vec<PauseNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Aggregate requirements over this node's queue and every shadow.
    pub fn requirement_report(&self) -> RequirementReport {
        let mut queues: Vec<(PeerId, &[BuildPlan])> = vec![(self.me.id, self.local.queue())];
        queues.extend(self.shadows.iter());
        RequirementReport::compute(queues, &self.catalog)
    }

    pub fn shadow_plans(&self, peer: PeerId) -> Option<&[BuildPlan]> {
        self.shadows.get(peer)
    }

    /// Instant a deferred resync will fire, if one is pending.
    pub fn resync_pending(&self) -> Option<Instant> {
        self.scheduler.pending()
    }

    /// Dispatch one inbound packet. Malformed traffic is dropped; only
    /// transport faults surface as errors.
    pub fn handle_packet(&mut self, packet: Packet, now: Instant) -> anyhow::Result<()> {
        match packet.channel {
            Channel::StateUpdate => self.on_state_update(&packet.data, now),
            Channel::PlansUpdate => {
                self.shadows
                    .apply_update(&packet.data, self.me.id, &self.directory, &self.catalog);
                Ok(())
            }
            other => {
                debug!("dropping host-bound {other} packet");
                Ok(())
            }
        }
    }

    fn on_state_update(&mut self, data: &str, now: Instant) -> anyhow::Result<()> {
        let Some((by, paused)) = codec::decode_state_update(data) else {
            debug!("malformed state update {data:?}");
            return Ok(());
        };
        self.mirror.apply(paused);
        if self.settings.toasts {
            // An unknown or unparseable attribution still applies the
            // state; only the toast text degrades.
            let by = by
                .and_then(|id| self.directory.get(id))
                .map(|p| strip_markup(&p.name));
            self.notices.push(PauseNotice { by, paused });
        }
        if self.settings.resync_on(paused) {
            match self.scheduler.request(now, self.settings.schedule_resync) {
                ResyncDecision::SendNow => self.send_resync()?,
                ResyncDecision::ScheduledAt(at) => {
                    debug!("resync deferred for {:?}", at.saturating_duration_since(now));
                }
                ResyncDecision::Coalesced | ResyncDecision::Skipped => {}
            }
        }
        Ok(())
    }

    fn send_resync(&mut self) -> anyhow::Result<()> {
        info!("requesting engine resync");
        self.transport
            .send(Packet::new(Channel::Chat, RESYNC_COMMAND))
    }

    /// Per-frame work: fire a due deferred resync and ship the local
    /// snapshot when it changed.
    pub fn tick(&mut self, now: Instant) -> anyhow::Result<()> {
        if self.scheduler.poll(now) {
            self.send_resync()?;
        }
        if let Some(snapshot) = self.local.tick(self.mirror.is_paused(), true) {
            self.transport
                .send(Packet::new(Channel::PlansSync, snapshot))?;
        }
        Ok(())
    }

    /// Drain everything queued right now, then tick. For frame-driven
    /// embedders.
    pub fn pump(&mut self, now: Instant) -> anyhow::Result<()> {
        while let Some(packet) = self.transport.try_recv() {
            self.handle_packet(packet, now)?;
        }
        self.tick(now)
    }

    /// Service-style loop: dispatch until the host link closes.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut frames = tokio::time::interval(TICK_INTERVAL);
        loop {
            let inbound = tokio::select! {
                inbound = self.transport.recv() => Some(inbound?),
                _ = frames.tick() => None,
            };
            match inbound {
                Some(Some(packet)) => self.handle_packet(packet, Instant::now())?,
                Some(None) => {
                    info!("host link closed, client loop ending");
                    return Ok(());
                }
                None => self.tick(Instant::now())?,
            }
        }
    }
}
