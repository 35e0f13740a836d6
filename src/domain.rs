//! Session-level types shared by every node: peers, the pause state,
//! build plans and user-facing notices.

use std::collections::HashMap;
use std::fmt;

use crate::catalog::BlockId;

/// Identity of a session participant, unique for the session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerId(pub u32);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A connected participant. Name and color are presentation-only; `admin`
/// is the elevated-privilege bit checked by the pause authorization gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub id: PeerId,
    /// Display name, possibly carrying `[tag]` color markup.
    pub name: String,
    /// Packed 0xRRGGBB presentation color.
    pub color: u32,
    pub admin: bool,
}

/// The peers currently in the session, mirrored on every node. Membership
/// changes are driven by the embedder; the protocol only reads it.
#[derive(Debug, Clone, Default)]
pub struct PeerDirectory {
    peers: HashMap<PeerId, Peer>,
}

impl PeerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or refresh a peer entry.
    pub fn insert(&mut self, peer: Peer) {
        self.peers.insert(peer.id, peer);
    }

    pub fn remove(&mut self, id: PeerId) -> Option<Peer> {
        self.peers.remove(&id)
    }

    pub fn get(&self, id: PeerId) -> Option<&Peer> {
        self.peers.get(&id)
    }

    pub fn contains(&self, id: PeerId) -> bool {
        self.peers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Peer> + '_ {
        self.peers.values()
    }
}

/// Global session state. The host's copy is authoritative; every client
/// keeps a separate mirror that converges after each state broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Menu,
    Playing,
    Paused,
}

impl GameState {
    pub fn is_paused(self) -> bool {
        self == GameState::Paused
    }

    /// True for any in-session state, i.e. anything but the menu.
    pub fn is_game(self) -> bool {
        self != GameState::Menu
    }
}

/// One queued construction or deconstruction intent, owned by a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildPlan {
    pub x: i32,
    pub y: i32,
    /// Orientation in quarter turns, 0-3.
    pub rotation: u8,
    /// Structure to place; `None` means no resolvable block (plain deconstruction).
    pub block: Option<BlockId>,
    /// True when this plan removes a structure instead of placing one.
    pub breaking: bool,
}

impl BuildPlan {
    /// Plan placing `block` at the given tile with the given rotation.
    pub fn place(x: i32, y: i32, rotation: u8, block: BlockId) -> Self {
        Self {
            x,
            y,
            rotation,
            block: Some(block),
            breaking: false,
        }
    }

    /// Plan removing whatever stands at the given tile.
    pub fn remove(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            rotation: 0,
            block: None,
            breaking: true,
        }
    }
}

/// Toast raised when the pause state changes, attributing the change to a
/// peer when the id resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PauseNotice {
    /// Markup-stripped display name of the initiating peer, if known.
    pub by: Option<String>,
    pub paused: bool,
}

impl fmt::Display for PauseNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} the game.",
            self.by.as_deref().unwrap_or("Unknown player"),
            if self.paused { "paused" } else { "unpaused" }
        )
    }
}

/// Strip `[tag]` color markup from a display name. `[[` escapes a literal
/// opening bracket; an unterminated tag swallows the remainder.
pub fn strip_markup(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '[' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'[') {
            chars.next();
            out.push('[');
            continue;
        }
        for d in chars.by_ref() {
            if d == ']' {
                break;
            }
        }
    }
    out
}
