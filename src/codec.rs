//! Wire payload encoding.
//!
//! Plan snapshots travel as `;`-separated entries of five `,`-separated
//! fields: x, y, rotation, block id (`-1` for none) and a 0/1 removal
//! flag. Pause updates travel as `"<peerId> <t|f>"`. Decoding is
//! best-effort: entries that fail to parse are dropped without any error
//! surfacing to the peer.

use crate::catalog::{BlockCatalog, BlockId};
use crate::config::PLAN_PACKET_SOFT_LIMIT;
use crate::domain::{BuildPlan, PeerId};

/// Encode a plan queue, preserving order. Output is capped: once the
/// payload exceeds the soft limit no further entries are added, so the
/// result is always a prefix of the queue.
pub fn encode_plans(plans: &[BuildPlan]) -> String {
    let mut out = String::new();
    for (i, plan) in plans.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        let block = plan.block.map_or(-1, |b| i32::from(b.0));
        out.push_str(&format!(
            "{},{},{},{},{}",
            plan.x,
            plan.y,
            plan.rotation,
            block,
            u8::from(plan.breaking)
        ));
        if out.len() > PLAN_PACKET_SOFT_LIMIT {
            break;
        }
    }
    out
}

/// Decode a plan snapshot, skipping malformed entries silently. An empty
/// payload is an empty queue.
pub fn decode_plans(data: &str, catalog: &BlockCatalog) -> Vec<BuildPlan> {
    if data.is_empty() {
        return Vec::new();
    }
    data.split(';')
        .filter_map(|entry| decode_entry(entry, catalog))
        .collect()
}

fn decode_entry(entry: &str, catalog: &BlockCatalog) -> Option<BuildPlan> {
    let mut fields = entry.split(',');
    let (Some(x), Some(y), Some(rotation), Some(block), Some(breaking), None) = (
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
        fields.next(),
    ) else {
        return None;
    };
    let x: i32 = x.parse().ok()?;
    let y: i32 = y.parse().ok()?;
    let rotation: u8 = match rotation.parse().ok()? {
        r @ 0..=3 => r,
        _ => return None,
    };
    let raw: i32 = block.parse().ok()?;
    // Negative ids (the -1 sentinel included) read as "no block", ids
    // past the u16 space make the whole entry malformed; whether a
    // missing block is acceptable depends on the removal flag below.
    let block = match u16::try_from(raw) {
        Ok(n) => {
            let id = BlockId(n);
            catalog.contains(id).then_some(id)
        }
        Err(_) if raw < 0 => None,
        Err(_) => return None,
    };
    let breaking = breaking == "1";
    if !breaking && block.is_none() {
        return None;
    }
    Some(BuildPlan {
        x,
        y,
        rotation,
        block,
        breaking,
    })
}

/// Payload of a pause state broadcast.
pub fn encode_state_update(by: PeerId, paused: bool) -> String {
    format!("{} {}", by, if paused { "t" } else { "f" })
}

/// Parse a pause state broadcast. Trailing separators are ignored, then
/// a wrong field count drops the whole message (`None`); an unparseable
/// peer id still yields the flag, with the attribution left unknown.
/// Only the exact token `t` means paused.
pub fn decode_state_update(data: &str) -> Option<(Option<PeerId>, bool)> {
    let mut parts = data.trim_end_matches(' ').split(' ');
    let (Some(id), Some(flag), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    let by = id.parse::<u32>().ok().map(PeerId);
    Some((by, flag == "t"))
}

/// Tag a plan snapshot with its sender for fan-out to clients.
pub fn encode_plans_update(from: PeerId, payload: &str) -> String {
    format!("{from}|{payload}")
}

/// Split a fanned-out snapshot into sender and body. Splits on the first
/// separator only; the body is passed through untouched.
pub fn decode_plans_update(data: &str) -> Option<(PeerId, &str)> {
    let (id, body) = data.split_once('|')?;
    let id = id.parse::<u32>().ok()?;
    Some((PeerId(id), body))
}
