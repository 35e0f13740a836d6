//! Derived resource demand of pending plans, feeding the paused-state
//! overlay. Pure aggregation; rendering stays with the embedder.

use std::collections::BTreeMap;

use crate::catalog::{BlockCatalog, ItemId};
use crate::domain::{BuildPlan, PeerId};

/// Item type to required amount. Ordered so display output is stable.
pub type ItemCounts = BTreeMap<ItemId, u32>;

/// One under-stocked item in the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub item: ItemId,
    pub required: u32,
    pub available: u32,
}

/// Resource requirements of every pending non-removal plan, grouped per
/// peer and summed overall. Recomputed from scratch on demand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementReport {
    /// Peers with at least one costed plan; everyone else is omitted.
    pub per_peer: BTreeMap<PeerId, ItemCounts>,
    pub total: ItemCounts,
}

impl RequirementReport {
    /// Aggregate over the given queues. Removal plans and plans whose
    /// block is unresolved contribute nothing. Amounts saturate instead
    /// of wrapping.
    pub fn compute<'a, I>(queues: I, catalog: &BlockCatalog) -> Self
    where
        I: IntoIterator<Item = (PeerId, &'a [BuildPlan])>,
    {
        let mut report = Self::default();
        for (peer, plans) in queues {
            let mut counts = ItemCounts::new();
            for plan in plans {
                if plan.breaking {
                    continue;
                }
                let Some(def) = plan.block.and_then(|id| catalog.get(id)) else {
                    continue;
                };
                for stack in &def.cost {
                    let slot = counts.entry(stack.item).or_insert(0);
                    *slot = slot.saturating_add(stack.amount);
                }
            }
            if counts.is_empty() {
                continue;
            }
            for (&item, &amount) in &counts {
                let slot = report.total.entry(item).or_insert(0);
                *slot = slot.saturating_add(amount);
            }
            report.per_peer.insert(peer, counts);
        }
        report
    }

    /// Items whose total requirement exceeds the available stock. Items
    /// absent from `stock` count as zero available.
    pub fn shortfalls(&self, stock: &ItemCounts) -> Vec<Shortfall> {
        self.total
            .iter()
            .filter_map(|(&item, &required)| {
                let available = stock.get(&item).copied().unwrap_or(0);
                (required > available).then_some(Shortfall {
                    item,
                    required,
                    available,
                })
            })
            .collect()
    }
}
