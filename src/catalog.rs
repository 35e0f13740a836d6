//! Static content descriptors standing in for the engine's registry.
//! Decoding resolves structure ids against it; the resource preview reads
//! build costs from it.

use std::collections::HashMap;

/// Numeric identifier of an item (resource) type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub u16);

/// Numeric identifier of a structure type, as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u16);

/// An item quantity, as used in structure build costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemStack {
    pub item: ItemId,
    pub amount: u32,
}

impl ItemStack {
    pub fn new(item: ItemId, amount: u32) -> Self {
        Self { item, amount }
    }
}

/// Descriptor of a buildable structure type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDef {
    pub id: BlockId,
    pub name: String,
    /// Items consumed to build one instance. May be empty.
    pub cost: Vec<ItemStack>,
}

/// The structure and item types known to this session. Both sides of a
/// link must agree on it for ids to resolve; unknown ids simply fail to.
#[derive(Debug, Clone, Default)]
pub struct BlockCatalog {
    blocks: HashMap<BlockId, BlockDef>,
    items: HashMap<ItemId, String>,
}

impl BlockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, def: BlockDef) {
        self.blocks.insert(def.id, def);
    }

    pub fn register_item(&mut self, id: ItemId, name: impl Into<String>) {
        self.items.insert(id, name.into());
    }

    pub fn get(&self, id: BlockId) -> Option<&BlockDef> {
        self.blocks.get(&id)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains_key(&id)
    }

    pub fn item_name(&self, id: ItemId) -> Option<&str> {
        self.items.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
