use pausesync::{
    BlockCatalog, BlockDef, BlockId, BuildPlan, ItemCounts, ItemId, ItemStack, PeerId,
    RequirementReport, Shortfall,
};

const COPPER: ItemId = ItemId(0);
const GRAPHITE: ItemId = ItemId(1);

const WALL: BlockId = BlockId(1);
const DRILL: BlockId = BlockId(2);
const SCRAP: BlockId = BlockId(3);

fn catalog() -> BlockCatalog {
    let mut catalog = BlockCatalog::new();
    catalog.register(BlockDef {
        id: WALL,
        name: "wall".into(),
        cost: vec![ItemStack::new(COPPER, 6)],
    });
    catalog.register(BlockDef {
        id: DRILL,
        name: "drill".into(),
        cost: vec![ItemStack::new(COPPER, 10), ItemStack::new(GRAPHITE, 5)],
    });
    // Free to build, costs nothing.
    catalog.register(BlockDef {
        id: SCRAP,
        name: "scrap".into(),
        cost: Vec::new(),
    });
    catalog
}

fn counts(pairs: &[(ItemId, u32)]) -> ItemCounts {
    pairs.iter().copied().collect()
}

#[test]
fn totals_sum_across_peers() {
    let catalog = catalog();
    let a = vec![BuildPlan::place(0, 0, 0, WALL), BuildPlan::place(1, 0, 0, WALL)];
    let b = vec![BuildPlan::place(5, 5, 0, DRILL)];
    let report = RequirementReport::compute(
        vec![(PeerId(2), a.as_slice()), (PeerId(3), b.as_slice())],
        &catalog,
    );
    assert_eq!(report.per_peer[&PeerId(2)], counts(&[(COPPER, 12)]));
    assert_eq!(report.per_peer[&PeerId(3)], counts(&[(COPPER, 10), (GRAPHITE, 5)]));
    assert_eq!(report.total, counts(&[(COPPER, 22), (GRAPHITE, 5)]));
}

#[test]
fn removals_and_unresolved_blocks_contribute_nothing() {
    let catalog = catalog();
    let queue = vec![
        BuildPlan::place(0, 0, 0, WALL),
        BuildPlan::remove(1, 1),
        BuildPlan {
            x: 2,
            y: 2,
            rotation: 0,
            block: Some(BlockId(999)),
            breaking: true,
        },
    ];
    let report = RequirementReport::compute(vec![(PeerId(2), queue.as_slice())], &catalog);
    assert_eq!(report.total, counts(&[(COPPER, 6)]));
}

#[test]
fn peers_without_costed_plans_are_omitted() {
    let catalog = catalog();
    let only_removals = vec![BuildPlan::remove(0, 0)];
    let only_free = vec![BuildPlan::place(1, 1, 0, SCRAP)];
    let empty: Vec<BuildPlan> = Vec::new();
    let report = RequirementReport::compute(
        vec![
            (PeerId(2), only_removals.as_slice()),
            (PeerId(3), only_free.as_slice()),
            (PeerId(4), empty.as_slice()),
        ],
        &catalog,
    );
    assert!(report.per_peer.is_empty());
    assert!(report.total.is_empty());
    assert_eq!(report, RequirementReport::default());
}

#[test]
fn shortfalls_list_understocked_items_in_item_order() {
    let catalog = catalog();
    let queue = vec![
        BuildPlan::place(0, 0, 0, WALL),
        BuildPlan::place(1, 0, 0, DRILL),
        BuildPlan::place(2, 0, 0, DRILL),
    ];
    let report = RequirementReport::compute(vec![(PeerId(2), queue.as_slice())], &catalog);
    // copper 26, graphite 10 required; graphite missing entirely.
    let stock = counts(&[(COPPER, 20)]);
    assert_eq!(
        report.shortfalls(&stock),
        vec![
            Shortfall {
                item: COPPER,
                required: 26,
                available: 20
            },
            Shortfall {
                item: GRAPHITE,
                required: 10,
                available: 0
            },
        ]
    );
}

#[test]
fn no_shortfalls_when_stock_covers_the_total() {
    let catalog = catalog();
    let queue = vec![BuildPlan::place(0, 0, 0, WALL)];
    let report = RequirementReport::compute(vec![(PeerId(2), queue.as_slice())], &catalog);
    let stock = counts(&[(COPPER, 6)]);
    assert!(report.shortfalls(&stock).is_empty());
}

#[test]
fn amounts_saturate_instead_of_wrapping() {
    let mut catalog = BlockCatalog::new();
    catalog.register(BlockDef {
        id: WALL,
        name: "expensive".into(),
        cost: vec![ItemStack::new(COPPER, u32::MAX)],
    });
    let queue = vec![BuildPlan::place(0, 0, 0, WALL), BuildPlan::place(1, 0, 0, WALL)];
    let report = RequirementReport::compute(vec![(PeerId(2), queue.as_slice())], &catalog);
    assert_eq!(report.per_peer[&PeerId(2)][&COPPER], u32::MAX);
    assert_eq!(report.total[&COPPER], u32::MAX);
}
