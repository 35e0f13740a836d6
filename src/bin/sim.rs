use std::time::{Duration, Instant};

use clap::Parser;
use pausesync::{
    init_logging, BlockCatalog, BlockDef, BlockId, BuildPlan, ClientNode, HostNode, ItemCounts,
    ItemId, ItemStack, LoopbackNet, Peer, PeerId, Settings,
};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde_json::json;

/// Scripted pause-and-plans session over an in-memory network: one host,
/// a few clients, a pause, some queued plans, one resource report.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Clients joining the hosted session.
    #[arg(long, default_value_t = 2)]
    clients: u32,

    /// RNG seed; omit for a random session.
    #[arg(long)]
    seed: Option<u64>,

    /// Frames to pump after each scripted step.
    #[arg(long, default_value_t = 4)]
    frames: u32,
}

const DEMO_BLOCK_IDS: [BlockId; 4] = [BlockId(1), BlockId(2), BlockId(3), BlockId(4)];

const COPPER: ItemId = ItemId(0);
const GRAPHITE: ItemId = ItemId(1);
const SILICON: ItemId = ItemId(2);
const TITANIUM: ItemId = ItemId(3);

fn demo_catalog() -> BlockCatalog {
    let mut catalog = BlockCatalog::new();
    catalog.register_item(COPPER, "copper");
    catalog.register_item(GRAPHITE, "graphite");
    catalog.register_item(SILICON, "silicon");
    catalog.register_item(TITANIUM, "titanium");
    catalog.register(BlockDef {
        id: BlockId(1),
        name: "copper-wall".into(),
        cost: vec![ItemStack::new(COPPER, 6)],
    });
    catalog.register(BlockDef {
        id: BlockId(2),
        name: "conveyor".into(),
        cost: vec![ItemStack::new(COPPER, 1)],
    });
    catalog.register(BlockDef {
        id: BlockId(3),
        name: "silicon-smelter".into(),
        cost: vec![ItemStack::new(COPPER, 30), ItemStack::new(GRAPHITE, 25)],
    });
    catalog.register(BlockDef {
        id: BlockId(4),
        name: "laser-drill".into(),
        cost: vec![
            ItemStack::new(COPPER, 35),
            ItemStack::new(GRAPHITE, 30),
            ItemStack::new(SILICON, 30),
            ItemStack::new(TITANIUM, 20),
        ],
    });
    catalog
}

fn demo_stock() -> ItemCounts {
    let mut stock = ItemCounts::new();
    stock.insert(COPPER, 80);
    stock.insert(GRAPHITE, 40);
    stock.insert(SILICON, 10);
    stock
}

fn random_plan(rng: &mut SmallRng) -> BuildPlan {
    if rng.random_ratio(1, 5) {
        return BuildPlan::remove(rng.random_range(0..64), rng.random_range(0..64));
    }
    let block = DEMO_BLOCK_IDS[rng.random_range(0..DEMO_BLOCK_IDS.len())];
    BuildPlan::place(
        rng.random_range(0..64),
        rng.random_range(0..64),
        rng.random_range(0..4),
        block,
    )
}

fn item_label(catalog: &BlockCatalog, item: ItemId) -> String {
    catalog
        .item_name(item)
        .map(str::to_string)
        .unwrap_or_else(|| item.0.to_string())
}

async fn pump(host: &mut HostNode, clients: &mut [ClientNode], frames: u32) -> anyhow::Result<()> {
    for _ in 0..frames.max(1) {
        let now = Instant::now();
        for client in clients.iter_mut() {
            client.pump(now)?;
        }
        host.pump()?;
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    };

    let catalog = demo_catalog();
    let (net, host_end) = LoopbackNet::new();
    let mut host = HostNode::new(
        Peer {
            id: PeerId(1),
            name: "[accent]host[]".into(),
            color: 0xffd37f,
            admin: true,
        },
        Settings {
            allow_any_pause: true,
            ..Settings::default()
        },
        catalog.clone(),
        Box::new(host_end),
    );

    let mut clients = Vec::new();
    for i in 0..cli.clients {
        let id = PeerId(2 + i);
        let peer = Peer {
            id,
            name: format!("player-{}", i + 1),
            color: rng.random(),
            admin: false,
        };
        let link = net.connect(id);
        host.connect_peer(peer.clone())?;
        clients.push(ClientNode::new(
            peer,
            Settings::default(),
            catalog.clone(),
            Box::new(link),
        ));
    }
    let roster: Vec<Peer> = host.directory().iter().cloned().collect();
    for client in &mut clients {
        for peer in &roster {
            client.peer_joined(peer.clone());
        }
    }

    // A regular client asks for the pause; the allow-any setting lets it
    // through. With no clients the host pauses itself.
    match clients.first_mut() {
        Some(first) => first.request_toggle()?,
        None => host.toggle_local()?,
    }
    pump(&mut host, &mut clients, cli.frames).await?;
    let paused = host.state().is_paused();

    // Everyone queues work while the game is frozen.
    for client in &mut clients {
        for _ in 0..rng.random_range(1..=3) {
            client.queue_plan(random_plan(&mut rng));
        }
    }
    host.queue_plan(random_plan(&mut rng));
    pump(&mut host, &mut clients, cli.frames).await?;

    let report = host.requirement_report();
    let converged = clients
        .first()
        .map(|c| c.requirement_report().total == report.total)
        .unwrap_or(true);

    host.toggle_local()?;
    pump(&mut host, &mut clients, cli.frames).await?;

    let toasts: Vec<String> = host
        .drain_notices()
        .iter()
        .map(ToString::to_string)
        .collect();
    let stock = demo_stock();
    let total: serde_json::Map<String, serde_json::Value> = report
        .total
        .iter()
        .map(|(&item, &amount)| (item_label(&catalog, item), json!(amount)))
        .collect();
    let shortfalls: Vec<serde_json::Value> = report
        .shortfalls(&stock)
        .into_iter()
        .map(|s| {
            json!({
                "item": item_label(&catalog, s.item),
                "required": s.required,
                "available": s.available,
            })
        })
        .collect();

    let result = json!({
        "clients": cli.clients,
        "paused": paused,
        "resumed": !host.state().is_paused(),
        "converged": converged,
        "toasts": toasts,
        "total": total,
        "shortfalls": shortfalls,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
