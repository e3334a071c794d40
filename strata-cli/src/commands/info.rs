//! Info command - show page geometry and a sample chain.

use anyhow::{Context, Result};
use serde_json::json;
use strata_core::arena::{Arena, ArenaConfig, MAX_ALIGN, NODE_HEADER_SIZE};

/// Sample allocations used to build the demonstration chain, in bytes.
const SAMPLE: &[usize] = &[24, 3000, 3000, 100, 20_000];

/// Run the info command.
pub fn run(config: &ArenaConfig, json: bool) -> Result<()> {
    let mut arena = Arena::with_config(config).context("Failed to create arena")?;
    let page_size = arena.page_size();
    let node_capacity = arena
        .head()
        .map(|node| node.capacity())
        .context("Arena has no head node")?;

    for size in SAMPLE {
        arena
            .allocate(*size)
            .with_context(|| format!("Failed to allocate {size} sample bytes"))?;
    }
    arena.verify().context("Sample chain failed verification")?;
    let stats = arena.stats();

    if json {
        let nodes: Vec<_> = arena
            .nodes()
            .map(|(id, node)| {
                json!({
                    "node": id,
                    "capacity": node.capacity(),
                    "offset": node.current_offset(),
                    "block_len": node.block_len(),
                })
            })
            .collect();
        let out = json!({
            "config": config,
            "page_size": page_size,
            "header_size": NODE_HEADER_SIZE,
            "node_capacity": node_capacity,
            "max_align": MAX_ALIGN,
            "sample": SAMPLE,
            "stats": stats,
            "nodes": nodes,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Arena Geometry");
    println!("==============");
    println!("Backing:        {}", config.backing);
    println!("Page size:      {} bytes", page_size);
    println!("Header size:    {} bytes", NODE_HEADER_SIZE);
    println!("Node capacity:  {} bytes", node_capacity);
    println!("Max alignment:  {} bytes", MAX_ALIGN);
    if let Some(limit) = config.max_bytes {
        println!("Budget:         {} bytes", limit);
    }
    println!();

    println!("Sample Chain ({:?})", SAMPLE);
    println!("============");
    for (id, node) in arena.nodes() {
        let marker = if arena.cursor() == Some(id) { "*" } else { " " };
        println!(
            "{} {:<8} {:>6} / {:<6} bytes  (block {} bytes)",
            marker,
            id.to_string(),
            node.current_offset(),
            node.capacity(),
            node.block_len()
        );
    }
    println!();
    println!("{stats}");

    Ok(())
}
