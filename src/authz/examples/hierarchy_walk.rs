//! Permission Entry Provider Walkthrough
//!
//! Demonstrates:
//! 1. Seeding an in-memory permission store
//! 2. Building an entry provider and letting it pick a cache strategy
//! 3. Reading the entries effective at a single tree
//! 4. Walking the ancestor chain with a predicate
//! 5. Flushing after a store change

use std::collections::BTreeSet;
use std::sync::Arc;

use canopy_authz::{
    EntryPredicate, EntryProvider, MemoryPermissionStore, PermissionEntry, ProviderConfig, Tree,
};
use canopy_core::{PrivilegeBits, RepoPath};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct DemoTree {
    path: RepoPath,
}

impl Tree for DemoTree {
    fn path(&self) -> &RepoPath {
        &self.path
    }

    fn has_access_control_child(&self) -> bool {
        true
    }
}

struct AllowedFrom {
    start: RepoPath,
}

impl EntryPredicate for AllowedFrom {
    fn starting_path(&self) -> Option<&RepoPath> {
        Some(&self.start)
    }

    fn apply(&self, entry: &PermissionEntry) -> bool {
        entry.allow
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Canopy Permission Entry Provider Example ===\n");

    // Step 1: Seed the store
    println!("Step 1: Seeding the in-memory permission store...");

    let store = Arc::new(MemoryPermissionStore::new());
    let docs = RepoPath::new("/content/site/docs")?;
    let site = RepoPath::new("/content/site")?;
    let root = RepoPath::root();

    store.put_entry("editors", &docs, PrivilegeBits::WRITE, true);
    store.put_entry("editors", &site, PrivilegeBits::READ, true);
    store.put_entry("everyone", &root, PrivilegeBits::READ, true);
    store.put_entry("everyone", &docs, PrivilegeBits::WRITE, false);

    println!("✓ Seeded 2 principals");
    println!("  - editors: write below {}, read below {}", docs, site);
    println!("  - everyone: read everywhere, no write below {}\n", docs);

    // Step 2: Build the provider
    println!("Step 2: Building the entry provider...");

    let principals: BTreeSet<String> =
        ["editors".to_string(), "everyone".to_string()].into();
    let provider = EntryProvider::new(store.clone(), principals, ProviderConfig::default())?;

    println!("✓ Provider ready");
    println!("  - strategy: {}\n", provider.cache_strategy());

    // Step 3: Entries at one tree
    println!("Step 3: Reading entries for {}...", docs);

    let tree = DemoTree { path: docs.clone() };
    for entry in provider.entries_for_tree(&tree)? {
        println!(
            "  - index {}: {} {} at {}",
            entry.index,
            if entry.allow { "allow" } else { "deny" },
            entry.privileges,
            entry.path
        );
    }
    println!();

    // Step 4: Hierarchy walk
    let page = docs.join("guide")?;
    println!("Step 4: Walking allowed entries from {} up to the root...", page);

    let walk = provider.entry_iterator(AllowedFrom {
        start: page.clone(),
    });
    for entry in walk {
        let entry = entry?;
        println!("  - {} grants {}", entry.path, entry.privileges);
    }
    println!();

    // Step 5: Flush after a store change
    println!("Step 5: Flushing after a store change...");

    store.put_entry("editors", &root, PrivilegeBits::READ_ACCESS_CONTROL, true);
    provider.flush()?;

    let at_root = provider.entries_for_tree(&DemoTree { path: root })?;
    println!("✓ Root now carries {} entries\n", at_root.len());

    println!("=== Done ===");
    Ok(())
}
