//! The `pyeongeo cache` commands.

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use pyeongeo_core::cache::{decode_entry, CacheStore};
use pyeongeo_core::model::Tier;

use crate::context::AppContext;
use crate::output::render_sentences;

pub fn list(ctx: &AppContext) -> Result<()> {
    let cache = ctx.cache();
    let entries = cache.load()?;

    if entries.is_empty() {
        println!("Cache is empty ({}).", cache.path().display());
        return Ok(());
    }

    let mut table = Table::new();
    let mut header = vec!["Key"];
    header.extend(Tier::ALL.iter().map(|t| t.label()));
    table.set_header(header);

    for (key, value) in &entries {
        let mut row = vec![Cell::new(key)];
        match decode_entry(key, value) {
            Some(set) => row.extend(Tier::ALL.iter().map(|&t| Cell::new(set.get(t).len()))),
            None => row.extend(Tier::ALL.iter().map(|_| Cell::new("?"))),
        }
        table.add_row(row);
    }

    println!("{table}");
    println!("{} cached set(s) in {}", entries.len(), cache.path().display());
    Ok(())
}

pub fn show(ctx: &AppContext, key: &str) -> Result<()> {
    let cache = ctx.cache();
    let set = cache
        .get(key)?
        .with_context(|| format!("no cache entry for key '{key}'"))?;

    println!("{key}");
    print!("{}", render_sentences(&set));
    Ok(())
}
