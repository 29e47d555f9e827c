use anyhow::Result;
use serde::Serialize;

use reelforge_store::StoreConfig;

use crate::output;

#[derive(Debug, Serialize)]
pub struct InitOut {
    pub movie_id: String,
    pub store_root: String,
}

pub async fn run(store_root: &str, movie_id: &str) -> Result<()> {
    let ctx = StoreConfig::local_dev(store_root).open();
    reelforge_store::initialize_movie_storage(ctx.as_ref(), movie_id, true)?;
    output::print(&InitOut {
        movie_id: movie_id.to_string(),
        store_root: store_root.to_string(),
    })?;
    Ok(())
}
