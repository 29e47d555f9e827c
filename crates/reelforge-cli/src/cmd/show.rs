use anyhow::Result;

use reelforge_store::{ManifestService, StoreConfig, StoreError};

use crate::output;

pub async fn run(store_root: &str, movie_id: &str) -> Result<()> {
    let ctx = StoreConfig::local_dev(store_root).open();
    let service = ManifestService::new(ctx);
    match service.load_current(movie_id) {
        Ok(loaded) => {
            output::print(&loaded.manifest)?;
            Ok(())
        }
        Err(StoreError::ManifestNotFound(_)) => {
            output::eprintln_line(&format!("no manifest yet for movie '{movie_id}'"));
            Ok(())
        }
        Err(other) => Err(other.into()),
    }
}
