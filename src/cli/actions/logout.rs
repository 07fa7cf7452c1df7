use crate::cli::globals::GlobalArgs;
use crate::storage::{FileTokenCache, TokenCache};
use anyhow::Result;

/// Handle the logout action
pub async fn handle(globals: &GlobalArgs) -> Result<()> {
    FileTokenCache::new(&globals.token_cache).clear().await?;

    println!("cleared cached token at {}", globals.token_cache.display());

    Ok(())
}
