use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::provider::firebase::{FirebaseAuth, FirestoreRoles};
use crate::session::SessionManager;
use crate::storage::FileTokenCache;
use anyhow::{anyhow, ensure, Result};
use secrecy::ExposeSecret;
use std::sync::Arc;

/// Handle the login action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let Action::Login { email, password } = action else {
        return Err(anyhow!("unexpected action"));
    };

    ensure!(
        !globals.api_key.expose_secret().is_empty(),
        "missing required argument: --api-key"
    );
    ensure!(
        !globals.project_id.is_empty(),
        "missing required argument: --project-id"
    );

    let provider = Arc::new(FirebaseAuth::new(&globals.auth_url, globals.api_key.clone())?);
    let roles = Arc::new(FirestoreRoles::new(
        &globals.firestore_url,
        &globals.project_id,
    )?);
    let cache = Arc::new(FileTokenCache::new(&globals.token_cache));

    let manager = SessionManager::new(provider, roles, cache);

    let session = manager.login(&email, password.expose_secret()).await;

    if let Some(error) = &session.error {
        return Err(anyhow!("{error}"));
    }

    let user = session.authorized_user()?;

    println!("signed in as {} (admin)", user.email);
    println!("token cached at {}", globals.token_cache.display());

    Ok(())
}
