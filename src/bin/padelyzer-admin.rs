use anyhow::Result;
use padelyzer_admin::cli::{actions, actions::Action, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let (action, globals) = start()?;

    // Handle the action
    match action {
        Action::Login { .. } => actions::login::handle(action, &globals).await?,
        Action::Logout => actions::logout::handle(&globals).await?,
    }

    Ok(())
}
