use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{anyhow, Result};
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let mut globals = GlobalArgs::new(
        matches
            .get_one("auth-url")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow!("missing required argument: --auth-url"))?,
        matches
            .get_one("firestore-url")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow!("missing required argument: --firestore-url"))?,
    );

    globals.project_id = matches
        .get_one("project-id")
        .map(|s: &String| s.to_string())
        .unwrap_or_default();

    globals.set_api_key(SecretString::from(
        matches
            .get_one("api-key")
            .map(|s: &String| s.to_string())
            .unwrap_or_default(),
    ));

    globals.token_cache = matches
        .get_one::<std::path::PathBuf>("token-cache")
        .cloned()
        .ok_or_else(|| anyhow!("missing required argument: --token-cache"))?;

    let action = match matches.subcommand() {
        Some(("login", sub)) => Action::Login {
            email: sub
                .get_one("email")
                .map(|s: &String| s.to_string())
                .ok_or_else(|| anyhow!("missing required argument: --email"))?,
            password: SecretString::from(
                sub.get_one("password")
                    .map(|s: &String| s.to_string())
                    .ok_or_else(|| anyhow!("missing required argument: --password"))?,
            ),
        },
        Some(("logout", _)) => Action::Logout,
        _ => return Err(anyhow!("missing subcommand, try --help")),
    };

    Ok((action, globals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn test_dispatch_login() {
        let matches = commands::new().get_matches_from(vec![
            "padelyzer-admin",
            "--project-id",
            "padelyzer-prod",
            "--api-key",
            "web-api-key",
            "login",
            "--email",
            "admin@padelyzer.mx",
            "--password",
            "hunter2",
        ]);

        let (action, globals) = handler(&matches).unwrap();

        assert_eq!(globals.project_id, "padelyzer-prod");
        assert_eq!(globals.api_key.expose_secret(), "web-api-key");
        assert_eq!(
            globals.token_cache,
            std::path::PathBuf::from(".padelyzer-token")
        );

        match action {
            Action::Login { email, password } => {
                assert_eq!(email, "admin@padelyzer.mx");
                assert_eq!(password.expose_secret(), "hunter2");
            }
            Action::Logout => panic!("expected login action"),
        }
    }

    #[test]
    fn test_dispatch_logout() {
        let matches = commands::new().get_matches_from(vec!["padelyzer-admin", "logout"]);

        let (action, globals) = handler(&matches).unwrap();

        assert!(matches!(action, Action::Logout));
        assert_eq!(globals.auth_url, "https://identitytoolkit.googleapis.com");
        assert_eq!(globals.firestore_url, "https://firestore.googleapis.com");
    }
}
