use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("padelyzer-admin")
        .about("Admin session management for the Padelyzer dashboard")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("auth-url")
                .long("auth-url")
                .help("Identity Toolkit base URL")
                .default_value("https://identitytoolkit.googleapis.com")
                .env("PADELYZER_AUTH_URL")
                .global(true),
        )
        .arg(
            Arg::new("firestore-url")
                .long("firestore-url")
                .help("Firestore base URL")
                .default_value("https://firestore.googleapis.com")
                .env("PADELYZER_FIRESTORE_URL")
                .global(true),
        )
        .arg(
            Arg::new("project-id")
                .long("project-id")
                .help("Firebase project holding the users collection")
                .env("PADELYZER_PROJECT_ID")
                .global(true),
        )
        .arg(
            Arg::new("api-key")
                .long("api-key")
                .help("Identity Toolkit web API key")
                .env("PADELYZER_API_KEY")
                .hide_env_values(true)
                .global(true),
        )
        .arg(
            Arg::new("token-cache")
                .long("token-cache")
                .help("Path of the cached bearer token")
                .default_value(".padelyzer-token")
                .env("PADELYZER_TOKEN_CACHE")
                .global(true)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("PADELYZER_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in and verify admin access against a deployment")
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .help("Account email")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .long("password")
                        .help("Account password")
                        .env("PADELYZER_ADMIN_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                ),
        )
        .subcommand(Command::new("logout").about("Clear the cached bearer token"))
}
