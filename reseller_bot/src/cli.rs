use std::{env, env::VarError};

/// There's no real CLI for the bot, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 16] = [
        "RUST_LOG",
        "RSB_HOST",
        "RSB_PORT",
        "RSB_DATABASE_URL",
        "RSB_TELEGRAM_API_URL",
        "RSB_OPERATOR_ID",
        "RSB_REVIEW_CHAT_ID",
        "RSB_RECHARGE_AMOUNTS",
        "RSB_RECHARGE_SESSION_TTL",
        "RSB_PAYMENT_INSTRUCTIONS",
        "RSB_REFUND_POLICY",
        "RSB_CURRENCY_SYMBOL",
        "RSB_DISPLAY_CURRENCY",
        "RSB_DISPLAY_RATE",
        "RSB_PANEL_URL",
        "RSB_PANEL_TIMEOUT",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
