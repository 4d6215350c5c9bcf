use std::env;
use std::path::Path;

use clap::{Args, Subcommand};
use tokio::process::Command;

use crate::config::{AppConfig, TOKEN_ENV};
use crate::error::{AppError, AppResult};

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Validate and show the settings (token masked).
    Show,
    /// Open the settings file in $VISUAL / $EDITOR, then validate it.
    Edit,
}

pub async fn run(command: ConfigCommand, settings: &Path) -> AppResult<()> {
    match command {
        ConfigCommand::Show => run_show(settings),
        ConfigCommand::Edit => run_edit(settings).await,
    }
}

fn run_show(settings: &Path) -> AppResult<()> {
    let cfg = AppConfig::load(settings)?;

    println!("Settings file: {}", cfg.settings_path.display());
    println!("Server URL: {}", cfg.url);
    println!("Target: {}", cfg.target);
    println!("User: {}", display_value(&cfg.credentials.user));
    println!(
        "Token: {} (override with {TOKEN_ENV})",
        mask_secret(&cfg.credentials.token)
    );
    println!("API version: {}", cfg.api_version);

    println!("Branches:");
    for branch in &cfg.branches {
        println!("  {} [{}..={}]", branch.path, branch.from, branch.to);
    }
    println!("Ignored prefixes:");
    for prefix in &cfg.ignore {
        println!("  {prefix}");
    }
    println!("Modules:");
    for (prefix, module) in cfg.mappings.iter() {
        println!("  {prefix} -> {module}");
    }

    Ok(())
}

async fn run_edit(settings: &Path) -> AppResult<()> {
    let editor = env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string());

    let status = Command::new(&editor).arg(settings).status().await?;
    if !status.success() {
        return Err(AppError::Configuration(format!(
            "editor '{editor}' exited with {status}"
        )));
    }

    AppConfig::load(settings)?;
    println!("Settings in {} are valid.", settings.display());
    Ok(())
}

fn default_editor() -> &'static str {
    if cfg!(windows) { "notepad" } else { "vi" }
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let chars: Vec<char> = token.chars().collect();
            let prefix: String = chars[..3].iter().collect();
            let suffix: String = chars[chars.len() - 3..].iter().collect();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}
