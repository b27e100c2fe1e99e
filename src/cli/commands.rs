//! CLI command implementations

use anyhow::{Context, Result};
use std::path::Path;

use crate::auth::TokenSigner;
use crate::cli::args::{ConfigCommand, FileCommand, UserCommand};
use crate::config::Settings;
use crate::llm::{SummaryGenerator, SummaryOutcome};
use crate::storage::{Database, FilePatch, FileRecord, User};

/// Run the HTTP server, applying any address overrides
pub async fn serve(settings: &Settings, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut settings = settings.clone();
    if let Some(host) = host {
        settings.server.host = host;
    }
    if let Some(port) = port {
        settings.server.port = port;
    }

    crate::server::serve(&settings).await
}

/// Handle user subcommands
pub fn user_command(settings: &Settings, cmd: UserCommand) -> Result<()> {
    let db = Database::open(settings)?;

    match cmd {
        UserCommand::Add { email, name } => {
            if db.get_user_by_email(&email)?.is_some() {
                anyhow::bail!("User already exists: {}", email);
            }

            let mut user = User::new(&email);
            user.name = name;
            db.insert_user(&user)?;
            println!("User created: {} ({})", user.email, user.id);
        }
        UserCommand::List => {
            let users = db.list_users()?;
            if users.is_empty() {
                println!("No users found");
                return Ok(());
            }

            println!("{:<38} {:<32} {:<12}", "ID", "Email", "Created");
            println!("{}", "-".repeat(84));
            for user in users {
                println!(
                    "{:<38} {:<32} {:<12}",
                    user.id,
                    truncate(&user.email, 30),
                    user.created_at.format("%Y-%m-%d")
                );
            }
        }
    }

    Ok(())
}

/// Handle file subcommands
pub fn file_command(settings: &Settings, cmd: FileCommand) -> Result<()> {
    let db = Database::open(settings)?;

    match cmd {
        FileCommand::Add {
            owner,
            transcript,
            title,
        } => {
            let user = db
                .get_user_by_email(&owner)?
                .with_context(|| format!("User not found: {}", owner))?;

            let text = std::fs::read_to_string(&transcript)
                .with_context(|| format!("Failed to read transcript: {}", transcript.display()))?;

            let title = title.unwrap_or_else(|| default_title(&transcript));
            let mut file = FileRecord::new(&user.id, title);
            file.transcript = Some(text);
            db.insert_file(&file)?;

            println!("File created: {}", file.id);
        }
        FileCommand::Show { id } => {
            let file = db.get_file(&id)?.context("File not found")?;
            print_file(&file);
        }
    }

    Ok(())
}

/// Issue a bearer token for an existing user
pub fn issue_token(settings: &Settings, email: &str) -> Result<()> {
    let db = Database::open(settings)?;
    let user = db
        .get_user_by_email(email)?
        .with_context(|| format!("User not found: {}", email))?;

    let signer = TokenSigner::from_settings(settings)?;
    println!("{}", signer.issue(&user.email)?);

    Ok(())
}

/// Generate and store an AI summary for a file.
pub async fn summarize_file(settings: &Settings, id: &str, fallback: bool) -> Result<()> {
    let db = Database::open(settings)?;

    let file = db.get_file(id)?.context("File not found")?;
    let transcript = file
        .usable_transcript()
        .with_context(|| format!("No transcript available for file {}", file.id))?;

    let generator = SummaryGenerator::from_settings(settings)?;

    let summary = if fallback {
        match generator.generate_untruncated(transcript).await {
            SummaryOutcome::Generated(summary) => summary,
            SummaryOutcome::Failed { reason } => {
                println!("Summary not generated: {}", reason);
                return Ok(());
            }
        }
    } else {
        generator.generate(transcript).await?
    };

    let patch = FilePatch {
        summary: Some(summary.clone()),
        topic: Some(file.topic_or_default()),
    };
    db.update_file(&file.id, &patch)?
        .context("File was removed before the summary could be saved")?;

    println!("Summary saved for {}:", file.id);
    println!();
    println!("{}", summary);

    Ok(())
}

/// Handle config subcommands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let mut shown = settings.clone();
            if !shown.llm.api_key.is_empty() {
                shown.llm.api_key = "<redacted>".to_string();
            }
            if !shown.auth.token_secret.is_empty() {
                shown.auth.token_secret = "<redacted>".to_string();
            }
            let toml = toml::to_string_pretty(&shown)?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

// Helper functions

fn print_file(file: &FileRecord) {
    println!("ID: {}", file.id);
    println!("Title: {}", file.title);
    println!("Owner: {}", file.user_id);
    println!("Updated: {}", file.updated_at.format("%Y-%m-%d %H:%M"));
    if let Some(topic) = file.topic.as_deref() {
        println!("Topic: {}", topic);
    }

    let transcript_chars = file
        .transcript
        .as_deref()
        .map(|t| t.chars().count())
        .unwrap_or(0);
    println!("Transcript: {} characters", transcript_chars);

    println!();
    match file.summary.as_deref() {
        Some(summary) => {
            println!("Summary:");
            println!("{}", summary);
        }
        None => println!("(No summary yet)"),
    }
}

fn default_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
