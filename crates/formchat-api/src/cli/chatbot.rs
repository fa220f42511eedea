//! Chatbot lifecycle CLI commands: create, list, show, embed, update, delete.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};

use formchat_types::chatbot::{
    Chatbot, CreateChatbotRequest, Customization, EmbedType, UpdateChatbotRequest,
};
use formchat_types::embed::EmbedArtifact;

use crate::cli::{CustomizationArgs, EmbedKind};
use crate::state::AppState;

/// Overlay the flags that were given onto `base`.
pub fn apply_customization(mut base: Customization, args: &CustomizationArgs) -> Customization {
    if let Some(v) = &args.primary_color {
        base.primary_color = v.clone();
    }
    if let Some(v) = &args.secondary_color {
        base.secondary_color = v.clone();
    }
    if let Some(v) = &args.bot_name {
        base.bot_name = v.clone();
    }
    if let Some(v) = &args.welcome {
        base.welcome_message = v.clone();
    }
    if let Some(v) = &args.position {
        base.position = v.clone();
    }
    if let Some(v) = &args.size {
        base.size = v.clone();
    }
    base
}

fn parse_embed_type(raw: Option<String>) -> Result<Option<EmbedType>> {
    raw.map(|s| s.parse::<EmbedType>().map_err(|e| anyhow::anyhow!(e)))
        .transpose()
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Create a chatbot via interactive prompts or one-shot flags.
///
/// # Examples
///
/// ```bash
/// # Interactive
/// fchat create
///
/// # One-shot with flags
/// fchat create --name "Contact us" --form-url https://forms.gle/abc --position bottom-left
/// ```
pub async fn create_chatbot(
    state: &AppState,
    name: Option<String>,
    form_url: Option<String>,
    embed_type: Option<String>,
    customization: CustomizationArgs,
    json: bool,
) -> Result<()> {
    let name = match name {
        Some(n) => n,
        None => Input::<String>::new()
            .with_prompt("Chatbot name")
            .interact_text()?,
    };

    let google_form_url = match form_url {
        Some(u) => u,
        None => Input::<String>::new()
            .with_prompt("Google Form URL")
            .interact_text()?,
    };

    let request = CreateChatbotRequest {
        name,
        google_form_url,
        customization: Some(apply_customization(Customization::default(), &customization)),
        embed_type: parse_embed_type(embed_type)?,
    };

    let progress = spinner("Creating chatbot...");
    let result = state.chatbot_service.create(request).await;
    progress.finish_and_clear();
    let (chatbot, artifact) = result?;

    if json {
        let out = serde_json::json!({ "chatbot": chatbot, "embed_code": artifact });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {} Chatbot created successfully!", style("✓").green().bold());
    println!();
    print_summary(&chatbot);
    println!();
    print_artifact(&artifact, EmbedKind::Both);
    Ok(())
}

/// List chatbots in a colored table.
pub async fn list_chatbots(
    state: &AppState,
    page: u32,
    per_page: Option<u32>,
    active: Option<bool>,
    json: bool,
) -> Result<()> {
    let per_page = per_page.unwrap_or(state.config.default_page_size);
    let listing = state.chatbot_service.list(page, per_page, active).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if listing.chatbots.is_empty() {
        println!();
        println!(
            "  {} No chatbots found. Create one with: {}",
            style("i").blue().bold(),
            style("fchat create").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("ID").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Embed").fg(Color::White),
        Cell::new("Views").fg(Color::White),
        Cell::new("Completed").fg(Color::White),
        Cell::new("Created").fg(Color::White),
    ]);

    for bot in &listing.chatbots {
        let status_cell = if bot.config.is_active {
            Cell::new("● active").fg(Color::Green)
        } else {
            Cell::new("○ inactive").fg(Color::Yellow)
        };

        table.add_row(vec![
            Cell::new(truncate(&bot.config.name, 32)).fg(Color::Cyan),
            Cell::new(bot.chatbot_id()).fg(Color::White),
            status_cell,
            Cell::new(bot.config.embed_type.to_string()),
            Cell::new(bot.stats.total_views),
            Cell::new(bot.stats.completed_conversations),
            Cell::new(bot.created_at.format("%Y-%m-%d").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!(
        "  {}",
        style(format!(
            "Page {} of {} ({} total)",
            listing.page,
            listing.total_pages.max(1),
            listing.total
        ))
        .dim()
    );
    println!();
    Ok(())
}

/// Show one chatbot's configuration and counters.
pub async fn show_chatbot(state: &AppState, id: &str, json: bool) -> Result<()> {
    let chatbot = state.chatbot_service.get(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&chatbot)?);
        return Ok(());
    }

    let c = &chatbot.config.customization;
    println!();
    print_summary(&chatbot);
    println!();
    println!("  {}", style("── Customization ──").dim());
    println!("  Bot name:   {}", c.bot_name);
    println!("  Welcome:    {}", c.welcome_message);
    println!("  Colors:     {} / {}", c.primary_color, c.secondary_color);
    println!("  Position:   {}", c.position);
    println!("  Size:       {}", c.size);
    println!();
    println!("  {}", style("── Usage ──").dim());
    println!("  Views:         {}", chatbot.stats.total_views);
    println!("  Conversations: {}", chatbot.stats.total_conversations);
    println!(
        "  Completed:     {} ({:.2}%)",
        chatbot.stats.completed_conversations,
        chatbot.stats.completion_rate()
    );
    println!();
    Ok(())
}

/// Print the embed code of a chatbot.
pub async fn print_embed(state: &AppState, id: &str, kind: EmbedKind, json: bool) -> Result<()> {
    let artifact = state.chatbot_service.embed(id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&artifact)?);
        return Ok(());
    }

    print_artifact(&artifact, kind);
    Ok(())
}

/// Apply a partial update from flags.
#[allow(clippy::too_many_arguments)]
pub async fn update_chatbot(
    state: &AppState,
    id: &str,
    name: Option<String>,
    form_url: Option<String>,
    embed_type: Option<String>,
    active: Option<bool>,
    customization: CustomizationArgs,
    json: bool,
) -> Result<()> {
    let customization = if customization.is_empty() {
        None
    } else {
        let current = state.chatbot_service.get(id).await?;
        Some(apply_customization(
            current.config.customization,
            &customization,
        ))
    };

    let request = UpdateChatbotRequest {
        name,
        google_form_url: form_url,
        customization,
        embed_type: parse_embed_type(embed_type)?,
        is_active: active,
    };

    let (chatbot, artifact) = state.chatbot_service.update(id, request).await?;

    if json {
        let out = serde_json::json!({ "chatbot": chatbot, "embed_code": artifact });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {} Chatbot updated.", style("✓").green().bold());
    println!();
    print_summary(&chatbot);
    println!();
    Ok(())
}

/// Delete a chatbot, confirming first unless `force` is set.
pub async fn delete_chatbot(state: &AppState, id: &str, force: bool, json: bool) -> Result<()> {
    let chatbot = state.chatbot_service.get(id).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete chatbot '{}' and all its usage counters?",
                chatbot.config.name
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.chatbot_service.delete(id).await?;

    if json {
        let out = serde_json::json!({ "deleted": true, "chatbot_id": id });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "  {} Deleted chatbot '{}'.",
            style("✓").green().bold(),
            style(&chatbot.config.name).cyan()
        );
    }
    Ok(())
}

fn print_summary(chatbot: &Chatbot) {
    let status = if chatbot.config.is_active {
        style("active").green().to_string()
    } else {
        style("inactive").yellow().to_string()
    };
    println!("  {}  {}", style("Name:").bold(), style(&chatbot.config.name).cyan());
    println!("  {}  {}", style("ID:").bold(), chatbot.chatbot_id());
    println!("  {}  {}", style("Form:").bold(), chatbot.config.google_form_url);
    println!("  {}  {}", style("Embed:").bold(), chatbot.config.embed_type);
    println!("  {}  {}", style("Status:").bold(), status);
}

fn print_artifact(artifact: &EmbedArtifact, kind: EmbedKind) {
    if matches!(kind, EmbedKind::Popup | EmbedKind::Both) {
        println!("  {}", style("── Popup (paste before </body>) ──").dim());
        println!("{}", artifact.popup);
        println!();
    }
    if matches!(kind, EmbedKind::Iframe | EmbedKind::Both) {
        println!("  {}", style("── Inline iframe ──").dim());
        println!("{}", artifact.iframe);
        println!();
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_customization_only_overrides_given_flags() {
        let args = CustomizationArgs {
            position: Some("bottom-left".to_string()),
            bot_name: Some("Ava".to_string()),
            ..Default::default()
        };
        let merged = apply_customization(Customization::default(), &args);
        assert_eq!(merged.position, "bottom-left");
        assert_eq!(merged.bot_name, "Ava");
        assert_eq!(merged.primary_color, Customization::default().primary_color);
    }

    #[test]
    fn test_parse_embed_type() {
        assert_eq!(parse_embed_type(None).unwrap(), None);
        assert_eq!(
            parse_embed_type(Some("iframe".to_string())).unwrap(),
            Some(EmbedType::Iframe)
        );
        assert!(parse_embed_type(Some("banner".to_string())).is_err());
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééééééééé", 6), "ééé...");
    }

    #[tokio::test]
    async fn test_forced_delete_removes_chatbot() {
        let tmp = tempfile::TempDir::new().unwrap();
        let state = AppState::init_at(tmp.path()).await.unwrap();
        let (bot, _) = state
            .chatbot_service
            .create(CreateChatbotRequest {
                name: "Temp".to_string(),
                google_form_url: "https://forms.gle/tmp".to_string(),
                customization: None,
                embed_type: None,
            })
            .await
            .unwrap();

        delete_chatbot(&state, bot.chatbot_id(), true, true)
            .await
            .unwrap();
        assert!(state.chatbot_service.get(bot.chatbot_id()).await.is_err());
    }
}
