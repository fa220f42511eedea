//! Usage statistics commands.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Display the fleet dashboard: counters across active chatbots.
pub async fn global_stats(state: &AppState, json: bool) -> Result<()> {
    let stats = state.chatbot_service.global_stats().await?;

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "api_base_url": state.config.api_base_url,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} FormChat v{}",
        style("⚡").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Chatbots ──").dim());
    println!("  Total:    {}", style(stats.total_chatbots).bold());
    println!("  Active:   {}", style(stats.active_chatbots).green());
    let inactive = stats.total_chatbots - stats.active_chatbots;
    if inactive > 0 {
        println!("  Inactive: {}", style(inactive).yellow());
    }
    println!();

    println!("  {}", style("── Usage (active chatbots) ──").dim());
    println!("  Views:         {}", stats.total_views);
    println!("  Conversations: {}", stats.total_conversations);
    println!("  Completed:     {}", stats.completed_conversations);
    println!(
        "  Engagement:    {}",
        style(format!("{:.1}%", stats.engagement_rate)).cyan()
    );
    println!();

    println!("  {}", style("── Server ──").dim());
    println!("  API base: {}", state.config.api_base_url);
    println!("  Data:     {}", style(state.data_dir.display()).dim());
    println!();

    Ok(())
}

/// Display counters for one chatbot.
pub async fn chatbot_stats(state: &AppState, id: &str, json: bool) -> Result<()> {
    let stats = state.chatbot_service.stats(id).await?;

    if json {
        let out = serde_json::json!({
            "chatbot_id": id,
            "stats": stats,
            "completion_rate": stats.completion_rate(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {} Usage for {}", style("📊").bold(), style(id).cyan());
    println!();
    println!("  Views:         {}", stats.total_views);
    println!("  Conversations: {}", stats.total_conversations);
    println!(
        "  Completed:     {} ({:.2}%)",
        stats.completed_conversations,
        stats.completion_rate()
    );
    println!();
    Ok(())
}
