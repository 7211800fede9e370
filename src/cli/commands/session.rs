//! Cached session commands.

use console::style;

use crate::cli::icons::{bullet, success, warn};
use crate::config::Settings;
use crate::session::{guard, Role, RouteDecision, SessionCache, HOME_ROUTE};

/// Show the cached user and where their role lands.
pub async fn cmd_session_show(settings: &Settings) -> anyhow::Result<()> {
    let mut cache = SessionCache::new(settings.session_path());

    match cache.load().await? {
        Some(user) => {
            println!("\n{}", style("Signed in").bold());
            println!("{}", "-".repeat(40));
            println!("  {} Name:      {}", bullet(), user.full_name);
            println!("  {} Email:     {}", bullet(), user.email);
            if let Some(ref phone) = user.phone {
                println!("  {} Phone:     {}", bullet(), phone);
            }
            println!("  {} Role:      {}", bullet(), user.role);
            println!(
                "  {} Since:     {}",
                bullet(),
                user.created_at.format("%Y-%m-%d %H:%M UTC")
            );
            println!(
                "  {} Dashboard: {}",
                bullet(),
                style(user.role.dashboard_route()).cyan()
            );
        }
        None => {
            println!("{} No active session", warn());
            println!("  {} {}", bullet(), style(HOME_ROUTE).dim());
        }
    }
    Ok(())
}

/// Report what the route guard decides for the cached user.
pub async fn cmd_session_access(settings: &Settings, role: Option<&str>) -> anyhow::Result<()> {
    let allowed = role.map(str::parse::<Role>).transpose()?;

    let mut cache = SessionCache::new(settings.session_path());
    let user = cache.load().await?;

    match guard(user, allowed) {
        RouteDecision::Allow => println!("{} Access allowed", success()),
        RouteDecision::Redirect(route) => {
            println!("{} Redirect to {}", warn(), style(route).cyan())
        }
    }
    Ok(())
}

/// Remove the cached session.
pub async fn cmd_session_clear(settings: &Settings) -> anyhow::Result<()> {
    let mut cache = SessionCache::new(settings.session_path());
    cache.clear().await?;
    println!("{} Signed out", success());
    Ok(())
}
