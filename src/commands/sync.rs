use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use staysync_core::config::SyncConfig;
use staysync_core::date_range::LookbackWindow;
use staysync_core::sync::{SyncPlan, SyncReport};

use crate::feed::FeedSource;
use crate::notion::NotionStore;
use crate::render::Render;
use crate::utils::tui;

pub async fn run(config: SyncConfig, dry_run: bool) -> Result<()> {
    config.validate()?;

    let source = FeedSource::new(config.feed_url()?)?;
    let store = NotionStore::new(
        config.notion_token()?,
        config.stays_database_id()?,
        config.guests_database_id()?,
    );
    let window = config.lookback_days.map(LookbackWindow::ending_today);
    let policy = config.match_policy.policy();

    let scope = match &window {
        Some(w) => format!("since {}", w.from),
        None => "whole calendar".to_string(),
    };
    println!(
        "🏠 Stays {}",
        format!("({}, {} matching)", scope, config.match_policy).dimmed()
    );

    let plan = tui::while_spinning(
        "Fetching calendar and Notion",
        SyncPlan::build(&source, &store, window.as_ref(), policy.as_ref()),
    )
    .await
    .context("Could not compute missing stays")?;
    println!("{}", plan.render());

    if dry_run {
        println!("\n{}", plan.dry_run_report().render());
        return Ok(());
    }

    let report = match plan.apply(&store).await {
        Ok(report) => report,
        Err(failure) => {
            print_created(&failure.report);
            return Err(failure.source).context(format!(
                "Sync stopped after adding {} of {} stays",
                failure.report.created, failure.report.missing
            ));
        }
    };

    print_created(&report);
    println!("\n{}", report.render());

    Ok(())
}

fn print_created(report: &SyncReport) {
    if report.created_records.is_empty() {
        return;
    }

    println!();
    for record in &report.created_records {
        println!("   {}", record.render());
    }
}
