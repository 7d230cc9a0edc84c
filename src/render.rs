//! TUI rendering traits for staysync types.
//!
//! Extension traits that add colored terminal rendering to staysync-core
//! types using owo_colors.

use owo_colors::OwoColorize;
use staysync_core::matching::Ambiguity;
use staysync_core::stay::{ExistingStay, Stay};
use staysync_core::sync::{SyncPlan, SyncReport};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Stay {
    fn render(&self) -> String {
        let guest = if self.guest.is_empty() {
            "(no guest)".to_string()
        } else {
            self.guest.clone()
        };

        format!(
            "{} {} {} → {} {}",
            "+".green(),
            self.summary.green(),
            format!("{} to {}", self.start, self.end).dimmed(),
            guest,
            format!("({})", self.source_id).dimmed()
        )
    }
}

impl Render for ExistingStay {
    fn render(&self) -> String {
        format!(
            "{} {} {}",
            "✓".green(),
            self.label(),
            format!("{} to {}", self.start, self.end).dimmed()
        )
    }
}

impl Render for Ambiguity {
    fn render(&self) -> String {
        format!(
            "{} {} {}",
            "?".yellow(),
            format!("'{}' vs '{}'", self.stay_summary, self.existing_label).yellow(),
            format!("{} to {}", self.start, self.end).dimmed()
        )
    }
}

/// Simple pluralization helper
fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

impl Render for SyncPlan {
    fn render(&self) -> String {
        let mut lines = vec![
            format!("   Found {} stays in calendar", self.found_in_calendar),
            format!("   Found {} stays in destination", self.found_in_destination),
        ];

        let missing = self.missing();
        if missing.is_empty() {
            lines.push("   No missing stays".dimmed().to_string());
        } else {
            lines.push(format!(
                "   Found {} missing {}",
                missing.len(),
                pluralize("stay", missing.len())
            ));
            lines.extend(missing.iter().map(|s| format!("     {}", s.render())));
        }

        if !self.reconciliation.ambiguities.is_empty() {
            lines.push(String::new());
            lines.push("   Ambiguous matches (check manually):".yellow().to_string());
            lines.extend(
                self.reconciliation
                    .ambiguities
                    .iter()
                    .map(|a| format!("     {}", a.render())),
            );
        }

        lines.join("\n")
    }
}

impl Render for SyncReport {
    fn render(&self) -> String {
        if self.dry_run {
            return format!(
                "Dry run: {} {} would be added",
                self.missing,
                pluralize("stay", self.missing)
            )
            .dimmed()
            .to_string();
        }

        let mut line = format!(
            "Added {} {} ({} new {})",
            self.created,
            pluralize("stay", self.created),
            self.guests_created,
            pluralize("guest", self.guests_created)
        );
        match self.ambiguities.len() {
            0 => {}
            1 => line.push_str(", 1 ambiguity"),
            n => line.push_str(&format!(", {n} ambiguities")),
        }
        line
    }
}
