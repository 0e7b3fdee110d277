//! Rendering of query states and result sets.

use haulboard_core::SearchResult;
use haulboard_search::QueryState;
use owo_colors::OwoColorize;
use std::io::IsTerminal;

fn cell(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let head: String = value.chars().take(width.saturating_sub(1)).collect();
    format!("{head}…")
}

/// Print results as `table`, `json`, or `plain` (one route per line).
pub fn print_results(results: &[SearchResult], format: &str) -> anyhow::Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(results)?);
        }
        "plain" => {
            for result in results {
                println!("{}", result.route());
            }
        }
        _ => print_table(results),
    }

    Ok(())
}

fn print_table(results: &[SearchResult]) {
    if results.is_empty() {
        println!("No matching shippers or truckers");
        return;
    }

    let header = format!(
        "{:<8} {:<8} {:<24} {:<24} {:<12} ROUTE",
        "KIND", "ID", "NAME", "COMPANY", "UNIQUE ID"
    );
    if std::io::stdout().is_terminal() {
        println!("{}", header.bold());
    } else {
        println!("{header}");
    }

    for result in results {
        println!(
            "{:<8} {:<8} {:<24} {:<24} {:<12} {}",
            result.entity_kind.as_str(),
            result.id,
            truncate(&result.display_name, 24),
            truncate(cell(result.secondary_label.as_deref()), 24),
            cell(result.unique_id.as_deref()),
            result.route()
        );
    }
}

/// One-line description of a state transition for interactive mode.
pub fn describe_state(state: &QueryState) -> String {
    let stamp = chrono::Local::now().format("%H:%M:%S%.3f");
    let color = std::io::stdout().is_terminal();

    let detail = match state {
        QueryState::Idle => "idle".to_string(),
        QueryState::Loading => "loading…".to_string(),
        QueryState::Success(results) => {
            let mut line = format!("{} result(s)", results.len());
            for result in results.iter().take(5) {
                line.push_str(&format!(
                    "\n    {} {} ({})",
                    result.entity_kind,
                    result.display_name,
                    result.route()
                ));
            }
            if results.len() > 5 {
                line.push_str(&format!("\n    … {} more", results.len() - 5));
            }
            line
        }
        QueryState::Error(message) => format!("error: {message}"),
    };

    if !color {
        return format!("[{stamp}] {detail}");
    }

    let detail = match state {
        QueryState::Idle => detail.dimmed().to_string(),
        QueryState::Loading => detail.bright_yellow().to_string(),
        QueryState::Success(_) => detail.bright_green().to_string(),
        QueryState::Error(_) => detail.bright_red().bold().to_string(),
    };
    format!("[{}] {detail}", stamp.dimmed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_values() {
        assert_eq!(truncate("Acme", 24), "Acme");
        assert_eq!(truncate("Acme Freight Carriers", 8), "Acme Fr…");
    }

    #[test]
    fn describe_error_includes_message() {
        let line = describe_state(&QueryState::Error("Search endpoint not available".into()));
        assert!(line.contains("Search endpoint not available"));
    }
}
