use std::io::IsTerminal;

use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::rating::ItemSet;
use crate::scoring::EPSILON;

/// Placeholder shown for items without a name
pub const UNNAMED: &str = "(ワイン名)";

/// Scores are always shown with exactly two decimals
pub fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}

/// How far a set's total is from its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Balance {
    Exact,
    Under(f64),
    Over(f64),
}

impl Balance {
    pub fn of(set: &ItemSet) -> Self {
        let diff = set.target_sum() - set.total();
        if diff.abs() < EPSILON {
            Balance::Exact
        } else if diff > 0.0 {
            Balance::Under(diff)
        } else {
            Balance::Over(-diff)
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Balance::Exact)
    }
}

/// One-line status for a set, e.g. "あと0.50点で10.00点になります"
pub fn status_message(set: &ItemSet) -> String {
    let target = format_score(set.target_sum());
    match Balance::of(set) {
        Balance::Exact => format!("完璧！合計が{}点です", target),
        Balance::Under(diff) => format!("あと{}点で{}点になります", format_score(diff), target),
        Balance::Over(diff) => format!("{}点オーバーしています", format_score(diff)),
    }
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
pub fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format one set as a numbered list followed by its total and status.
///
/// ```text
/// 白 (set1)
///  1.  3.50  Chablis
///  2.  3.25  Sancerre
/// ...
/// 合計 10.00  完璧！合計が10.00点です
/// ```
pub fn format_set(set: &ItemSet, title: &str, use_colors: bool) -> String {
    let mode = if set.is_manual() { "手動" } else { "自動" };
    let heading = format!("{} ({}) [{}]", title, set.set_id(), mode);

    // Index column: 3 chars + 1 space, score column: 6 chars + 2 spaces
    let fixed_width = 4 + 6 + 2;
    let term_width = get_terminal_width();

    let mut lines = Vec::with_capacity(set.len() + 2);
    lines.push(if use_colors {
        heading.bold().to_string()
    } else {
        heading
    });

    for (idx, item) in set.items().iter().enumerate() {
        let index_str = format!("{:>2}.", idx + 1);
        let score_str = format!("{:>6}", format_score(item.score));
        let raw_name = if item.is_active() {
            item.name.as_str()
        } else {
            UNNAMED
        };
        let name = match term_width {
            Some(width) if width > fixed_width + 10 => truncate_name(raw_name, width - fixed_width),
            Some(_) => truncate_name(raw_name, 20),
            None => raw_name.to_string(),
        };

        if use_colors {
            let name = if item.is_active() {
                name
            } else {
                name.dimmed().to_string()
            };
            lines.push(format!(
                "{} {}  {}",
                index_str.dimmed(),
                score_str.bold(),
                name
            ));
        } else {
            lines.push(format!("{} {}  {}", index_str, score_str, name));
        }
    }

    let balance = Balance::of(set);
    let total = format!("合計 {}", format_score(set.total()));
    let status = status_message(set);
    lines.push(if use_colors {
        if balance.is_exact() {
            format!("{}  {}", total.bold(), status.green())
        } else {
            format!("{}  {}", total.bold(), status.red())
        }
    } else {
        format!("{}  {}", total, status)
    });

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::SetId;
    use crate::scoring::{ItemLimits, ScoringConfig};

    fn sample_set(names: &[&str]) -> ItemSet {
        let limits = ItemLimits {
            min_items: 3,
            max_items: 6,
        };
        let mut set = ItemSet::new(SetId::new("set1"), limits, ScoringConfig::default());
        let first = set.items()[0].id;
        set.bulk_assign_names(first, names);
        set
    }

    #[test]
    fn test_format_score_two_decimals() {
        assert_eq!(format_score(0.0), "0.00");
        assert_eq!(format_score(3.5), "3.50");
        assert_eq!(format_score(10.0), "10.00");
        assert_eq!(format_score(0.25), "0.25");
    }

    #[test]
    fn test_status_exact() {
        let set = sample_set(&["A", "B"]);
        assert_eq!(status_message(&set), "完璧！合計が10.00点です");
    }

    #[test]
    fn test_status_under() {
        let mut set = sample_set(&["A", "B"]);
        let first = set.items()[0].id;
        set.nudge_score(first, -0.5);
        assert_eq!(Balance::of(&set), Balance::Under(0.5));
        assert_eq!(status_message(&set), "あと0.50点で10.00点になります");
    }

    #[test]
    fn test_status_over() {
        let mut set = sample_set(&["A", "B"]);
        let first = set.items()[0].id;
        set.nudge_score(first, 0.75);
        assert_eq!(status_message(&set), "0.75点オーバーしています");
    }

    #[test]
    fn test_status_empty_set() {
        let set = sample_set(&[]);
        assert_eq!(status_message(&set), "あと10.00点で10.00点になります");
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Short", 20), "Short");
        assert_eq!(truncate_name("Exact", 5), "Exact");
        assert_eq!(truncate_name("Châteauneuf-du-Pape", 10), "Château...");
        assert_eq!(truncate_name("Hello world", 3), "Hel");
    }

    #[test]
    fn test_format_set_plain() {
        let set = sample_set(&["Chablis", "Soave", "Gavi"]);
        let text = format_set(&set, "白", false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "白 (set1) [自動]");
        assert!(lines[1].starts_with(" 1.   3.50  Chablis"));
        assert!(lines[3].contains("Gavi"));
        assert_eq!(lines[4], "合計 10.00  完璧！合計が10.00点です");
    }

    #[test]
    fn test_format_set_shows_placeholder_and_mode() {
        let mut set = sample_set(&["Chablis"]);
        let first = set.items()[0].id;
        set.nudge_score(first, 0.0);
        let text = format_set(&set, "白", false);
        assert!(text.contains("[手動]"));
        assert!(text.contains(UNNAMED));
    }
}
