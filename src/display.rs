//! Text rendering for the console and the one-shot CLI commands.

use std::io::{self, Write};

use pokedex_core::{ProgressEntry, Record, Status};

use crate::views::{ListFilter, ProgressSummary, RecordView};

const STAT_MAX: u32 = 255;
const STAT_BAR_WIDTH: u32 = 20;
const PROGRESS_BAR_WIDTH: u32 = 30;

pub fn separator(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(64))
}

fn bar(filled: u32, width: u32) -> String {
    (0..width)
        .map(|i| if i < filled { '#' } else { '-' })
        .collect()
}

fn status_mark(status: Status) -> &'static str {
    match status {
        Status::Caught => "*",
        Status::Seen => "o",
        Status::Unseen => " ",
    }
}

fn types(type1: &str, type2: Option<&str>) -> String {
    match type2 {
        Some(type2) => format!("{}/{}", type1, type2),
        None => type1.to_string(),
    }
}

/// Full record card: types, status, stat bars, abilities, description.
pub fn write_details(out: &mut impl Write, record: &Record, entry: ProgressEntry) -> io::Result<()> {
    separator(out)?;
    writeln!(out, "  #{:03} - {}", record.id, record.name)?;
    separator(out)?;
    writeln!(out, "  Type: {}", types(&record.type1, record.secondary_type()))?;
    let status = match entry.status() {
        Status::Caught => "* CAUGHT",
        Status::Seen => "o SEEN",
        Status::Unseen => "- UNKNOWN",
    };
    writeln!(out, "  Status: {}", status)?;

    separator(out)?;
    writeln!(out, "  BASE STATS")?;
    for (label, value) in record.stats() {
        let filled = u32::from(value) * STAT_BAR_WIDTH / STAT_MAX;
        writeln!(
            out,
            "  {:<12} {:>3}  {}",
            format!("{}:", label),
            value,
            bar(filled, STAT_BAR_WIDTH)
        )?;
    }

    separator(out)?;
    writeln!(out, "  ABILITIES")?;
    writeln!(out, "  - {}", record.ability1)?;
    if let Some(ability) = record.secondary_ability() {
        writeln!(out, "  - {}", ability)?;
    }

    separator(out)?;
    writeln!(out, "  DESCRIPTION")?;
    writeln!(out, "  {}", record.description)?;
    separator(out)
}

/// One listing line: `[*] #025 Pikachu      Electric`.
pub fn write_summary_line(out: &mut impl Write, view: &RecordView) -> io::Result<()> {
    let entry = ProgressEntry {
        encountered: view.encountered,
        caught: view.caught,
    };
    writeln!(
        out,
        "  [{}] #{:03} {:<12}  {}",
        status_mark(entry.status()),
        view.id,
        view.name,
        types(&view.type1, Some(view.type2.as_str()).filter(|t| !t.is_empty()))
    )
}

pub fn write_listing(out: &mut impl Write, filter: ListFilter, views: &[RecordView]) -> io::Result<()> {
    separator(out)?;
    writeln!(out, "  {}", filter.title())?;
    separator(out)?;
    for view in views {
        write_summary_line(out, view)?;
    }
    separator(out)?;
    writeln!(out, "  Total: {} Pokemon", views.len())?;
    separator(out)
}

pub fn write_statistics(out: &mut impl Write, summary: &ProgressSummary) -> io::Result<()> {
    separator(out)?;
    writeln!(out, "  POKEDEX STATISTICS")?;
    separator(out)?;
    writeln!(
        out,
        "  Pokemon Seen:   {:>3} / {} ({:>5.1}%)",
        summary.total_seen,
        summary.total,
        summary.seen_percent()
    )?;
    writeln!(
        out,
        "  Pokemon Caught: {:>3} / {} ({:>5.1}%)",
        summary.total_caught,
        summary.total,
        summary.caught_percent()
    )?;
    separator(out)?;

    let filled = if summary.total == 0 {
        0
    } else {
        (summary.total_caught as usize * PROGRESS_BAR_WIDTH as usize / summary.total) as u32
    };
    writeln!(
        out,
        "  Overall Progress: [{}]",
        bar(filled, PROGRESS_BAR_WIDTH)
    )?;
    separator(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pikachu() -> Record {
        Record {
            id: 25,
            name: "Pikachu".to_string(),
            type1: "Electric".to_string(),
            type2: String::new(),
            hp: 35,
            attack: 55,
            defense: 40,
            sp_attack: 50,
            sp_defense: 50,
            speed: 90,
            ability1: "Static".to_string(),
            ability2: "Lightning Rod".to_string(),
            description: "It keeps its tail raised to monitor its surroundings.".to_string(),
        }
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_details() {
        let entry = ProgressEntry {
            encountered: true,
            caught: false,
        };
        let text = render(|out| write_details(out, &pikachu(), entry));
        assert!(text.contains("#025 - Pikachu"));
        assert!(text.contains("Type: Electric\n"));
        assert!(text.contains("Status: o SEEN"));
        // 90 * 20 / 255 = 7 filled cells.
        assert!(text.contains("  Speed:        90  #######-------------\n"));
        assert!(text.contains("  - Lightning Rod"));
    }

    #[test]
    fn test_summary_line() {
        let mut view = RecordView::new(&pikachu(), &pokedex_core::ProgressTracker::new(151));
        view.encountered = true;
        view.caught = true;
        view.type2 = "Fairy".to_string();
        let text = render(|out| write_summary_line(out, &view));
        assert_eq!(text, "  [*] #025 Pikachu       Electric/Fairy\n");
    }

    #[test]
    fn test_statistics_bar() {
        let summary = ProgressSummary {
            total_seen: 100,
            total_caught: 76,
            total: 151,
        };
        let text = render(|out| write_statistics(out, &summary));
        assert!(text.contains("Pokemon Seen:   100 / 151 ( 66.2%)"));
        assert!(text.contains("Pokemon Caught:  76 / 151 ( 50.3%)"));
        // 76 * 30 / 151 = 15 filled cells.
        assert!(text.contains(&format!("[{}{}]", "#".repeat(15), "-".repeat(15))));
    }
}
