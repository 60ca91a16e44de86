//! Human-readable formatting of win probabilities and battle summaries.
//!
//! Shared by the HTTP API and the `risk-chart` binary.

use std::fmt::Write;

use crate::distribution::OutcomeDistribution;
use crate::error::Result;
use crate::win_grid::BattleWinGrid;

/// Compact heatmap cell: `">.99"`, `"<.01"`, or two decimals.
pub fn format_grid_cell(p: f64) -> String {
    if p >= 0.995 {
        ">.99".to_string()
    } else if p < 0.005 {
        "<.01".to_string()
    } else {
        format!("{p:.2}")
    }
}

/// Percentage with two decimals, saturating at `>99.99%` / `<0.01%`.
pub fn format_percentage(p: f64) -> String {
    if p > 0.99995 {
        ">99.99%".to_string()
    } else if p < 0.00005 {
        "<0.01%".to_string()
    } else {
        format!("{:.2}%", p * 100.0)
    }
}

fn armies(n: u32, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {plural}")
    }
}

/// `"Chance of 3 attackers defeating 1 defender: 91.64%"`
pub fn describe_win_probability(attackers: u32, defenders: u32, p: f64) -> String {
    format!(
        "Chance of {} defeating {}: {}",
        armies(attackers, "attacker", "attackers"),
        armies(defenders, "defender", "defenders"),
        format_percentage(p)
    )
}

/// Multi-line summary of who wins and with how much left.
pub fn summarize_distribution(dist: &OutcomeDistribution) -> String {
    let mut out = format!(
        "Starting with {} vs {}:\n",
        armies(dist.start.attackers, "attacker", "attackers"),
        armies(dist.start.defenders, "defender", "defenders"),
    );

    let _ = write!(
        out,
        "Attacker victory: {:.2}%",
        dist.attacker_win_probability() * 100.0
    );
    if let Some(mean) = dist.expected_attackers_if_win() {
        let _ = write!(out, " (avg {mean:.1} armies remaining)");
    }
    let _ = write!(
        out,
        "\nDefender victory: {:.2}%",
        dist.defender_win_probability() * 100.0
    );
    if let Some(mean) = dist.expected_defenders_if_win() {
        let _ = write!(out, " (avg {mean:.1} armies remaining)");
    }
    out
}

/// Text heatmap of attackers `1..=size` (rows, largest on top) by defenders
/// `1..=size` (columns).
pub fn render_heatmap(grid: &BattleWinGrid, size: u32) -> Result<String> {
    let rows = grid.to_rows(size)?;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "P(attacker wins), {}-sided dice. Rows: attackers, columns: defenders.",
        grid.face_count()
    );
    for (a, row) in rows.iter().enumerate().rev() {
        let _ = write!(out, "{:>4} |", a + 1);
        for &p in row {
            let _ = write!(out, " {:>4}", format_grid_cell(p));
        }
        out.push('\n');
    }
    let _ = write!(out, "     +");
    for _ in 0..size {
        out.push_str("-----");
    }
    out.push_str("\n      ");
    for d in 1..=size {
        let _ = write!(out, " {d:>4}");
    }
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::compute_battle_outcome_distribution;
    use crate::round_table::build_round_probability_table;
    use crate::win_grid::build_battle_win_grid;

    #[test]
    fn test_format_grid_cell() {
        assert_eq!(format_grid_cell(0.999), ">.99");
        assert_eq!(format_grid_cell(0.995), ">.99");
        assert_eq!(format_grid_cell(0.001), "<.01");
        assert_eq!(format_grid_cell(15.0 / 36.0), "0.42");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(1.0), ">99.99%");
        assert_eq!(format_percentage(0.0), "<0.01%");
        assert_eq!(format_percentage(15.0 / 36.0), "41.67%");
        assert_eq!(format_percentage(0.375), "37.50%");
    }

    #[test]
    fn test_describe_win_probability_plurals() {
        assert_eq!(
            describe_win_probability(1, 1, 0.375),
            "Chance of 1 attacker defeating 1 defender: 37.50%"
        );
        assert_eq!(
            describe_win_probability(3, 2, 0.5),
            "Chance of 3 attackers defeating 2 defenders: 50.00%"
        );
    }

    #[test]
    fn test_summary_text() {
        let table = build_round_probability_table(6).unwrap();
        let dist = compute_battle_outcome_distribution(&table, 1, 1).unwrap();
        assert_eq!(
            summarize_distribution(&dist),
            "Starting with 1 attacker vs 1 defender:\n\
             Attacker victory: 41.67% (avg 1.0 armies remaining)\n\
             Defender victory: 58.33% (avg 1.0 armies remaining)"
        );

        let dist = compute_battle_outcome_distribution(&table, 2, 0).unwrap();
        let text = summarize_distribution(&dist);
        assert!(text.ends_with("Defender victory: 0.00%"), "{text}");
    }

    #[test]
    fn test_heatmap_layout() {
        let table = build_round_probability_table(6).unwrap();
        let grid = build_battle_win_grid(&table, 5).unwrap();
        let text = render_heatmap(&grid, 3).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[1].starts_with("   3 |"));
        assert!(lines[3].starts_with("   1 |"));
        assert!(lines[3].contains("0.42"));
        assert!(render_heatmap(&grid, 6).is_err());
    }
}
