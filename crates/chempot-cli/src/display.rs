use chempot::analysis::ChemicalPotentials;
use chempot::core::hull::PhaseDiagram;
use chempot::reservoirs::Table;
use std::io::{self, Write};

const INDENT: &str = "  ";

/// Renders a box-drawn table; numeric-looking cells are right-aligned.
pub fn box_table(title: &str, headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .chain([header.chars().count()])
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}{}\n", INDENT, left, segments.join(mid), right)
    };
    let row_line = |cells: &[String]| {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(col, w)| {
                let cell = cells.get(col).map(String::as_str).unwrap_or("");
                if is_numeric(cell) {
                    format!(" {:>w$} ", cell, w = *w)
                } else {
                    format!(" {:<w$} ", cell, w = *w)
                }
            })
            .collect();
        format!("{}│{}│\n", INDENT, padded.join("│"))
    };

    let mut out = format!("{}┌─ {} ─┐\n", INDENT, title);
    out.push_str(&line("┌", "┬", "┐"));
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    out.push_str(&row_line(&header_cells));
    out.push_str(&line("├", "┼", "┤"));
    for row in rows {
        out.push_str(&row_line(row));
    }
    out.push_str(&line("└", "┴", "┘"));
    out
}

fn is_numeric(cell: &str) -> bool {
    !cell.is_empty() && cell.parse::<f64>().is_ok()
}

fn emit(text: &str) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let _ = writeln!(out, "{}", text);
}

pub fn hull_rows(pd: &PhaseDiagram, stable_only: bool) -> Vec<Vec<String>> {
    pd.entries_with_stability()
        .filter(|(_, stable)| *stable || !stable_only)
        .map(|(entry, stable)| {
            let formation = pd
                .formation_energy_per_atom(entry)
                .map(|e| format!("{:.4}", e))
                .unwrap_or_else(|_| "-".to_string());
            let above = pd
                .energy_above_hull(entry)
                .map(|e| format!("{:.4}", e))
                .unwrap_or_else(|_| "-".to_string());
            vec![
                entry.name.clone(),
                entry.composition.reduced_formula(),
                formation,
                above,
                if stable { "✓" } else { "" }.to_string(),
            ]
        })
        .collect()
}

pub fn print_hull(pd: &PhaseDiagram, stable_only: bool) {
    let elements: Vec<&str> = pd.elements().iter().map(|e| e.symbol()).collect();
    let title = format!(
        "Phase Diagram {} ({} entries)",
        elements.join("-"),
        pd.all_entries().len()
    );
    emit(&box_table(
        &title,
        &["Name", "Formula", "E_f (eV/atom)", "E_hull (eV/atom)", "Stable"],
        &hull_rows(pd, stable_only),
    ));
}

pub fn chempot_rows(chempots: &ChemicalPotentials) -> Vec<Vec<String>> {
    chempots
        .iter()
        .map(|(element, mu)| vec![element.symbol().to_string(), format!("{:.4}", mu)])
        .collect()
}

pub fn print_chempots(title: &str, chempots: &ChemicalPotentials) {
    emit(&box_table(title, &["Element", "μ (eV)"], &chempot_rows(chempots)));
}

pub fn print_table(title: &str, table: &Table) {
    emit(&format!("{}{}\n{}", INDENT, title, table));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chempot::core::models::PdEntry;

    fn diagram() -> PhaseDiagram {
        PhaseDiagram::new(vec![
            PdEntry::new("Na".parse().unwrap(), -1.0),
            PdEntry::new("O2".parse().unwrap(), -10.0),
            PdEntry::new("Na2O".parse().unwrap(), -10.0),
            PdEntry::new("NaO".parse().unwrap(), -5.0),
        ])
        .unwrap()
    }

    #[test]
    fn box_table_aligns_cells() {
        let rendered = box_table(
            "Demo",
            &["Element", "μ (eV)"],
            &[
                vec!["Na".to_string(), "-1.5000".to_string()],
                vec!["O".to_string(), "0.0000".to_string()],
            ],
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "  ┌─ Demo ─┐");
        assert_eq!(lines[1], "  ┌─────────┬─────────┐");
        assert_eq!(lines[2], "  │ Element │ μ (eV)  │");
        assert_eq!(lines[4], "  │ Na      │ -1.5000 │");
        assert_eq!(lines[5], "  │ O       │  0.0000 │");
        assert_eq!(lines[6], "  └─────────┴─────────┘");
    }

    #[test]
    fn hull_rows_mark_stability() {
        let rows = hull_rows(&diagram(), false);
        assert_eq!(rows.len(), 4);
        let na2o = rows.iter().find(|r| r[0] == "Na2O").unwrap();
        assert_eq!(na2o[2], "-1.0000");
        assert_eq!(na2o[3], "0.0000");
        assert_eq!(na2o[4], "✓");
        let nao = rows.iter().find(|r| r[0] == "NaO").unwrap();
        assert_eq!(nao[4], "");

        let stable = hull_rows(&diagram(), true);
        assert_eq!(stable.len(), 3);
    }

    #[test]
    fn chempot_rows_are_alphabetical() {
        let chempots: ChemicalPotentials = [("O", -1.0), ("Na", -0.5)]
            .iter()
            .map(|(e, v)| (e.parse().unwrap(), *v))
            .collect();
        assert_eq!(
            chempot_rows(&chempots),
            vec![
                vec!["Na".to_string(), "-0.5000".to_string()],
                vec!["O".to_string(), "-1.0000".to_string()],
            ]
        );
    }
}
