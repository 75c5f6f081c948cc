use super::error::ReservoirError;
use crate::analysis::ChemicalPotentials;
use crate::core::io::format_composition;
use crate::core::models::Element;
use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    /// Render row labels as Latex compositions.
    pub format_compositions: bool,
    /// With `format_compositions`, put the whole label in math mode.
    pub all_math: bool,
    /// Decimal places in the rendered table (CSV output keeps full precision).
    pub precision: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            format_compositions: false,
            all_math: false,
            precision: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

/// Reservoirs laid out as rows, with one column per element (alphabetical).
///
/// A reservoir without a value for some column leaves that cell empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Element>,
    rows: Vec<TableRow>,
    precision: usize,
}

impl Table {
    pub fn from_reservoirs<'a>(
        reservoirs: impl Iterator<Item = (&'a str, &'a ChemicalPotentials)> + Clone,
        options: &TableOptions,
    ) -> Self {
        let columns: Vec<Element> = reservoirs
            .clone()
            .flat_map(|(_, mu)| mu.elements())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows = reservoirs
            .map(|(name, mu)| TableRow {
                label: if options.format_compositions {
                    format_composition(name, options.all_math)
                } else {
                    name.to_string()
                },
                values: columns.iter().map(|e| mu.get(*e)).collect(),
            })
            .collect();

        Self {
            columns,
            rows,
            precision: options.precision,
        }
    }

    pub fn columns(&self) -> &[Element] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), ReservoirError> {
        let file = std::fs::File::create(path).map_err(|e| ReservoirError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        self.write_csv_to(file).map_err(|e| ReservoirError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    /// Writes a `reservoir,<El>,...` CSV with full-precision values.
    pub fn write_csv_to<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);
        let mut header = vec!["reservoir".to_string()];
        header.extend(self.columns.iter().map(|e| e.symbol().to_string()));
        writer.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![row.label.clone()];
            record.extend(
                row.values
                    .iter()
                    .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn cell(&self, value: Option<f64>) -> String {
        value
            .map(|v| format!("{:.*}", self.precision, v))
            .unwrap_or_default()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.values.iter().map(|v| self.cell(*v)).collect())
            .collect();

        let label_w = self
            .rows
            .iter()
            .map(|r| r.label.chars().count())
            .max()
            .unwrap_or(0);
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(col, element)| {
                cells
                    .iter()
                    .map(|row| row[col].len())
                    .chain([element.symbol().len()])
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:label_w$}", "")?;
        for (element, width) in self.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", element.symbol(), width = *width)?;
        }
        for (row, row_cells) in self.rows.iter().zip(&cells) {
            writeln!(f)?;
            write!(f, "{:<label_w$}", row.label)?;
            for (cell, width) in row_cells.iter().zip(&widths) {
                write!(f, "  {:>width$}", cell, width = *width)?;
            }
        }
        Ok(())
    }
}
