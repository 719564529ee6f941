pub mod visualization;

use std::fmt::Write;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{ComparisonReport, ComponentMeasurement, MeasurementResult, error::Result};

#[derive(Serialize)]
pub struct JsonReport {
    pub difference: DifferenceReportSection,
    pub region: RegionReportSection,
    pub components: Vec<ComponentMeasurement>,
}

#[derive(Serialize)]
pub struct DifferenceReportSection {
    pub width: u32,
    pub height: u32,
    pub max_difference: u16,
    pub mean_difference: f64,
    pub std_deviation: f64,
    pub changed_pixels: u64,
}

#[derive(Serialize)]
pub struct RegionReportSection {
    pub area: u64,
    pub perimeter: u64,
    pub component_count: usize,
}

impl From<&ComparisonReport> for JsonReport {
    fn from(report: &ComparisonReport) -> Self {
        let (width, height) = report.difference.dimensions();

        Self {
            difference: DifferenceReportSection {
                width,
                height,
                max_difference: report.difference_stats.max,
                mean_difference: report.difference_stats.mean,
                std_deviation: report.difference_stats.std_deviation,
                changed_pixels: report.difference_stats.changed_pixels,
            },
            region: RegionReportSection {
                area: report.measurement.area,
                perimeter: report.measurement.perimeter,
                component_count: report.components.len(),
            },
            components: report.components.clone(),
        }
    }
}

impl JsonReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Rows of named numeric columns, rendered as JSON or tab-separated text.
#[derive(Debug, Clone, Default)]
pub struct ResultsTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl ResultsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row; unseen column names are added to the right.
    pub fn add_row<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut row = vec![None; self.columns.len()];

        for (name, value) in values {
            let name = name.into();
            let index = match self.columns.iter().position(|c| *c == name) {
                Some(index) => index,
                None => {
                    self.columns.push(name);
                    for existing in &mut self.rows {
                        existing.push(None);
                    }
                    row.push(None);
                    self.columns.len() - 1
                }
            };
            row[index] = Some(value);
        }

        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<f64> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(index).copied().flatten()
    }

    pub fn from_measurement(measurement: &MeasurementResult) -> Self {
        let mut table = Self::new();
        table.add_row([
            ("Area", measurement.area as f64),
            ("Perimeter", measurement.perimeter as f64),
        ]);
        table
    }

    pub fn from_components(components: &[ComponentMeasurement]) -> Self {
        let mut table = Self::new();
        for component in components {
            table.add_row([
                ("Label", component.label as f64),
                ("Area", component.area as f64),
                ("Perimeter", component.perimeter as f64),
                ("BX", component.bounds.x as f64),
                ("BY", component.bounds.y as f64),
                ("Width", component.bounds.width as f64),
                ("Height", component.bounds.height as f64),
            ]);
        }
        table
    }

    /// Header line plus one 1-based numbered line per row; empty cells stay blank.
    pub fn to_tsv(&self) -> String {
        let mut out = String::from(" ");
        for column in &self.columns {
            out.push('\t');
            out.push_str(column);
        }
        out.push('\n');

        for (i, row) in self.rows.iter().enumerate() {
            let _ = write!(out, "{}", i + 1);
            for cell in row {
                out.push('\t');
                if let Some(value) = cell {
                    let _ = write!(out, "{}", value);
                }
            }
            out.push('\n');
        }

        out
    }

    pub fn to_json(&self) -> Result<String> {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let object = self
                    .columns
                    .iter()
                    .zip(row)
                    .filter_map(|(name, cell)| cell.map(|v| (name.clone(), Value::from(v))))
                    .collect::<Map<_, _>>();
                Value::Object(object)
            })
            .collect::<Vec<_>>();

        Ok(serde_json::to_string_pretty(&rows)?)
    }
}

impl From<&ComparisonReport> for ResultsTable {
    fn from(report: &ComparisonReport) -> Self {
        let stats = &report.difference_stats;
        let mut table = Self::new();
        table.add_row([
            ("Area", report.measurement.area as f64),
            ("Perimeter", report.measurement.perimeter as f64),
            ("MaxDiff", stats.max as f64),
            ("MeanDiff", stats.mean),
            ("StdDiff", stats.std_deviation),
            ("Changed", stats.changed_pixels as f64),
        ]);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PixelRegion;

    #[test]
    fn test_measurement_table() {
        let table = ResultsTable::from_measurement(&MeasurementResult { area: 9, perimeter: 24 });

        assert_eq!(table.columns(), &["Area".to_string(), "Perimeter".to_string()]);
        assert_eq!(table.value(0, "Perimeter"), Some(24.0));
        assert_eq!(table.to_tsv(), " \tArea\tPerimeter\n1\t9\t24\n");
    }

    #[test]
    fn test_new_column_backfills_rows() {
        let mut table = ResultsTable::new();
        table.add_row([("Area", 1.0)]);
        table.add_row([("Area", 2.0), ("Perimeter", 3.0)]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "Perimeter"), None);
        assert_eq!(table.to_tsv(), " \tArea\tPerimeter\n1\t1\t\n2\t2\t3\n");
    }

    #[test]
    fn test_table_json() {
        let table = ResultsTable::from_measurement(&MeasurementResult { area: 2, perimeter: 0 });
        let parsed: Value = serde_json::from_str(&table.to_json().unwrap()).unwrap();

        assert_eq!(parsed[0]["Area"], Value::from(2.0));
        assert_eq!(parsed[0]["Perimeter"], Value::from(0.0));
    }

    #[test]
    fn test_component_table() {
        let components = [ComponentMeasurement {
            label: 1,
            area: 3,
            perimeter: 4,
            bounds: PixelRegion { x: 0, y: 0, width: 2, height: 2 },
        }];

        let table = ResultsTable::from_components(&components);

        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, "Area"), Some(3.0));
        assert_eq!(table.value(0, "Width"), Some(2.0));
    }
}
