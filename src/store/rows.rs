//! Spreadsheet-style CSV import and export of contributor rows

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::core::tolerance::Tolerance;
use crate::entities::stackup::{Contributor, Direction, ToleranceType};
use crate::store::diagnostics::StackFileError;

/// Column order written on export
pub const COLUMNS: [&str; 7] = [
    "description",
    "nominal",
    "direction",
    "tol",
    "tolType",
    "cpk",
    "floatShifted",
];

/// Read contributor rows from CSV with a header row
///
/// Headers match case-insensitively and may come in any order. Blank lines
/// are skipped and loose cells fall back to defaults, the way the stack file
/// loader treats them.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<Contributor>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let cells: HashMap<&str, &str> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.as_str(), v.trim()))
            .collect();

        if cells.values().all(|v| v.is_empty()) {
            continue;
        }

        rows.push(row_from_cells(&cells, idx + 2));
    }

    Ok(rows)
}

fn row_from_cells(cells: &HashMap<&str, &str>, line: usize) -> Contributor {
    let cell = |name: &str| cells.get(name).copied().unwrap_or("");

    let nominal = match cell("nominal") {
        "" => 0.0,
        text => text.parse::<f64>().unwrap_or_else(|_| {
            tracing::warn!(line, value = text, "nominal is not a number, using 0");
            0.0
        }),
    };

    Contributor {
        description: cell("description").to_string(),
        nominal,
        direction: Direction::from_cell(cell("direction")),
        tol: Tolerance::from_input(cell("tol")),
        tol_type: ToleranceType::from_cell(cell("toltype")),
        cpk: cell("cpk").parse::<f64>().ok().filter(|v| v.is_finite()),
        float_shifted: matches!(
            cell("floatshifted").to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "y" | "x"
        ),
    }
}

/// Write contributor rows as CSV with a header row
pub fn write_rows<W: Write>(writer: W, rows: &[Contributor]) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.write_record([
            row.description.clone(),
            row.nominal.to_string(),
            row.direction.to_string(),
            row.tol.cell_text(),
            row.tol_type.to_string(),
            row.cpk.map(|c| c.to_string()).unwrap_or_default(),
            row.float_shifted.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Import rows from a CSV file
pub fn import_rows(path: &Path) -> Result<Vec<Contributor>, StackFileError> {
    let file = std::fs::File::open(path).map_err(|source| StackFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_rows(file).map_err(|e| StackFileError::Csv {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Export rows to a CSV file
pub fn export_rows(path: &Path, rows: &[Contributor]) -> Result<(), StackFileError> {
    let file = std::fs::File::create(path).map_err(|source| StackFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_rows(file, rows).map_err(|e| StackFileError::Csv {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
