//! Comma-delimited table reader.

use std::io::Read;

use log::debug;
use ndarray::Array2;

use super::TransmissionTable;
use crate::error::{LoadError, ModelError};

pub(super) fn read_table(input: impl Read) -> Result<TransmissionTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let header = reader.headers()?.clone();
    let mut records = reader.records().peekable();

    // The header either labels the wavelength column in its first cell, or
    // is one cell shorter than the rows and holds only column keys
    let labelled = match records.peek() {
        Some(Ok(first)) => first.len() != header.len() + 1,
        _ => true,
    };
    let columns = header
        .iter()
        .enumerate()
        .skip(usize::from(labelled))
        .map(|(column, cell)| parse_cell(cell, 1, column))
        .collect::<Result<Vec<_>, _>>()?;

    let mut wavelengths = Vec::new();
    let mut values = Vec::new();

    for record in records {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());

        if record.len() != columns.len() + 1 {
            return Err(ModelError::InconsistentShape {
                expected: (wavelengths.len() + 1, columns.len()),
                actual: (wavelengths.len() + 1, record.len().saturating_sub(1)),
            }
            .into());
        }

        for (column, cell) in record.iter().enumerate() {
            let value = parse_cell(cell, line, column)?;
            if column == 0 {
                wavelengths.push(value);
            } else {
                values.push(value);
            }
        }
    }

    debug!(
        "read table with {} wavelengths and {} columns",
        wavelengths.len(),
        columns.len()
    );

    let shape = (wavelengths.len(), columns.len());
    let num_values = values.len();
    let values = Array2::from_shape_vec(shape, values).map_err(|_| ModelError::InconsistentShape {
        expected: shape,
        actual: (num_values / columns.len().max(1), columns.len()),
    })?;

    Ok(TransmissionTable::new(wavelengths, &columns, values)?)
}

fn parse_cell(cell: &str, line: u64, column: usize) -> Result<f64, LoadError> {
    cell.parse().map_err(|_| LoadError::Parse {
        line,
        column,
        value: cell.to_string(),
    })
}
