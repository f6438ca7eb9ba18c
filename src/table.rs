//! Passman-Larmore absorption tables.
//!
//! Each table is a grid of transmission coefficients. Rows are keyed by
//! wavelength in um and matched exactly; columns are keyed by a continuous
//! coordinate (the h value, or distance in km) and are matched to the nearest
//! tabulated value by [`crate::resolve::nearest_index`].

mod loader;

use std::path::Path;

use log::{debug, warn};
use ndarray::{Array2, ArrayView2};
use smallvec::SmallVec;

use crate::error::{LoadError, ModelError, TableKind};

/// Column axis storage. The published tables have well under 32 columns.
pub(crate) type ColumnAxis = SmallVec<[f64; 32]>;

/// A single absorption table.
#[derive(Debug, Clone, PartialEq)]
pub struct TransmissionTable {
    /// Row keys, wavelength in um, in the order they were loaded.
    wavelengths: Vec<f64>,
    /// Column keys, in the order they were loaded.
    columns: ColumnAxis,
    /// Coefficients dimensioned as (`wavelengths.len()`, `columns.len()`).
    values: Array2<f64>,
}

impl TransmissionTable {
    /// Build a table from its axes and values.
    ///
    /// Both axes must be non-empty with unique keys, and `values` must be
    /// dimensioned as (`wavelengths.len()`, `columns.len()`).
    pub fn new(
        wavelengths: Vec<f64>,
        columns: &[f64],
        values: Array2<f64>,
    ) -> Result<Self, ModelError> {
        if wavelengths.is_empty() || columns.is_empty() {
            return Err(ModelError::EmptyAxis);
        }

        let expected = (wavelengths.len(), columns.len());
        if values.dim() != expected {
            return Err(ModelError::InconsistentShape {
                expected,
                actual: values.dim(),
            });
        }

        check_unique(&wavelengths, "row")?;
        check_unique(columns, "column")?;

        Ok(Self {
            wavelengths,
            columns: SmallVec::from_slice(columns),
            values,
        })
    }

    /// Read a table from comma-delimited text at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        debug!("loading table from {}", path.display());
        let file = std::fs::File::open(path)?;
        loader::read_table(file)
    }

    /// Read a table from comma-delimited text.
    ///
    /// The header either holds only the column keys, one cell shorter than
    /// the records, or starts with a label for the wavelength column that is
    /// ignored. Each record is a wavelength followed by
    /// one coefficient per column.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, LoadError> {
        loader::read_table(reader)
    }

    /// Row keys (wavelength in um).
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Column keys.
    pub fn columns(&self) -> &[f64] {
        &self.columns
    }

    /// All coefficients, dimensioned as (wavelengths, columns).
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Row index for an exact wavelength match.
    pub fn row_index(&self, wavelength: f64) -> Option<usize> {
        self.wavelengths.iter().position(|&w| w == wavelength)
    }

    /// Coefficient at an exact `wavelength` and a column index.
    pub fn get(&self, wavelength: f64, column: usize) -> Option<f64> {
        let row = self.row_index(wavelength)?;
        self.values.get((row, column)).copied()
    }
}

fn check_unique(keys: &[f64], axis: &'static str) -> Result<(), ModelError> {
    for (i, &key) in keys.iter().enumerate() {
        if keys[..i].contains(&key) {
            return Err(ModelError::DuplicateKey { axis, key });
        }
    }
    Ok(())
}

/// The pair of tables the model reads from.
///
/// The column axis is taken from the vapour table and is used to resolve both
/// the vapour column (from h) and the carbon column (from distance in km).
#[derive(Debug, Clone, PartialEq)]
pub struct TableStore {
    vapour: TransmissionTable,
    carbon: TransmissionTable,
}

impl TableStore {
    /// Pair up the two tables. They must have the same number of columns.
    pub fn new(vapour: TransmissionTable, carbon: TransmissionTable) -> Result<Self, ModelError> {
        if vapour.columns.len() != carbon.columns.len() {
            return Err(ModelError::InconsistentTables {
                vapour: vapour.columns.len(),
                carbon: carbon.columns.len(),
            });
        }
        if vapour.columns != carbon.columns {
            warn!(
                "carbon table header differs from vapour table; resolving both against the vapour columns"
            );
        }
        Ok(Self { vapour, carbon })
    }

    /// Like [`TableStore::new`], but either table may be absent, which is a
    /// configuration error.
    pub fn from_optional(
        vapour: Option<TransmissionTable>,
        carbon: Option<TransmissionTable>,
    ) -> Result<Self, ModelError> {
        let vapour = vapour.ok_or(ModelError::MissingTable(TableKind::Vapour))?;
        let carbon = carbon.ok_or(ModelError::MissingTable(TableKind::Carbon))?;
        Self::new(vapour, carbon)
    }

    /// Load both tables from comma-delimited files.
    pub fn from_paths(
        vapour: impl AsRef<Path>,
        carbon: impl AsRef<Path>,
    ) -> Result<Self, LoadError> {
        let vapour = TransmissionTable::from_path(vapour)?;
        let carbon = TransmissionTable::from_path(carbon)?;
        Ok(Self::new(vapour, carbon)?)
    }

    /// Like [`TableStore::from_paths`], but either path may be absent. Both
    /// are checked before anything is read.
    pub fn from_optional_paths<P: AsRef<Path>>(
        vapour: Option<P>,
        carbon: Option<P>,
    ) -> Result<Self, LoadError> {
        let vapour = vapour.ok_or(ModelError::MissingTable(TableKind::Vapour))?;
        let carbon = carbon.ok_or(ModelError::MissingTable(TableKind::Carbon))?;
        Self::from_paths(vapour, carbon)
    }

    /// Shared column axis used for nearest-neighbour resolution.
    pub fn columns(&self) -> &[f64] {
        self.vapour.columns()
    }

    /// Wavelengths available in the vapour table, in load order.
    pub fn wavelengths(&self) -> &[f64] {
        self.vapour.wavelengths()
    }

    /// The vapour table.
    pub fn vapour_table(&self) -> &TransmissionTable {
        &self.vapour
    }

    /// The carbon dioxide table.
    pub fn carbon_table(&self) -> &TransmissionTable {
        &self.carbon
    }

    /// Vapour coefficient at an exact wavelength and resolved column.
    pub fn vapour(&self, wavelength: f64, column: usize) -> Result<f64, ModelError> {
        lookup(&self.vapour, TableKind::Vapour, wavelength, column)
    }

    /// Carbon dioxide coefficient at an exact wavelength and resolved column.
    pub fn carbon(&self, wavelength: f64, column: usize) -> Result<f64, ModelError> {
        lookup(&self.carbon, TableKind::Carbon, wavelength, column)
    }
}

fn lookup(
    table: &TransmissionTable,
    kind: TableKind,
    wavelength: f64,
    column: usize,
) -> Result<f64, ModelError> {
    if column >= table.columns.len() {
        return Err(ModelError::ColumnOutOfRange {
            column,
            columns: table.columns.len(),
        });
    }
    table
        .get(wavelength, column)
        .ok_or(ModelError::UnknownWavelength {
            wavelength,
            table: kind,
        })
}
