//! Error types for table loading and model evaluation.

use thiserror::Error;

/// Which of the two absorption tables an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Water vapour absorption, indexed by the h value
    Vapour,
    /// Carbon dioxide absorption, indexed by distance in km
    Carbon,
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableKind::Vapour => write!(f, "vapour"),
            TableKind::Carbon => write!(f, "carbon dioxide"),
        }
    }
}

/// Possible model errors.
///
/// Everything except [`ModelError::UnknownWavelength`] is a configuration
/// problem and is raised before any evaluation happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// One of the two mandatory tables was not given
    #[error("the {0} table is required")]
    MissingTable(TableKind),
    /// A lookup axis has no entries
    #[error("lookup axis is empty")]
    EmptyAxis,
    /// A row or column key appears more than once
    #[error("duplicate {axis} key {key}")]
    DuplicateKey {
        /// Either "row" or "column"
        axis: &'static str,
        /// The repeated key
        key: f64,
    },
    /// The table values don't match the axis lengths
    #[error("table values have shape {actual:?}, expected {expected:?}")]
    InconsistentShape {
        /// (rows, columns) implied by the axes
        expected: (usize, usize),
        /// (rows, columns) actually given
        actual: (usize, usize),
    },
    /// The carbon table doesn't have the same number of columns as the vapour table
    #[error("vapour table has {vapour} columns but carbon table has {carbon}")]
    InconsistentTables {
        /// Column count of the vapour table
        vapour: usize,
        /// Column count of the carbon table
        carbon: usize,
    },
    /// A resolved column index is past the end of the table
    #[error("column {column} out of range for a table with {columns} columns")]
    ColumnOutOfRange {
        /// Requested column index
        column: usize,
        /// Number of columns in the table
        columns: usize,
    },
    /// The wavelength is not a row of the table
    #[error("wavelength {wavelength} um not found in the {table} table")]
    UnknownWavelength {
        /// Requested wavelength in um
        wavelength: f64,
        /// Table that was searched
        table: TableKind,
    },
}

impl ModelError {
    /// True for errors in how the model was set up (missing tables, empty or
    /// malformed axes).
    pub fn is_configuration(&self) -> bool {
        !self.is_lookup()
    }

    /// True when a requested wavelength is not tabulated.
    pub fn is_lookup(&self) -> bool {
        matches!(self, ModelError::UnknownWavelength { .. })
    }
}

/// Errors from reading a delimited table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Couldn't open the file
    #[error("couldn't read table: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed delimited text
    #[error("malformed table: {0}")]
    Csv(#[from] csv::Error),
    /// A cell isn't a number
    #[error("line {line}, column {column}: '{value}' is not a number")]
    Parse {
        /// 1-based line number in the input
        line: u64,
        /// 0-based column index
        column: usize,
        /// Offending cell text
        value: String,
    },
    /// The parsed values don't form a valid table
    #[error(transparent)]
    Table(#[from] ModelError),
}
