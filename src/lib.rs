//! Infrared atmospheric transmission with the Passman-Larmore model.
//!
//! The model combines two tabulated absorption effects, water vapour and
//! carbon dioxide. The vapour column is picked from an empirical h index that
//! folds temperature, humidity, and path length into one value; the carbon
//! dioxide column is picked from the path length alone. Columns are matched to
//! the nearest tabulated value, wavelengths must match a table row exactly.
//!
//! ```no_run
//! use passman_larmore::{sweep_over_wavelengths, PassmanLarmore, TableStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tables = TableStore::from_paths("vapour.csv", "carbon.csv")?;
//! let model = PassmanLarmore::new(tables);
//!
//! let tran = model.atmospheric_transmission(20., 0.5, 500., 13.0)?;
//! let grids = sweep_over_wavelengths(&model, &[0., 20.], &[0.5, 1.0], 3., &[8.0, 13.0])?;
//! # Ok(())
//! # }
//! ```
//!
//! With the `python` feature the crate also builds as a Python extension
//! module exposing a `PassmanLarmoreModel` class.

pub mod error;
pub mod model;
pub mod resolve;
pub mod scattering;
pub mod sweep;
pub mod table;

#[cfg(feature = "python")]
mod python;

pub use error::{LoadError, ModelError, TableKind};
pub use model::{h_index, Evaluation, ModelInputs, PassmanLarmore};
pub use resolve::nearest_index;
pub use scattering::atmospheric_scattering;
pub use sweep::{
    distance_grid, sweep_over_distances, sweep_over_wavelengths, wavelength_grid, SweepGrid,
};
pub use table::{TableStore, TransmissionTable};
