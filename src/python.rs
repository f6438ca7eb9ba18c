//! Python interface.
//!
//! NOTE: this module is only the glue between Rust and Python. The model
//! itself lives in the other modules, which don't use `pyo3`.

use std::{
    path::PathBuf,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    time::Duration,
};

use log::{debug, info};
use numpy::{IntoPyArray, PyArray2};
use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::error::{LoadError, ModelError};
use crate::model::PassmanLarmore;
use crate::sweep::{distance_grid, evaluate_grids, wavelength_grid, SweepGrid};
use crate::table::TableStore;

/// How often the main thread wakes up to check for Ctrl-C during a sweep.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

impl From<ModelError> for PyErr {
    fn from(e: ModelError) -> Self {
        if e.is_lookup() {
            PyKeyError::new_err(e.to_string())
        } else {
            PyValueError::new_err(e.to_string())
        }
    }
}

impl From<LoadError> for PyErr {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::Table(e) => e.into(),
            LoadError::Io(_) | LoadError::Csv(_) | LoadError::Parse { .. } => {
                PyValueError::new_err(e.to_string())
            }
        }
    }
}

/// The Passman-Larmore model, loaded from a vapour table and a carbon
/// dioxide table, each a comma-delimited file.
#[pyclass(name = "PassmanLarmoreModel", frozen)]
#[derive(Debug)]
struct PyPassmanLarmore {
    model: PassmanLarmore,
}

#[pymethods]
impl PyPassmanLarmore {
    #[new]
    #[pyo3(signature = (vapour_table_filename=None, carbon_table_filename=None))]
    fn new(
        vapour_table_filename: Option<PathBuf>,
        carbon_table_filename: Option<PathBuf>,
    ) -> PyResult<Self> {
        let tables = TableStore::from_optional_paths(vapour_table_filename, carbon_table_filename)?;
        info!(
            "loaded tables with {} wavelengths and {} columns",
            tables.wavelengths().len(),
            tables.columns().len()
        );
        Ok(Self {
            model: PassmanLarmore::new(tables),
        })
    }

    /// Tabulated wavelengths in um.
    #[getter]
    fn wavelengths(&self) -> Vec<f64> {
        self.model.tables().wavelengths().to_vec()
    }

    /// Column axis shared by both tables.
    #[getter]
    fn columns(&self) -> Vec<f64> {
        self.model.tables().columns().to_vec()
    }

    /// The h value for a temperature in °C, humidity (0 to 1), and distance
    /// in m.
    #[staticmethod]
    fn h_index(tatm: f64, humidity: f64, distance: f64) -> f64 {
        crate::model::h_index(tatm, humidity, distance)
    }

    /// Atmospheric transmission for a temperature in °C, humidity (0 to 1),
    /// distance in m, and wavelength in um.
    fn atmospheric_transmission(
        &self,
        tatm: f64,
        humidity: f64,
        distance: f64,
        wavelength: f64,
    ) -> PyResult<f64> {
        Ok(self
            .model
            .atmospheric_transmission(tatm, humidity, distance, wavelength)?)
    }

    /// One (temperature, humidity) array per distance, at a fixed wavelength.
    ///
    /// `num_threads` must be a positive integer, or `None` to automatically
    /// choose the number of threads.
    #[pyo3(signature = (ambient_temperature, relative_humidity, distance, wavelength, num_threads=None))]
    fn absorption_per_distance<'py>(
        &self,
        py: Python<'py>,
        ambient_temperature: Vec<f64>,
        relative_humidity: Vec<f64>,
        distance: Vec<f64>,
        wavelength: f64,
        num_threads: Option<usize>,
    ) -> PyResult<Vec<Bound<'py, PyArray2<f64>>>> {
        let grids = run_grids(py, distance.len(), num_threads, |index| {
            distance_grid(
                &self.model,
                &ambient_temperature,
                &relative_humidity,
                distance[index],
                wavelength,
            )
        })?;
        Ok(to_arrays(py, grids))
    }

    /// One (temperature, humidity) array per wavelength, at a fixed distance.
    ///
    /// `num_threads` must be a positive integer, or `None` to automatically
    /// choose the number of threads.
    #[pyo3(signature = (ambient_temperature, relative_humidity, distance, wavelength, num_threads=None))]
    fn absorption_per_wavelength<'py>(
        &self,
        py: Python<'py>,
        ambient_temperature: Vec<f64>,
        relative_humidity: Vec<f64>,
        distance: f64,
        wavelength: Vec<f64>,
        num_threads: Option<usize>,
    ) -> PyResult<Vec<Bound<'py, PyArray2<f64>>>> {
        let grids = run_grids(py, wavelength.len(), num_threads, |index| {
            wavelength_grid(
                &self.model,
                &ambient_temperature,
                &relative_humidity,
                distance,
                wavelength[index],
            )
        })?;
        Ok(to_arrays(py, grids))
    }
}

/// Transmission due to scattering for a wavelength in um and distance in m.
#[pyfunction]
fn atmospheric_scattering(wavelength: f64, distance: f64) -> f64 {
    crate::scattering::atmospheric_scattering(wavelength, distance)
}

/// Evaluate `num_grids` grids on a dedicated thread pool, while the calling
/// thread watches for Python signals.
fn run_grids<F>(
    py: Python<'_>,
    num_grids: usize,
    num_threads: Option<usize>,
    grid: F,
) -> PyResult<Vec<SweepGrid>>
where
    F: Fn(usize) -> Result<SweepGrid, ModelError> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads.unwrap_or(0))
        .build()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

    // These atomics keep track of how many grids have finished and whether
    // it's time to cancel the sweep or not
    let num_completed = AtomicUsize::new(0);
    let cancelled = AtomicBool::new(false);

    // `None` marks a grid skipped after cancellation or a failed grid
    let mut results: Vec<Option<Result<SweepGrid, ModelError>>> = Vec::new();

    pool.in_place_scope(|s| -> PyResult<()> {
        s.spawn(|_| {
            results = evaluate_grids(num_grids, &cancelled, &num_completed, &grid);
        });

        // The work is done in the thread pool; back here, report progress
        // and check for Ctrl-C. A failed grid also stops the loop.
        while !cancelled.load(Ordering::Relaxed) {
            if let Err(e) = py.check_signals() {
                cancelled.store(true, Ordering::Relaxed);
                return Err(e);
            }

            let num_completed = num_completed.load(Ordering::Relaxed);
            if num_completed == num_grids {
                break;
            }
            debug!("Completed {num_completed}/{num_grids} grids");

            py.allow_threads(|| {
                std::thread::sleep(POLL_INTERVAL);
            });
        }

        Ok(())
    })?;

    // Report the grid's own error ahead of the grids it caused to be skipped
    let mut grids = Vec::with_capacity(num_grids);
    let mut skipped = false;
    for result in results {
        match result {
            Some(Ok(finished)) => grids.push(finished),
            Some(Err(e)) => return Err(e.into()),
            None => skipped = true,
        }
    }
    if skipped {
        return Err(PyRuntimeError::new_err("sweep cancelled"));
    }
    Ok(grids)
}

fn to_arrays(py: Python<'_>, grids: Vec<SweepGrid>) -> Vec<Bound<'_, PyArray2<f64>>> {
    grids
        .into_iter()
        .map(|grid| grid.values.into_pyarray(py))
        .collect()
}

/// Infrared atmospheric transmission, implemented in Rust.
#[pymodule]
fn passman_larmore(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_function(wrap_pyfunction!(atmospheric_scattering, m)?)?;
    m.add_class::<PyPassmanLarmore>()?;
    Ok(())
}
