//! Batch evaluation over temperature and humidity grids.
//!
//! Each sweep produces one [`SweepGrid`] per value of the outer axis (distance
//! or wavelength), in the same order as the inputs. Cells are independent and
//! are evaluated in parallel; the first failing cell aborts the whole sweep.

#[cfg(any(feature = "python", test))]
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use log::{debug, info};
use ndarray::Array2;
use rayon::prelude::*;

use crate::error::ModelError;
use crate::model::{ModelInputs, PassmanLarmore};

/// Transmission over a temperature × humidity grid for one outer value.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepGrid {
    /// The fixed distance (m) or wavelength (um) for this grid
    pub outer: f64,
    /// Row axis, ambient temperature in °C
    pub temperatures: Vec<f64>,
    /// Column axis, relative humidity (0 to 1)
    pub humidities: Vec<f64>,
    /// Transmission, dimensioned as (`temperatures.len()`, `humidities.len()`)
    pub values: Array2<f64>,
}

/// One grid per distance (m), all at the same `wavelength` (um).
pub fn sweep_over_distances(
    model: &PassmanLarmore,
    temperatures: &[f64],
    humidities: &[f64],
    distances: &[f64],
    wavelength: f64,
) -> Result<Vec<SweepGrid>, ModelError> {
    info!(
        "Sweeping {} distances over {}x{} temperature/humidity at {wavelength} um",
        distances.len(),
        temperatures.len(),
        humidities.len()
    );

    distances
        .iter()
        .map(|&distance| distance_grid(model, temperatures, humidities, distance, wavelength))
        .collect()
}

/// One grid per wavelength (um), all at the same `distance` (m).
pub fn sweep_over_wavelengths(
    model: &PassmanLarmore,
    temperatures: &[f64],
    humidities: &[f64],
    distance: f64,
    wavelengths: &[f64],
) -> Result<Vec<SweepGrid>, ModelError> {
    info!(
        "Sweeping {} wavelengths over {}x{} temperature/humidity at {distance} m",
        wavelengths.len(),
        temperatures.len(),
        humidities.len()
    );

    wavelengths
        .iter()
        .map(|&wavelength| wavelength_grid(model, temperatures, humidities, distance, wavelength))
        .collect()
}

/// A single grid for a fixed `distance` (m), labelled by the distance.
pub fn distance_grid(
    model: &PassmanLarmore,
    temperatures: &[f64],
    humidities: &[f64],
    distance: f64,
    wavelength: f64,
) -> Result<SweepGrid, ModelError> {
    debug!("distance: {distance} m");
    evaluate_grid(model, temperatures, humidities, distance, |temperature, humidity| {
        ModelInputs {
            temperature,
            humidity,
            distance,
            wavelength,
        }
    })
}

/// A single grid for a fixed `wavelength` (um), labelled by the wavelength.
pub fn wavelength_grid(
    model: &PassmanLarmore,
    temperatures: &[f64],
    humidities: &[f64],
    distance: f64,
    wavelength: f64,
) -> Result<SweepGrid, ModelError> {
    debug!("wavelength: {wavelength} um");
    evaluate_grid(model, temperatures, humidities, wavelength, |temperature, humidity| {
        ModelInputs {
            temperature,
            humidity,
            distance,
            wavelength,
        }
    })
}

/// Evaluate one grid per index in `0..num_grids`, in parallel.
///
/// Grids not yet started once `cancelled` is set come back as `None`. A grid
/// that fails sets `cancelled` itself, so the rest of the sweep is skipped.
/// `num_completed` counts finished and skipped grids.
#[cfg(any(feature = "python", test))]
pub(crate) fn evaluate_grids<F>(
    num_grids: usize,
    cancelled: &AtomicBool,
    num_completed: &AtomicUsize,
    grid: F,
) -> Vec<Option<Result<SweepGrid, ModelError>>>
where
    F: Fn(usize) -> Result<SweepGrid, ModelError> + Sync,
{
    let mut results = Vec::new();
    (0..num_grids)
        .into_par_iter()
        .map(|index| {
            if cancelled.load(Ordering::Relaxed) {
                return None;
            }
            let result = grid(index);
            if result.is_err() {
                cancelled.store(true, Ordering::Relaxed);
            }
            Some(result)
        })
        .inspect(|_| {
            num_completed.fetch_add(1, Ordering::Relaxed);
        })
        .collect_into_vec(&mut results);
    results
}

fn evaluate_grid<F>(
    model: &PassmanLarmore,
    temperatures: &[f64],
    humidities: &[f64],
    outer: f64,
    inputs: F,
) -> Result<SweepGrid, ModelError>
where
    F: Fn(f64, f64) -> ModelInputs + Sync,
{
    let rows: Vec<Vec<f64>> = temperatures
        .par_iter()
        .map(|&temperature| {
            humidities
                .iter()
                .map(|&humidity| {
                    model
                        .evaluate(&inputs(temperature, humidity))
                        .map(|eval| eval.transmission)
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<_, _>>()?;

    let values = Array2::from_shape_fn((temperatures.len(), humidities.len()), |(r, c)| {
        rows[r][c]
    });

    Ok(SweepGrid {
        outer,
        temperatures: temperatures.to_vec(),
        humidities: humidities.to_vec(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::{sample_model, WAVELENGTHS};

    const TEMPERATURES: [f64; 4] = [0., 10., 20., 40.];
    const HUMIDITIES: [f64; 3] = [0.45, 0.7, 1.0];

    #[test]
    fn distance_sweep_shape_and_order() {
        let model = sample_model();
        let distances = [4.5, 0.5, 500., 3.];
        let grids =
            sweep_over_distances(&model, &TEMPERATURES, &HUMIDITIES, &distances, 13.0).unwrap();

        assert_eq!(grids.len(), distances.len());
        for (grid, &distance) in grids.iter().zip(&distances) {
            assert_eq!(grid.outer, distance);
            assert_eq!(grid.values.dim(), (TEMPERATURES.len(), HUMIDITIES.len()));
            assert_eq!(grid.temperatures, TEMPERATURES);
            assert_eq!(grid.humidities, HUMIDITIES);
        }
    }

    #[test]
    fn wavelength_sweep_three_by_two_by_two() {
        let model = sample_model();
        let grids = sweep_over_wavelengths(&model, &[15., 25.], &[0.5, 0.9], 3., &WAVELENGTHS)
            .unwrap();

        assert_eq!(grids.len(), 3);
        for (grid, &wavelength) in grids.iter().zip(&WAVELENGTHS) {
            assert_eq!(grid.outer, wavelength);
            assert_eq!(grid.values.dim(), (2, 2));
        }
    }

    #[test]
    fn cells_match_single_evaluations() {
        let model = sample_model();
        let grids =
            sweep_over_wavelengths(&model, &TEMPERATURES, &HUMIDITIES, 2500., &WAVELENGTHS)
                .unwrap();

        for grid in &grids {
            for (r, &temperature) in TEMPERATURES.iter().enumerate() {
                for (c, &humidity) in HUMIDITIES.iter().enumerate() {
                    let expected = model
                        .atmospheric_transmission(temperature, humidity, 2500., grid.outer)
                        .unwrap();
                    assert_eq!(grid.values[[r, c]].to_bits(), expected.to_bits());
                }
            }
        }
    }

    #[test]
    fn empty_outer_axis_gives_no_grids() {
        let model = sample_model();
        let grids = sweep_over_distances(&model, &TEMPERATURES, &HUMIDITIES, &[], 8.0).unwrap();
        assert!(grids.is_empty());
    }

    #[test]
    fn empty_inner_axes_give_empty_grids() {
        let model = sample_model();
        let grids = sweep_over_distances(&model, &[], &HUMIDITIES, &[1., 2.], 8.0).unwrap();
        assert_eq!(grids.len(), 2);
        assert_eq!(grids[0].values.dim(), (0, HUMIDITIES.len()));
    }

    #[test]
    fn failing_grid_skips_the_rest() {
        let model = sample_model();
        let cancelled = AtomicBool::new(false);
        let num_completed = AtomicUsize::new(0);
        let wavelengths = [8.0, 9.0, 10.0, 13.0, 8.0];

        // A single worker runs the grids in order
        let pool = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let results = pool.install(|| {
            evaluate_grids(wavelengths.len(), &cancelled, &num_completed, |index| {
                wavelength_grid(&model, &TEMPERATURES, &HUMIDITIES, 3., wavelengths[index])
            })
        });

        assert!(cancelled.load(Ordering::Relaxed));
        assert_eq!(num_completed.load(Ordering::Relaxed), wavelengths.len());
        assert_eq!(results.len(), wavelengths.len());
        assert!(matches!(results[0], Some(Ok(_))));
        assert!(matches!(&results[1], Some(Err(e)) if e.is_lookup()));
        assert!(results[2..].iter().all(Option::is_none));
    }

    #[test]
    fn cancelled_before_start_evaluates_nothing() {
        let cancelled = AtomicBool::new(true);
        let num_completed = AtomicUsize::new(0);
        let calls = AtomicUsize::new(0);

        let results = evaluate_grids(4, &cancelled, &num_completed, |_| {
            calls.fetch_add(1, Ordering::Relaxed);
            Err(ModelError::EmptyAxis)
        });

        assert_eq!(calls.load(Ordering::Relaxed), 0);
        assert!(results.iter().all(Option::is_none));
    }

    #[test]
    fn bad_wavelength_aborts_sweep() {
        let model = sample_model();
        let err = sweep_over_wavelengths(&model, &TEMPERATURES, &HUMIDITIES, 3., &[8.0, 9.0, 13.0])
            .unwrap_err();
        assert!(err.is_lookup());

        let err = sweep_over_distances(&model, &TEMPERATURES, &HUMIDITIES, &[1., 2.], 9.0)
            .unwrap_err();
        assert!(err.is_lookup());
    }
}
