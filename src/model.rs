//! Passman-Larmore atmospheric transmission model.
//!
//! From "Atmospheric transmission coefficient modelling in the infrared for
//! thermovision measurements" (Minkina and Klecha, 2016), which follows
//! Gaussorgues, "Infrared Thermography" (1994), section 4.5.


use log::debug;

use crate::error::ModelError;
use crate::resolve::nearest_index;
use crate::table::{TableStore, TransmissionTable};

/// Inputs for a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelInputs {
    /// Ambient temperature in °C
    pub temperature: f64,
    /// Relative humidity as a fraction from 0 to 1
    pub humidity: f64,
    /// Path length in m
    pub distance: f64,
    /// Wavelength in um. Must be a row of both tables.
    pub wavelength: f64,
}

/// Everything computed along the way to a transmission value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// The h value for the inputs
    pub h: f64,
    /// Column resolved from `h`
    pub vapour_column: usize,
    /// Column resolved from the distance in km
    pub carbon_column: usize,
    /// Transmission due to water vapour
    pub vapour: f64,
    /// Transmission due to carbon dioxide
    pub carbon: f64,
    /// Combined transmission, `vapour * carbon`
    pub transmission: f64,
}

/// The empirical h index.
///
/// For an ambient `temperature` in °C, relative `humidity` (0 to 1), and path
/// `distance` in m, compute the humidity and path weighted h value used to
/// pick the vapour table column.
pub fn h_index(temperature: f64, humidity: f64, distance: f64) -> f64 {
    #![allow(clippy::excessive_precision)]
    let t = temperature;
    (1.6667e-4 * t.powi(3) + 0.01 * t.powi(2) + 0.38333 * t + 5.) * humidity * (distance / 1e3)
}

/// The model, holding both absorption tables.
#[derive(Debug, Clone, PartialEq)]
pub struct PassmanLarmore {
    tables: TableStore,
}

impl PassmanLarmore {
    /// Build the model from an already validated pair of tables.
    pub fn new(tables: TableStore) -> Self {
        Self { tables }
    }

    /// Build the model from two tables, either of which may be missing.
    pub fn from_tables(
        vapour: Option<TransmissionTable>,
        carbon: Option<TransmissionTable>,
    ) -> Result<Self, ModelError> {
        TableStore::from_optional(vapour, carbon).map(Self::new)
    }

    /// The underlying tables.
    pub fn tables(&self) -> &TableStore {
        &self.tables
    }

    /// Run the model and keep the intermediate values.
    ///
    /// The vapour and carbon columns are both resolved against the vapour
    /// table's column axis, but with different targets: h for vapour and the
    /// distance in km for carbon dioxide.
    pub fn evaluate(&self, inputs: &ModelInputs) -> Result<Evaluation, ModelError> {
        let ModelInputs {
            temperature,
            humidity,
            distance,
            wavelength,
        } = *inputs;

        let columns = self.tables.columns();
        let h = h_index(temperature, humidity, distance);
        let vapour_column = nearest_index(columns, h)?;
        let carbon_column = nearest_index(columns, distance / 1e3)?;

        let vapour = self.tables.vapour(wavelength, vapour_column)?;
        let carbon = self.tables.carbon(wavelength, carbon_column)?;
        let transmission = vapour * carbon;

        debug!(
            "h = {h} (column {}), vapour = {vapour}, carbon = {carbon} (column {}), transmission = {transmission}",
            columns[vapour_column], columns[carbon_column]
        );

        Ok(Evaluation {
            h,
            vapour_column,
            carbon_column,
            vapour,
            carbon,
            transmission,
        })
    }

    /// Atmospheric transmission for an ambient temperature in °C, relative
    /// humidity (0 to 1), distance in m, and wavelength in um.
    pub fn atmospheric_transmission(
        &self,
        temperature: f64,
        humidity: f64,
        distance: f64,
        wavelength: f64,
    ) -> Result<f64, ModelError> {
        let inputs = ModelInputs {
            temperature,
            humidity,
            distance,
            wavelength,
        };
        Ok(self.evaluate(&inputs)?.transmission)
    }
}
