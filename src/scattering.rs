//! Transmission due to scattering.

use log::debug;

/// Transmission due to scattering for a `wavelength` in um over a `distance`
/// in m.
///
/// This is a Beer-Lambert attenuation with an extinction coefficient (1/km) of
/// `0.20 * (0.6 / wavelength)^1.3`. It does not depend on the absorption
/// tables; combining it with [`crate::PassmanLarmore`] output is up to the
/// caller.
pub fn atmospheric_scattering(wavelength: f64, distance: f64) -> f64 {
    let coefficient = 0.20 * (0.6 / wavelength).powf(1.3);
    debug!("scattering coefficient at {wavelength} um: {coefficient}");
    f64::exp(-coefficient * (distance / 1e3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_distance_is_lossless() {
        assert_eq!(atmospheric_scattering(8., 0.), 1.);
    }

    #[test]
    fn reference_wavelength() {
        // At 0.6 um the coefficient is exactly 0.2 per km
        assert_relative_eq!(atmospheric_scattering(0.6, 1000.), (-0.2f64).exp(), epsilon = 1e-15);
        assert_relative_eq!(atmospheric_scattering(0.6, 5000.), (-1.0f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn long_wave_scatters_less() {
        let short = atmospheric_scattering(3., 2000.);
        let long = atmospheric_scattering(10., 2000.);
        assert!(short < long);
        assert!(long < 1. && short > 0.);
    }

    #[test]
    fn decreases_with_distance() {
        let near = atmospheric_scattering(8., 5.);
        let far = atmospheric_scattering(8., 5000.);
        assert!(far < near && near <= 1.);
    }
}
