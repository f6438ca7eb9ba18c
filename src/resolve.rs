//! Nearest-neighbour resolution against a tabulated axis.

use crate::error::ModelError;

/// Find the index of the axis entry closest to `target`.
///
/// Distance is the absolute difference. On an exact tie the lowest index wins,
/// so the result only depends on the axis order, not its sortedness. A NaN
/// target compares as never closer and resolves to index 0.
pub fn nearest_index(axis: &[f64], target: f64) -> Result<usize, ModelError> {
    let (first, rest) = axis.split_first().ok_or(ModelError::EmptyAxis)?;

    let (index, _) = rest.iter().enumerate().fold(
        (0, (first - target).abs()),
        |(best, best_dist), (i, value)| {
            let dist = (value - target).abs();
            // Strict comparison keeps the first occurrence on ties
            if dist < best_dist {
                (i + 1, dist)
            } else {
                (best, best_dist)
            }
        },
    );

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AXIS: [f64; 6] = [0.1, 0.5, 1.0, 2.0, 5.0, 10.0];

    #[test]
    fn empty_axis_is_config_error() {
        let err = nearest_index(&[], 1.0).unwrap_err();
        assert_eq!(err, ModelError::EmptyAxis);
        assert!(err.is_configuration());
    }

    #[test]
    fn exact_values_resolve_to_themselves() {
        for (i, &value) in AXIS.iter().enumerate() {
            assert_eq!(nearest_index(&AXIS, value).unwrap(), i);
        }
    }

    #[test]
    fn picks_closest() {
        assert_eq!(nearest_index(&AXIS, 4.50005).unwrap(), 4);
        assert_eq!(nearest_index(&AXIS, 0.3).unwrap(), 0);
        assert_eq!(nearest_index(&AXIS, 0.31).unwrap(), 1);
        assert_eq!(nearest_index(&AXIS, 7.0).unwrap(), 4);
        assert_eq!(nearest_index(&AXIS, 7.6).unwrap(), 5);
    }

    #[test]
    fn out_of_range_clamps_to_ends() {
        assert_eq!(nearest_index(&AXIS, -3.0).unwrap(), 0);
        assert_eq!(nearest_index(&AXIS, 1e6).unwrap(), AXIS.len() - 1);
    }

    #[test]
    fn ties_go_to_first_occurrence() {
        // 1.5 is exactly between 1.0 and 2.0
        assert_eq!(nearest_index(&AXIS, 1.5).unwrap(), 2);
        // unsorted axis, both 3.0 and 1.0 are 1 away from 2.0
        assert_eq!(nearest_index(&[3.0, 1.0, 9.0], 2.0).unwrap(), 0);
        assert_eq!(nearest_index(&[1.0, 3.0, 9.0], 2.0).unwrap(), 0);
    }

    #[test]
    fn idempotent() {
        let first = nearest_index(&AXIS, 3.3).unwrap();
        let second = nearest_index(&AXIS, 3.3).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn nan_target_resolves_to_first() {
        assert_eq!(nearest_index(&AXIS, f64::NAN).unwrap(), 0);
    }
}
