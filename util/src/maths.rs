//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Clamp a value between a minimum and maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() { r + rhs.abs() } else { r }
}

/// Wrap an angle into the range [0, 2pi).
pub fn wrap_2pi<T>(angle: T) -> T
where
    T: Float
{
    rem_euclid(angle, T::from(std::f64::consts::TAU).unwrap())
}

/// Get the signed shortest angular distance from `from` to `to`.
///
/// Both angles may be outside [0, 2pi), the result is always in (-pi, pi].
/// Adding the result to `from` gives an angle equivalent to `to` modulo 2pi.
pub fn ang_shortest_dist<T>(from: T, to: T) -> T
where
    T: Float
{
    let pi_t = T::from(std::f64::consts::PI).unwrap();
    let tau_t = T::from(std::f64::consts::TAU).unwrap();

    let d = rem_euclid(to - from, tau_t);

    if d > pi_t {
        d - tau_t
    }
    else {
        d
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;
    const TAU: f64 = std::f64::consts::TAU;

    #[test]
    fn test_wrap_2pi() {
        assert!((wrap_2pi(-0.5f64) - (TAU - 0.5)).abs() < 1e-12);
        assert!((wrap_2pi(TAU + 0.5f64) - 0.5).abs() < 1e-12);
        assert_eq!(wrap_2pi(0f64), 0f64);
        assert!((wrap_2pi(-3.0 * PI) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_ang_shortest_dist() {
        assert_eq!(ang_shortest_dist(1f64, 2f64), 1f64);
        assert_eq!(ang_shortest_dist(2f64, 1f64), -1f64);
        assert!((ang_shortest_dist(0f64, TAU)).abs() < 1e-12);
        assert!((ang_shortest_dist(TAU - 0.5, 0.5f64) - 1.0).abs() < 1e-12);
        assert!((ang_shortest_dist(0.5f64, TAU - 0.5) + 1.0).abs() < 1e-12);

        // A half turn comes out as +pi, not -pi
        assert!((ang_shortest_dist(0f64, PI) - PI).abs() < 1e-12);

        // Result always within (-pi, pi]
        for i in 0..100 {
            let a = (i as f64) * 0.37 - 18.0;
            let b = (i as f64) * -0.53 + 7.0;
            let d = ang_shortest_dist(a, b);
            assert!(d > -PI && d <= PI);
        }
    }

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 1f64), (0f64, 10f64), 0.5), 5.0);
        assert_eq!(lin_map((-1f64, 1f64), (0f64, 1f64), 0.0), 0.5);
    }
}
