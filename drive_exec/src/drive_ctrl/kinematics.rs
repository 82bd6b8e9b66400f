//! Swerve kinematics
//!
//! Pure functions converting between the chassis drive command and the four
//! per-corner (steer angle, drive speed) pairs.
//!
//! A corner's velocity is the standard planar rigid-body decomposition: the
//! chassis translation plus the rotational contribution `rot * perp(r)`,
//! where `r` is the corner's offset from the centroid. The rotational term is
//! normalised by the largest corner radius so that a pure `rot = 1` command
//! saturates the farthest corner at speed 1.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::{Params, NUM_CORNERS};
use drive_if::eqpt::swerve::SwerveSense;
use drive_if::tc::drive::DriveCmd;
use util::maths::{ang_shortest_dist, clamp, wrap_2pi};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Normalised speed below which a corner is considered stationary, in which
/// case its previous steer angle is held rather than commanding the
/// (numerically arbitrary) angle of a near-zero vector.
pub const ZERO_SPEED_EPS: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The state of all four wheels - steer angle and normalised drive speed per
/// corner.
///
/// Angles are always kept in [0, 2pi), speeds in [-1, +1]. A `WheelState` is
/// recomputed every cycle, either from sensing or from a drive command, and
/// is never persisted.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct WheelState {
    /// Steer axis absolute position per corner.
    ///
    /// Units: radians, in [0, 2pi)
    pub str_abs_pos_rad: [f64; NUM_CORNERS],

    /// Normalised drive speed per corner, in [-1, +1].
    pub drv_speed_norm: [f64; NUM_CORNERS],
}

/// Fixed drivetrain geometry used by both kinematic directions.
#[derive(Clone, Debug)]
pub struct Geometry {
    /// Corner offsets from the chassis centroid, (forward, left).
    corner_pos_m_rb: [Vector2<f64>; NUM_CORNERS],

    /// The largest corner radius, used to normalise rotational demands.
    rot_radius_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors in the configured geometry.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("Corner {0} has an invalid position {1:?}, corners must be a \
        finite non-zero distance from the centroid")]
    InvalidCornerPos(usize, [f64; 2]),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for WheelState {
    fn default() -> Self {
        Self {
            str_abs_pos_rad: [0.0; NUM_CORNERS],
            drv_speed_norm: [0.0; NUM_CORNERS],
        }
    }
}

impl WheelState {
    /// Build a wheel state from raw module sensing, normalising the measured
    /// drive velocities by the configured maximum speed.
    pub fn from_sense(sense: &SwerveSense, max_speed_ms: f64) -> Self {
        let mut ws = WheelState::default();

        for i in 0..NUM_CORNERS {
            ws.str_abs_pos_rad[i] = wrap_2pi(sense.str_abs_pos_rad[i]);
            ws.drv_speed_norm[i] = clamp(
                &(sense.drv_speed_ms[i] / max_speed_ms),
                &-1.0,
                &1.0,
            );
        }

        ws
    }
}

impl Geometry {
    /// Build the geometry from the module parameters.
    pub fn from_params(
        corner_pos_m_rb: &[[f64; 2]; NUM_CORNERS],
    ) -> Result<Self, GeometryError> {
        let mut corners = [Vector2::zeros(); NUM_CORNERS];
        let mut rot_radius_m = 0f64;

        for (i, pos) in corner_pos_m_rb.iter().enumerate() {
            let v = Vector2::new(pos[0], pos[1]);
            let radius = v.norm();

            if !radius.is_finite() || radius == 0.0 {
                return Err(GeometryError::InvalidCornerPos(i, *pos));
            }

            corners[i] = v;
            rot_radius_m = rot_radius_m.max(radius);
        }

        Ok(Self {
            corner_pos_m_rb: corners,
            rot_radius_m,
        })
    }

    /// The offset of the given corner from the centroid.
    pub fn corner_pos_m_rb(&self, index: usize) -> Vector2<f64> {
        self.corner_pos_m_rb[index]
    }

    /// The largest corner radius, which normalises rotational demands.
    pub fn rot_radius_m(&self) -> f64 {
        self.rot_radius_m
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Inverse kinematics - convert a chassis drive command into a target wheel
/// state.
///
/// The previous commanded wheel state provides angle continuity: corners with
/// (near-)zero demanded speed hold their previous angle, and every corner's
/// steer travel is bounded to 90 degrees by flip resolution against its
/// previous angle.
///
/// Returns the new wheel state and a flag indicating whether saturation
/// scaling was applied. When any corner's demanded magnitude exceeds 1 all
/// four are rescaled by the common maximum, preserving the relative corner
/// magnitudes.
pub fn cmd_to_wheel_state(
    cmd: &DriveCmd,
    prev: &WheelState,
    geom: &Geometry,
) -> (WheelState, bool) {
    let translation = Vector2::new(cmd.fwd, cmd.str);

    // Per-corner velocity vectors
    let mut corner_vels = [Vector2::zeros(); NUM_CORNERS];
    let mut max_mag = 0f64;

    for i in 0..NUM_CORNERS {
        let rot_vel = perp(&geom.corner_pos_m_rb[i]) * (cmd.rot / geom.rot_radius_m);
        corner_vels[i] = translation + rot_vel;
        max_mag = max_mag.max(corner_vels[i].norm());
    }

    // Saturation scaling - preserve the corner magnitude ratios rather than
    // letting individual corners clip
    let saturated = max_mag > 1.0;
    if saturated {
        for vel in corner_vels.iter_mut() {
            *vel /= max_mag;
        }
    }

    let mut ws = WheelState::default();

    for i in 0..NUM_CORNERS {
        let mag = corner_vels[i].norm();

        if mag < ZERO_SPEED_EPS {
            // Stationary corner - hold the previous angle
            ws.str_abs_pos_rad[i] = prev.str_abs_pos_rad[i];
            ws.drv_speed_norm[i] = 0.0;
        }
        else {
            let target_rad = corner_vels[i].y.atan2(corner_vels[i].x);

            let (angle_rad, speed_norm) =
                resolve_flip(prev.str_abs_pos_rad[i], target_rad, mag);

            ws.str_abs_pos_rad[i] = angle_rad;
            ws.drv_speed_norm[i] = speed_norm;
        }
    }

    (ws, saturated)
}

/// Forward kinematics - recover the chassis motion from a measured wheel
/// state.
///
/// Translation is the average of the four corner velocity vectors, rotation
/// the average of each corner's perpendicular velocity component divided by
/// its radius. All four corners are weighted identically, so a single noisy
/// module contributes no more than a quarter of the solution.
pub fn wheel_state_to_cmd(ws: &WheelState, geom: &Geometry) -> DriveCmd {
    let mut translation = Vector2::zeros();
    let mut rot = 0f64;

    for i in 0..NUM_CORNERS {
        let (sin, cos) = ws.str_abs_pos_rad[i].sin_cos();
        let vel = Vector2::new(cos, sin) * ws.drv_speed_norm[i];

        let r = &geom.corner_pos_m_rb[i];

        translation += vel;
        rot += vel.dot(&perp(r)) / r.norm_squared();
    }

    translation /= NUM_CORNERS as f64;
    rot *= geom.rot_radius_m / NUM_CORNERS as f64;

    DriveCmd {
        fwd: translation.x,
        str: translation.y,
        rot,
    }
}

/// Resolve a wheel flip - find the steer target closest to the current angle.
///
/// Computes the shortest signed angular difference from `cur_rad` to
/// `target_rad`. If that difference exceeds 90 degrees the drive direction is
/// reversed and the steer target moved by half a turn, so that the module
/// never has to steer through more than 90 degrees for one command.
///
/// Returns the resolved absolute steer angle (in [0, 2pi)) and the signed
/// drive speed.
pub fn resolve_flip(cur_rad: f64, target_rad: f64, speed_norm: f64) -> (f64, f64) {
    let mut d = ang_shortest_dist(cur_rad, target_rad);
    let mut speed = speed_norm;

    if d.abs() > std::f64::consts::FRAC_PI_2 {
        d -= d.signum() * std::f64::consts::PI;
        speed = -speed;
    }

    (wrap_2pi(cur_rad + d), speed)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// The perpendicular of a vector, i.e. the vector rotated by +90 degrees.
/// `rot * perp(r)` is the velocity of a point at offset `r` under rotation
/// rate `rot` about the origin.
fn perp(v: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-v.y, v.x)
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;
    const FRAC_PI_2: f64 = std::f64::consts::FRAC_PI_2;

    /// Square drivetrain, corners 0.3 m out along each diagonal.
    fn square_geom() -> Geometry {
        Geometry::from_params(&[
            [0.3, 0.3],
            [0.3, -0.3],
            [-0.3, 0.3],
            [-0.3, -0.3],
        ])
        .unwrap()
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        assert!(Geometry::from_params(&[
            [0.3, 0.3],
            [0.3, -0.3],
            [0.0, 0.0],
            [-0.3, -0.3],
        ])
        .is_err());
    }

    #[test]
    fn test_pure_forward() {
        let geom = square_geom();
        let cmd = DriveCmd { fwd: 1.0, str: 0.0, rot: 0.0 };

        let (ws, saturated) =
            cmd_to_wheel_state(&cmd, &WheelState::default(), &geom);

        assert!(!saturated);
        for i in 0..NUM_CORNERS {
            assert!(ws.str_abs_pos_rad[i].abs() < 1e-12);
            assert!((ws.drv_speed_norm[i] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_pure_rotation() {
        let geom = square_geom();
        let cmd = DriveCmd { fwd: 0.0, str: 0.0, rot: 1.0 };

        let (ws, saturated) =
            cmd_to_wheel_state(&cmd, &WheelState::default(), &geom);

        assert!(!saturated);
        for i in 0..NUM_CORNERS {
            // Equal radii, so every corner runs at full speed (possibly
            // reversed by flip resolution)
            assert!((ws.drv_speed_norm[i].abs() - 1.0).abs() < 1e-12);

            // The commanded velocity must be perpendicular to the corner
            // offset: reconstruct it and check the dot product
            let (sin, cos) = ws.str_abs_pos_rad[i].sin_cos();
            let vel = Vector2::new(cos, sin) * ws.drv_speed_norm[i];
            assert!(vel.dot(&geom.corner_pos_m_rb(i)).abs() < 1e-12);

            // And it must point in the direction of positive rotation
            assert!(vel.dot(&perp(&geom.corner_pos_m_rb(i))) > 0.0);
        }
    }

    #[test]
    fn test_round_trip() {
        let geom = square_geom();

        let cmds = [
            DriveCmd { fwd: 0.5, str: 0.0, rot: 0.0 },
            DriveCmd { fwd: 0.0, str: -0.4, rot: 0.0 },
            DriveCmd { fwd: 0.0, str: 0.0, rot: 0.7 },
            DriveCmd { fwd: 0.3, str: 0.2, rot: -0.25 },
            DriveCmd { fwd: -0.2, str: 0.35, rot: 0.1 },
        ];

        let mut prev = WheelState::default();

        for cmd in cmds.iter() {
            let (ws, saturated) = cmd_to_wheel_state(cmd, &prev, &geom);
            assert!(!saturated);

            let recovered = wheel_state_to_cmd(&ws, &geom);

            assert!((recovered.fwd - cmd.fwd).abs() < 1e-9);
            assert!((recovered.str - cmd.str).abs() < 1e-9);
            assert!((recovered.rot - cmd.rot).abs() < 1e-9);

            prev = ws;
        }
    }

    #[test]
    fn test_round_trip_after_flip() {
        let geom = square_geom();

        // Drive forward, then command a reversal - flip resolution will
        // reverse the drive signs rather than steering 180 degrees, but the
        // recovered chassis motion must be unaffected
        let (fwd_ws, _) = cmd_to_wheel_state(
            &DriveCmd { fwd: 0.5, str: 0.0, rot: 0.0 },
            &WheelState::default(),
            &geom,
        );

        let cmd = DriveCmd { fwd: -0.5, str: 0.0, rot: 0.0 };
        let (ws, _) = cmd_to_wheel_state(&cmd, &fwd_ws, &geom);

        // Flipped, not steered
        for i in 0..NUM_CORNERS {
            assert!(ws.str_abs_pos_rad[i].abs() < 1e-12);
            assert!((ws.drv_speed_norm[i] + 0.5).abs() < 1e-12);
        }

        let recovered = wheel_state_to_cmd(&ws, &geom);
        assert!((recovered.fwd - cmd.fwd).abs() < 1e-9);
        assert!(recovered.str.abs() < 1e-9);
        assert!(recovered.rot.abs() < 1e-9);
    }

    #[test]
    fn test_saturation_preserves_ratios() {
        let geom = square_geom();
        let cmd = DriveCmd { fwd: 1.0, str: 0.0, rot: 1.0 };

        // Unscaled corner magnitudes, computed directly from the
        // decomposition
        let mut raw_mags = [0f64; NUM_CORNERS];
        for i in 0..NUM_CORNERS {
            let r = geom.corner_pos_m_rb(i);
            let vel = Vector2::new(cmd.fwd, cmd.str)
                + perp(&r) * (cmd.rot / geom.rot_radius_m());
            raw_mags[i] = vel.norm();
        }

        let (ws, saturated) =
            cmd_to_wheel_state(&cmd, &WheelState::default(), &geom);
        assert!(saturated);

        let max_mag = ws
            .drv_speed_norm
            .iter()
            .fold(0f64, |m, s| m.max(s.abs()));
        assert!((max_mag - 1.0).abs() < 1e-9);

        // Relative magnitudes unchanged
        for i in 0..NUM_CORNERS {
            for j in 0..NUM_CORNERS {
                let scaled_ratio =
                    ws.drv_speed_norm[i].abs() / ws.drv_speed_norm[j].abs();
                let raw_ratio = raw_mags[i] / raw_mags[j];
                assert!((scaled_ratio - raw_ratio).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_zero_cmd_holds_angles() {
        let geom = square_geom();

        let prev = WheelState {
            str_abs_pos_rad: [0.5, 1.5, 2.5, 3.5],
            drv_speed_norm: [0.3; NUM_CORNERS],
        };

        let (ws, saturated) =
            cmd_to_wheel_state(&DriveCmd::default(), &prev, &geom);

        assert!(!saturated);
        assert_eq!(ws.str_abs_pos_rad, prev.str_abs_pos_rad);
        assert_eq!(ws.drv_speed_norm, [0.0; NUM_CORNERS]);
    }

    #[test]
    fn test_flip_bound() {
        // Over a grid of (current, target) pairs the resolved steer travel
        // never exceeds 90 degrees
        for c in 0..72 {
            for t in 0..72 {
                let cur = c as f64 * PI / 36.0;
                let target = t as f64 * PI / 36.0;

                let (resolved, speed) = resolve_flip(cur, target, 1.0);

                let travel = ang_shortest_dist(cur, resolved);
                assert!(
                    travel.abs() <= FRAC_PI_2 + 1e-12,
                    "travel {} for cur {} target {}",
                    travel,
                    cur,
                    target
                );

                // The resolved angle/speed pair is equivalent to the request
                let d = ang_shortest_dist(resolved, target);
                if speed > 0.0 {
                    assert!(d.abs() < 1e-9);
                }
                else {
                    assert!((d.abs() - PI).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_from_sense_normalisation() {
        let sense = SwerveSense {
            str_abs_pos_rad: [-0.5, 0.0, 7.0, PI],
            drv_speed_ms: [1.0, -2.0, 5.0, 0.0],
        };

        let ws = WheelState::from_sense(&sense, 4.0);

        // Angles wrapped into [0, 2pi)
        for angle in ws.str_abs_pos_rad.iter() {
            assert!(*angle >= 0.0 && *angle < 2.0 * PI);
        }

        assert!((ws.drv_speed_norm[0] - 0.25).abs() < 1e-12);
        assert!((ws.drv_speed_norm[1] + 0.5).abs() < 1e-12);
        // Over-speed readings clamp at the normalised limit
        assert_eq!(ws.drv_speed_norm[2], 1.0);
        assert_eq!(ws.drv_speed_norm[3], 0.0);
    }
}
