#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` data model for a swerve robot's pose and balance targets."]
#![doc = ""]
#![doc = "This crate provides 2-D positions whose coordinates may be unset, poses built"]
#![doc = "from them, and the `Robot` record holding the current pose, the centre-of-mass"]
#![doc = "offset and the convergence point used by the drive behaviours."]

use core::f64::consts::PI;
use core::fmt;
use libm::{atan2, sqrt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub mod frame;
pub use error::ModelError;

/// A 2-D position in meters whose coordinates may individually be unset.
///
/// An unset coordinate is `None`, which keeps it distinct from a legitimate
/// `0.0`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position2D {
    /// Field x coordinate (m), or `None` when unset.
    pub x: Option<f64>,
    /// Field y coordinate (m), or `None` when unset.
    pub y: Option<f64>,
}

impl Position2D {
    /// Construct a position with both coordinates set.
    pub const fn new(x: f64, y: f64) -> Self {
        Position2D {
            x: Some(x),
            y: Some(y),
        }
    }

    /// Construct a position from coordinates that may be unset.
    pub const fn partial(x: Option<f64>, y: Option<f64>) -> Self {
        Position2D { x, y }
    }

    /// A position with both coordinates unset.
    pub const fn unset() -> Self {
        Position2D { x: None, y: None }
    }

    /// The origin `(0, 0)`.
    pub const fn origin() -> Self {
        Position2D::new(0.0, 0.0)
    }

    /// Returns `true` when both coordinates are set.
    pub const fn is_complete(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }

    /// Both coordinates, or an error naming the first unset one.
    pub fn coordinates(&self) -> Result<(f64, f64), ModelError> {
        let x = self.x.ok_or(ModelError::UnsetCoordinate("x is unset"))?;
        let y = self.y.ok_or(ModelError::UnsetCoordinate("y is unset"))?;
        Ok((x, y))
    }

    /// Per-axis offset from `self` to `other`.
    ///
    /// An axis is `None` when either position leaves it unset.
    pub fn offset_to(&self, other: &Position2D) -> (Option<f64>, Option<f64>) {
        let dx = match (self.x, other.x) {
            (Some(a), Some(b)) => Some(b - a),
            _ => None,
        };
        let dy = match (self.y, other.y) {
            (Some(a), Some(b)) => Some(b - a),
            _ => None,
        };
        (dx, dy)
    }

    /// Euclidean distance to `other`.
    ///
    /// # Errors
    ///
    /// Returns `Err(ModelError::UnsetCoordinate)` if any coordinate of either
    /// position is unset.
    pub fn distance_to(&self, other: &Position2D) -> Result<f64, ModelError> {
        let (x0, y0) = self.coordinates()?;
        let (x1, y1) = other.coordinates()?;
        let (dx, dy) = (x1 - x0, y1 - y0);
        Ok(sqrt(dx * dx + dy * dy))
    }

    /// Field bearing (rad) from `self` to `other`.
    ///
    /// # Errors
    ///
    /// Returns `Err(ModelError::UnsetCoordinate)` if any coordinate is unset.
    pub fn bearing_to(&self, other: &Position2D) -> Result<f64, ModelError> {
        let (x0, y0) = self.coordinates()?;
        let (x1, y1) = other.coordinates()?;
        Ok(atan2(y1 - y0, x1 - x0))
    }
}

struct Coord(Option<f64>);

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{:.2}", v),
            None => f.write_str("unset"),
        }
    }
}

impl fmt::Display for Position2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {}, y: {})", Coord(self.x), Coord(self.y))
    }
}

/// A position combined with a heading.
///
/// Both parts may be unset; `Pose::default()` leaves them so.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Field position, or `None` when unset.
    pub position: Option<Position2D>,
    /// Heading (rad), or `None` when unset.
    pub angle: Option<f64>,
}

impl Pose {
    /// Construct a pose with both position and heading set.
    ///
    /// # Arguments
    ///
    /// * `position`: Field position.
    /// * `angle`: Heading in radians.
    pub const fn new(position: Position2D, angle: f64) -> Self {
        Pose {
            position: Some(position),
            angle: Some(angle),
        }
    }

    /// Convenience constructor from raw coordinates.
    pub const fn from_xy(x: f64, y: f64, angle: f64) -> Self {
        Pose::new(Position2D::new(x, y), angle)
    }

    /// Returns `true` when the position (both coordinates) and heading are set.
    pub fn is_complete(&self) -> bool {
        self.angle.is_some() && self.position.is_some_and(|p| p.is_complete())
    }

    /// The heading, or an error when unset.
    pub fn heading(&self) -> Result<f64, ModelError> {
        self.angle
            .ok_or(ModelError::IncompletePose("angle is unset"))
    }

    /// The position, or an error when unset.
    pub fn position(&self) -> Result<Position2D, ModelError> {
        self.position
            .ok_or(ModelError::IncompletePose("position is unset"))
    }

    /// `(x, y, angle)` when every part of the pose is set.
    pub fn components(&self) -> Result<(f64, f64, f64), ModelError> {
        let (x, y) = self.position()?.coordinates()?;
        Ok((x, y, self.heading()?))
    }

    /// Normalize an angle to be within `[-PI, PI)`.
    ///
    /// Angles at `PI` will be normalized to `-PI`.
    pub fn normalize_angle(angle: f64) -> f64 {
        let a = angle % (2.0 * PI);
        if a >= PI {
            a - 2.0 * PI
        } else if a < -PI {
            a + 2.0 * PI
        } else {
            a
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(p) => write!(f, "{}", p)?,
            None => f.write_str("(unset)")?,
        }
        match self.angle {
            Some(a) => write!(f, " θ: {:.2} rad", a),
            None => f.write_str(" θ: unset"),
        }
    }
}

/// Default convergence target x coordinate (m).
pub const DEFAULT_CONVERGENCE_X: f64 = 3.0;

/// Robot state tracked by the balance and convergence behaviours.
///
/// Every field is public and freely mutable; nothing here enforces a range.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Robot {
    /// Gyro heading (rad).
    pub angle: f64,
    /// Current field pose.
    pub current_position: Pose,
    /// Centre of mass relative to the robot centre, in the robot frame (m).
    pub centre_of_mass_position: Position2D,
    /// Point the robot converges on. Unset axes are left uncontrolled.
    pub convergence_point: Position2D,
}

impl Default for Robot {
    /// Heading 0 at the origin, centre of mass at the robot centre and a
    /// convergence point of `(3, unset)`.
    fn default() -> Self {
        Robot {
            angle: 0.0,
            current_position: Pose::new(Position2D::origin(), 0.0),
            centre_of_mass_position: Position2D::origin(),
            convergence_point: Position2D::partial(Some(DEFAULT_CONVERGENCE_X), None),
        }
    }
}

impl Robot {
    /// Replace the convergence point.
    pub fn set_convergence_point(&mut self, point: Position2D) {
        self.convergence_point = point;
    }

    /// Field position of the centre of mass.
    ///
    /// The centre-of-mass offset is rotated by the gyro heading `angle` and
    /// added to the current position.
    ///
    /// # Errors
    ///
    /// Returns `Err(ModelError::IncompletePose)` if the current position is
    /// unset, or `Err(ModelError::UnsetCoordinate)` if it or the centre of
    /// mass has an unset coordinate.
    pub fn centre_of_mass_world(&self) -> Result<Position2D, ModelError> {
        let (x, y) = self.current_position.position()?.coordinates()?;
        let (ox, oy) = self.centre_of_mass_position.coordinates()?;
        let (dx, dy) = frame::rotate(ox, oy, self.angle);
        Ok(Position2D::new(x + dx, y + dy))
    }
}

impl fmt::Display for Robot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Robot (θ: {:.2} rad, pose: {}, com: {}, converge: {})",
            self.angle, self.current_position, self.centre_of_mass_position, self.convergence_point
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_2;
    const EPSILON: f64 = 1e-6;

    #[test]
    fn test_position_default_is_unset() {
        let p = Position2D::default();
        assert_eq!(p.x, None);
        assert_eq!(p.y, None);
        assert_eq!(p, Position2D::unset());
    }

    #[test]
    fn test_position_new_sets_both() {
        let p = Position2D::new(3.0, 4.0);
        assert_eq!(p.x, Some(3.0));
        assert_eq!(p.y, Some(4.0));
        assert!(p.is_complete());
    }

    #[test]
    fn test_zero_is_not_unset() {
        let p = Position2D::partial(Some(0.0), None);
        assert_eq!(p.x, Some(0.0));
        assert_ne!(p, Position2D::unset());
        assert!(!p.is_complete());
    }

    #[test]
    fn test_pose_default_is_unset() {
        let pose = Pose::default();
        assert_eq!(pose.position, None);
        assert_eq!(pose.angle, None);
        assert!(!pose.is_complete());
        assert!(matches!(pose.heading(), Err(ModelError::IncompletePose("angle is unset"))));
    }

    #[test]
    fn test_robot_default() {
        let robot = Robot::default();
        assert_eq!(robot.angle, 0.0);
        assert_eq!(
            robot.current_position,
            Pose {
                position: Some(Position2D::new(0.0, 0.0)),
                angle: Some(0.0)
            }
        );
        assert_eq!(robot.centre_of_mass_position, Position2D::new(0.0, 0.0));
        assert_eq!(robot.convergence_point.x, Some(3.0));
        assert_eq!(robot.convergence_point.y, None);
    }

    #[test]
    fn test_robot_fields_are_mutable() {
        let mut robot = Robot::default();
        robot.angle = 1.5;
        robot.set_convergence_point(Position2D::new(-1.0, 2.0));
        robot.centre_of_mass_position.y = None;
        assert_eq!(robot.angle, 1.5);
        assert_eq!(robot.convergence_point, Position2D::new(-1.0, 2.0));
        assert_eq!(robot.centre_of_mass_position.y, None);
    }

    #[test]
    fn test_offset_to_skips_unset_axes() {
        let here = Position2D::new(1.0, 1.0);
        let target = Position2D::partial(Some(3.0), None);
        assert_eq!(here.offset_to(&target), (Some(2.0), None));
    }

    #[test]
    fn test_distance_and_bearing() {
        let a = Position2D::new(0.0, 0.0);
        let b = Position2D::new(3.0, 4.0);
        assert!((a.distance_to(&b).unwrap() - 5.0).abs() < EPSILON);
        assert!((a.bearing_to(&Position2D::new(0.0, 2.0)).unwrap() - FRAC_PI_2).abs() < EPSILON);
        let partial = Position2D::partial(Some(3.0), None);
        assert!(matches!(a.distance_to(&partial), Err(ModelError::UnsetCoordinate("y is unset"))));
    }

    #[test]
    fn test_pose_normalization() {
        assert!((Pose::normalize_angle(0.0) - 0.0).abs() < EPSILON);
        assert!((Pose::normalize_angle(PI) - (-PI)).abs() < EPSILON);
        assert!((Pose::normalize_angle(2.5 * PI) - 0.5 * PI).abs() < EPSILON);
        assert!((Pose::normalize_angle(-2.5 * PI) - -0.5 * PI).abs() < EPSILON);
    }

    #[test]
    fn test_centre_of_mass_world_rotates_with_heading() {
        let mut robot = Robot::default();
        robot.current_position = Pose::from_xy(1.0, 2.0, FRAC_PI_2);
        robot.angle = FRAC_PI_2;
        robot.centre_of_mass_position = Position2D::new(0.1, 0.0);
        let com = robot.centre_of_mass_world().unwrap();
        assert!((com.x.unwrap() - 1.0).abs() < EPSILON);
        assert!((com.y.unwrap() - 2.1).abs() < EPSILON);
    }

    #[test]
    fn test_centre_of_mass_world_needs_position() {
        let mut robot = Robot::default();
        robot.current_position = Pose::default();
        assert!(matches!(
            robot.centre_of_mass_world(),
            Err(ModelError::IncompletePose("position is unset"))
        ));
    }

    #[test]
    fn test_display_marks_unset() {
        let p = Position2D::partial(Some(3.0), None);
        assert_eq!(format!("{}", p), "(x: 3.00, y: unset)");
        assert_eq!(format!("{}", Pose::default()), "(unset) θ: unset");
    }
}
