use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::{error, info};

use robot_behaviour::{BalanceConfig, ConvergenceConfig, GridSlot, PoseTolerance};
use robot_model::Position2D;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "BALANCE_BOT";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub simulation: SimulationSettings,
    pub behaviour: BehaviourSettings,
    #[serde(default)]
    pub convergence: ConvergenceConfig,
    #[serde(default)]
    pub balance: BalanceConfig,
    #[serde(default)]
    pub pose_tolerance: PoseTolerance,
    pub watchdog: WatchdogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationSettings {
    pub dt_s: f64,
    pub duration_s: f64,
    pub seed: Option<u64>,
    pub noise_deg: f64,
    #[serde(default)]
    pub initial_pitch_deg: f64,
    #[serde(default)]
    pub initial_roll_deg: f64,
    pub pose_max_speed: f64,
    pub pose_max_turn_rate: f64,
    pub platform: PlatformSettings,
}

/// The tilting platform the robot balances on.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PlatformSettings {
    pub centre_x: f64,
    pub centre_y: f64,
    pub tilt_deg_per_m: f64,
    pub max_tilt_deg: f64,
    pub time_constant_s: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviourKind {
    Converge,
    Balance,
    Pose,
    XLock,
    Manual,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BehaviourSettings {
    pub kind: BehaviourKind,
    pub rate_hz: u32,
    pub target_slot: GridSlot,
    #[serde(default)]
    pub hold: bool,
    #[serde(default = "default_convergence_point")]
    pub convergence_point: Position2D,
    #[serde(default = "Position2D::origin")]
    pub centre_of_mass: Position2D,
}

fn default_convergence_point() -> Position2D {
    robot_model::Robot::default().convergence_point
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WatchdogSettings {
    pub period_ms: u64,
    pub timeout_ms: u64,
}

fn require(ok: bool, msg: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Message(msg.into()))
    }
}

impl Settings {
    fn check(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        let platform = &sim.platform;

        for (name, v) in [
            ("simulation.dt_s", sim.dt_s),
            ("simulation.duration_s", sim.duration_s),
            ("simulation.noise_deg", sim.noise_deg),
            ("simulation.initial_pitch_deg", sim.initial_pitch_deg),
            ("simulation.initial_roll_deg", sim.initial_roll_deg),
            ("simulation.pose_max_speed", sim.pose_max_speed),
            ("simulation.pose_max_turn_rate", sim.pose_max_turn_rate),
            ("simulation.platform.centre_x", platform.centre_x),
            ("simulation.platform.centre_y", platform.centre_y),
            ("simulation.platform.tilt_deg_per_m", platform.tilt_deg_per_m),
            ("simulation.platform.max_tilt_deg", platform.max_tilt_deg),
            ("simulation.platform.time_constant_s", platform.time_constant_s),
            ("balance.kp", self.balance.kp),
            ("balance.ki", self.balance.ki),
            ("balance.kd", self.balance.kd),
            ("pose_tolerance.distance", self.pose_tolerance.distance),
            ("pose_tolerance.angle", self.pose_tolerance.angle),
        ] {
            if !v.is_finite() {
                return Err(ConfigError::Message(format!("{name} must be finite")));
            }
        }
        for (name, v) in [
            ("behaviour.convergence_point.x", self.behaviour.convergence_point.x),
            ("behaviour.convergence_point.y", self.behaviour.convergence_point.y),
            ("behaviour.centre_of_mass.x", self.behaviour.centre_of_mass.x),
            ("behaviour.centre_of_mass.y", self.behaviour.centre_of_mass.y),
        ] {
            if v.is_some_and(|v| !v.is_finite()) {
                return Err(ConfigError::Message(format!("{name} must be finite")));
            }
        }

        require(sim.dt_s > 0.0, "simulation.dt_s must be positive")?;
        require(sim.duration_s >= 0.0, "simulation.duration_s must be non-negative")?;
        require(sim.noise_deg >= 0.0, "simulation.noise_deg must be non-negative")?;
        require(sim.pose_max_speed > 0.0, "simulation.pose_max_speed must be positive")?;
        require(
            sim.pose_max_turn_rate >= 0.0,
            "simulation.pose_max_turn_rate must be non-negative",
        )?;
        require(
            platform.max_tilt_deg >= 0.0,
            "simulation.platform.max_tilt_deg must be non-negative",
        )?;
        require(
            platform.time_constant_s > 0.0,
            "simulation.platform.time_constant_s must be positive",
        )?;
        require(
            self.pose_tolerance.distance >= 0.0 && self.pose_tolerance.angle >= 0.0,
            "pose_tolerance values must be non-negative",
        )?;
        require(self.behaviour.rate_hz > 0, "behaviour.rate_hz must be non-zero")?;
        require(self.watchdog.period_ms > 0, "watchdog.period_ms must be non-zero")?;

        self.convergence
            .validate()
            .map_err(|e| ConfigError::Message(format!("convergence: {e}")))
    }
}

pub fn load_config(path: &str) -> Result<Settings, ConfigError> {
    info!("Attempting to load configuration from {}", path);

    let settings = Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(true))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()
        .and_then(|c| c.try_deserialize::<Settings>())
        .and_then(|s| s.check().map(|_| s));

    match settings {
        Ok(settings) => {
            info!("Successfully loaded configuration: {:?}", settings);
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_str(toml: &str) -> Result<Settings, ConfigError> {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()
    }

    #[test]
    fn test_default_file_parses() {
        let settings = from_str(include_str!("../config/default.toml")).unwrap();
        assert!(settings.check().is_ok());
        assert_eq!(settings.behaviour.kind, BehaviourKind::Balance);
        assert_eq!(settings.behaviour.target_slot, GridSlot::Centre2);
        assert_eq!(settings.behaviour.convergence_point, Position2D::partial(Some(3.0), None));
        assert_eq!(settings.convergence, ConvergenceConfig::default());
        assert_eq!(settings.balance, BalanceConfig::default());
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let toml = r#"
            [simulation]
            dt_s = 0.01
            duration_s = 1.0
            noise_deg = 0.0
            pose_max_speed = 1.0
            pose_max_turn_rate = 1.0
            [simulation.platform]
            centre_x = 0.0
            centre_y = 0.0
            tilt_deg_per_m = 10.0
            max_tilt_deg = 10.0
            time_constant_s = 0.1
            [behaviour]
            kind = "x_lock"
            rate_hz = 10
            target_slot = "inner1"
            [watchdog]
            period_ms = 10
            timeout_ms = 50
        "#;
        let settings = from_str(toml).unwrap();
        assert_eq!(settings.behaviour.kind, BehaviourKind::XLock);
        assert_eq!(settings.simulation.seed, None);
        assert_eq!(settings.behaviour.centre_of_mass, Position2D::origin());
        assert_eq!(settings.behaviour.convergence_point.x, Some(3.0));
        assert_eq!(settings.pose_tolerance, PoseTolerance::default());
    }

    fn defaults() -> Settings {
        from_str(include_str!("../config/default.toml")).unwrap()
    }

    fn rejected(edit: impl FnOnce(&mut Settings), field: &str) {
        let mut settings = defaults();
        edit(&mut settings);
        match settings.check() {
            Err(ConfigError::Message(msg)) => {
                assert!(msg.contains(field), "expected {field} in {msg:?}")
            }
            other => panic!("expected {field} to be rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_check_rejects_zero_rate() {
        rejected(|s| s.behaviour.rate_hz = 0, "behaviour.rate_hz");
    }

    #[test]
    fn test_check_rejects_negative_duration() {
        rejected(|s| s.simulation.duration_s = -1.0, "simulation.duration_s");
    }

    #[test]
    fn test_check_rejects_negative_max_tilt() {
        rejected(|s| s.simulation.platform.max_tilt_deg = -1.0, "max_tilt_deg");
    }

    #[test]
    fn test_check_rejects_non_positive_pose_speed() {
        rejected(|s| s.simulation.pose_max_speed = 0.0, "pose_max_speed");
    }

    #[test]
    fn test_check_rejects_negative_turn_rate() {
        rejected(|s| s.simulation.pose_max_turn_rate = -1.0, "pose_max_turn_rate");
    }

    #[test]
    fn test_check_rejects_non_finite_values() {
        rejected(|s| s.simulation.dt_s = f64::NAN, "simulation.dt_s");
        rejected(|s| s.simulation.duration_s = f64::INFINITY, "simulation.duration_s");
        rejected(|s| s.simulation.platform.tilt_deg_per_m = f64::NAN, "tilt_deg_per_m");
        rejected(|s| s.behaviour.convergence_point.x = Some(f64::NAN), "convergence_point.x");
    }

    #[test]
    fn test_check_rejects_bad_convergence_tuning() {
        rejected(|s| s.convergence.max_speed = f64::NAN, "convergence");
        rejected(|s| s.convergence.sigmoid_gain = -0.1, "convergence");
    }

    #[test]
    fn test_zero_duration_is_allowed() {
        let mut settings = defaults();
        settings.simulation.duration_s = 0.0;
        settings.simulation.pose_max_turn_rate = 0.0;
        assert!(settings.check().is_ok());
    }
}
