//! Simulated drivebase and tilting platform.
//!
//! The sensor thread integrates the last applied drive command into the
//! robot pose and lets the platform tilt towards wherever the centre of mass
//! sits. The control thread applies commands arriving on the command topic.

use parking_lot::RwLock;
use rand::{Rng, SeedableRng, rngs::StdRng};
use spin_sleep::SpinSleeper;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
    time::Duration,
};
use tracing::{debug, info, warn};

use robot_behaviour::{DriveCommand, TargetPose};
use robot_model::{ModelError, Pose, Robot};

use crate::blackboard::Blackboard;
use crate::bus::Topic;
use crate::config::{PlatformSettings, SimulationSettings};

/// First-order model of a see-saw platform.
///
/// Pitch follows the centre of mass' x offset from the pivot and roll follows
/// the negated y offset, both clamped to the platform's travel.
#[derive(Debug, Clone)]
pub struct Platform {
    settings: PlatformSettings,
    /// rad
    pub pitch: f64,
    /// rad
    pub roll: f64,
}

impl Platform {
    pub fn new(settings: PlatformSettings, pitch: f64, roll: f64) -> Self {
        Self {
            settings,
            pitch,
            roll,
        }
    }

    /// Tilt the platform settles at with the centre of mass at `(x, y)`.
    pub fn resting_tilt(&self, x: f64, y: f64) -> (f64, f64) {
        let max = self.settings.max_tilt_deg;
        let per_m = self.settings.tilt_deg_per_m;
        let pitch = (per_m * (x - self.settings.centre_x)).clamp(-max, max);
        let roll = (per_m * (self.settings.centre_y - y)).clamp(-max, max);
        (pitch.to_radians(), roll.to_radians())
    }

    /// Advance the tilt by `dt` seconds towards its resting tilt.
    pub fn step(&mut self, robot: &Robot, dt: f64) -> Result<(), ModelError> {
        let com = robot.centre_of_mass_world()?;
        let (x, y) = com.coordinates()?;
        let (pitch, roll) = self.resting_tilt(x, y);
        let alpha = (dt / self.settings.time_constant_s).min(1.0);
        self.pitch += (pitch - self.pitch) * alpha;
        self.roll += (roll - self.roll) * alpha;
        Ok(())
    }
}

/// Drivebase limits used when resolving pose targets.
#[derive(Debug, Clone, Copy)]
pub struct DriveLimits {
    pub max_speed: f64,
    pub max_turn_rate: f64,
}

/// Apply `command` to `robot` for `dt` seconds.
///
/// Velocity commands are integrated directly. Pose targets are approached
/// at the drivebase limits. The gyro angle tracks the pose heading and is
/// left unnormalized so whole turns are kept.
pub fn integrate(
    robot: &Robot,
    command: &DriveCommand,
    limits: DriveLimits,
    dt: f64,
) -> Result<Robot, ModelError> {
    let (x, y, heading) = robot.current_position.components()?;

    let (nx, ny, nh) = match command {
        DriveCommand::PoseTarget(target) => approach(x, y, heading, target, limits, dt),
        other => {
            let v = other.field_velocity(heading).unwrap_or_default();
            (x + v.vx * dt, y + v.vy * dt, heading + v.omega * dt)
        }
    };

    let mut next = *robot;
    next.current_position = Pose::from_xy(nx, ny, nh);
    next.angle = nh;
    Ok(next)
}

fn approach(
    x: f64,
    y: f64,
    heading: f64,
    target: &TargetPose,
    limits: DriveLimits,
    dt: f64,
) -> (f64, f64, f64) {
    let (dx, dy) = (target.x - x, target.y - y);
    let distance = dx.hypot(dy);
    let step = limits.max_speed * dt;
    let (nx, ny) = if distance <= step {
        (target.x, target.y)
    } else {
        (x + dx / distance * step, y + dy / distance * step)
    };

    let dh = target.angle - heading;
    let turn = limits.max_turn_rate * dt;
    let nh = heading + dh.clamp(-turn, turn);
    (nx, ny, nh)
}

/// Spawn the sensor thread.
///
/// Publishes a robot snapshot every `dt_s` and mirrors it, with the noisy
/// gyro tilt, onto the blackboard.
pub fn spawn_sensor(
    settings: &SimulationSettings,
    bb: Blackboard,
    applied: Arc<RwLock<DriveCommand>>,
    robot_topic: Topic<Robot>,
    running: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>> {
    let dt = settings.dt_s;
    let noise = settings.noise_deg.to_radians();
    let limits = DriveLimits {
        max_speed: settings.pose_max_speed,
        max_turn_rate: settings.pose_max_turn_rate,
    };
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut platform = Platform::new(
        settings.platform,
        settings.initial_pitch_deg.to_radians(),
        settings.initial_roll_deg.to_radians(),
    );

    std::thread::Builder::new()
        .name("sensor".into())
        .spawn(move || {
            info!("Sensor thread started.");
            let sleeper = SpinSleeper::new(10_000);
            let mut robot = bb.read().robot;
            while running.load(Ordering::Relaxed) {
                let command = *applied.read();
                match integrate(&robot, &command, limits, dt) {
                    Ok(next) => robot = next,
                    Err(e) => warn!(%e, "Could not integrate drive command"),
                }
                if let Err(e) = platform.step(&robot, dt) {
                    warn!(%e, "Could not place centre of mass on platform");
                }

                let pitch = platform.pitch + jitter(&mut rng, noise);
                let roll = platform.roll + jitter(&mut rng, noise);
                robot_topic.publish(robot);
                {
                    let mut g = bb.write();
                    g.robot = robot;
                    g.pitch = pitch;
                    g.roll = roll;
                }
                sleeper.sleep(Duration::from_secs_f64(dt));
            }
            info!("Sensor thread stopped.");
        })
}

fn jitter(rng: &mut StdRng, amplitude: f64) -> f64 {
    if amplitude > 0.0 {
        rng.random_range(-amplitude..=amplitude)
    } else {
        0.0
    }
}

/// Spawn the control thread, which latches each published command as the
/// one the sensor thread applies.
pub fn spawn_control(
    applied: Arc<RwLock<DriveCommand>>,
    command_topic: &Topic<DriveCommand>,
    running: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>> {
    let mut command_rx = command_topic.subscribe();
    std::thread::Builder::new()
        .name("control".into())
        .spawn(move || {
            info!("Control thread started.");
            let sleeper = SpinSleeper::new(1_000);
            while running.load(Ordering::Relaxed) {
                while let Ok(command) = command_rx.try_recv() {
                    debug!(%command, "Applying drive command");
                    *applied.write() = *command;
                }
                sleeper.sleep(Duration::from_micros(1_000));
            }
            info!("Control thread stopped.");
        })
}
