use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

use anyhow::Context;
use tokio::time;
use tracing::{debug, info};

use robot_behaviour::{
    Balance, Behaviour, Convergence, DriveCommand, DriverInput, ManualDrive, PoseHold,
    TickContext, XLock,
};

use crate::blackboard::{Blackboard, snapshot, touch_cmd};
use crate::bus::Topic;
use crate::config::{BehaviourKind, Settings};

/// Build the behaviour named in the settings.
pub fn build_behaviour(settings: &Settings) -> anyhow::Result<Box<dyn Behaviour>> {
    let b = &settings.behaviour;
    let behaviour: Box<dyn Behaviour> = match b.kind {
        BehaviourKind::Converge => Box::new(
            Convergence::new(settings.convergence).context("invalid convergence settings")?,
        ),
        BehaviourKind::Balance => Box::new(Balance::new(settings.balance)),
        BehaviourKind::Pose => {
            info!(slot = %b.target_slot, "Pose target from grid slot");
            Box::new(
                PoseHold::new(b.target_slot.pose(), b.hold, settings.pose_tolerance)
                    .context("invalid pose target")?,
            )
        }
        BehaviourKind::XLock => Box::new(XLock),
        BehaviourKind::Manual => Box::new(ManualDrive::new()),
    };
    Ok(behaviour)
}

/// Stand-in for a driver's controller: forward, then strafe while turning,
/// then a toggle to robot-relative and forward again, then hands off.
#[derive(Debug, Default)]
pub struct DriverScript {
    toggled: bool,
}

impl DriverScript {
    pub const TOGGLE_AT_S: f64 = 4.0;

    pub fn sample(&mut self, t: f64) -> DriverInput {
        let toggle = t >= Self::TOGGLE_AT_S && !self.toggled;
        if toggle {
            self.toggled = true;
        }
        let (left_x, left_y, right_x) = match t {
            t if t < 2.0 => (0.0, -0.6, 0.0),
            t if t < Self::TOGGLE_AT_S => (0.5, 0.0, 0.4),
            t if t < 6.0 => (0.0, -0.6, 0.0),
            _ => (0.0, 0.0, 0.0),
        };
        DriverInput {
            left_x,
            left_y,
            right_x,
            toggle_field_oriented: toggle,
        }
    }
}

/// Tick `behaviour` at `rate_hz` until it finishes, `duration` elapses or
/// `running` is cleared. Clears `running` on the way out.
pub async fn drive_task(
    bb: Blackboard,
    mut behaviour: Box<dyn Behaviour>,
    command_tx: Topic<DriveCommand>,
    rate_hz: u32,
    duration: Duration,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    info!(
        behaviour = behaviour.name(),
        topic = command_tx.name(),
        rate_hz,
        "Drive task started."
    );
    behaviour.on_start();

    let mut ticker = time::interval(Duration::from_secs_f64(1.0 / f64::from(rate_hz)));
    let mut script = DriverScript::default();
    let start = Instant::now();
    let mut last = start;

    let result = loop {
        ticker.tick().await;
        if !running.load(Ordering::Relaxed) {
            break Ok(());
        }

        let now = Instant::now();
        let dt = (now - last).as_secs_f64();
        last = now;
        let elapsed = now - start;
        if elapsed >= duration {
            info!(?elapsed, "Run time elapsed.");
            break Ok(());
        }

        let state = snapshot(&bb);
        let ctx = TickContext {
            robot: state.robot,
            pitch: state.pitch,
            roll: state.roll,
            input: Some(script.sample(elapsed.as_secs_f64())),
        };
        let command = match behaviour.on_tick(&ctx, dt) {
            Ok(command) => command,
            Err(e) => {
                break Err(anyhow::Error::new(e)
                    .context(format!("{} behaviour tick failed", behaviour.name())));
            }
        };
        debug!(%command, "Computed drive command");
        command_tx.publish(command);
        // Stop from a behaviour is still a live command.
        touch_cmd(&bb);

        if behaviour.is_done() {
            info!(behaviour = behaviour.name(), "Behaviour finished.");
            break Ok(());
        }
    };

    command_tx.publish(DriveCommand::Stop);
    running.store(false, Ordering::Relaxed);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_toggles_once() {
        let mut script = DriverScript::default();
        assert!(!script.sample(1.0).toggle_field_oriented);
        assert!(script.sample(4.0).toggle_field_oriented);
        assert!(!script.sample(4.5).toggle_field_oriented);
        assert_eq!(script.sample(7.0).left_y, 0.0);
    }

    #[tokio::test]
    async fn test_drive_task_publishes_then_stops() {
        let bb: Blackboard = Arc::default();
        let topic: Topic<DriveCommand> = Topic::new("drive_cmd", 64);
        let mut rx = topic.subscribe();
        let running = Arc::new(AtomicBool::new(true));

        drive_task(
            bb,
            Box::new(XLock),
            topic.clone(),
            100,
            Duration::from_millis(50),
            running.clone(),
        )
        .await
        .unwrap();

        assert!(!running.load(Ordering::Relaxed));
        let mut seen = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            seen.push(*cmd);
        }
        assert_eq!(seen.first(), Some(&DriveCommand::XLock));
        assert_eq!(seen.last(), Some(&DriveCommand::Stop));
    }

    #[tokio::test]
    async fn test_drive_task_surfaces_behaviour_errors() {
        let bb: Blackboard = Arc::default();
        bb.write().robot.current_position = robot_model::Pose::default();
        let running = Arc::new(AtomicBool::new(true));
        let behaviour = Box::new(
            Convergence::new(robot_behaviour::ConvergenceConfig::default()).unwrap(),
        );

        let result = drive_task(
            bb,
            behaviour,
            Topic::new("drive_cmd", 4),
            100,
            Duration::from_secs(1),
            running.clone(),
        )
        .await;

        assert!(result.is_err());
        assert!(!running.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_stop_commands_keep_the_command_timestamp_fresh() {
        let bb: Blackboard = Arc::default();
        bb.write().robot.set_convergence_point(robot_model::Position2D::unset());
        let stale = Instant::now();
        bb.write().last_cmd_ts = stale;
        let topic: Topic<DriveCommand> = Topic::new("drive_cmd", 64);
        let mut rx = topic.subscribe();
        let behaviour = Box::new(
            Convergence::new(robot_behaviour::ConvergenceConfig::default()).unwrap(),
        );

        drive_task(
            bb.clone(),
            behaviour,
            topic.clone(),
            100,
            Duration::from_millis(50),
            Arc::new(AtomicBool::new(true)),
        )
        .await
        .unwrap();

        assert_eq!(*rx.try_recv().unwrap(), DriveCommand::Stop);
        assert!(snapshot(&bb).last_cmd_ts > stale);
    }

    #[test]
    fn test_script_pushes_forward_first() {
        let mut script = DriverScript::default();
        let input = script.sample(0.5);
        assert_eq!(input.left_y, -0.6);
        assert_eq!(input.left_x, 0.0);
    }
}
