//! Drive command timeout.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use robot_behaviour::DriveCommand;

use crate::blackboard::{Blackboard, raise_fault, snapshot};
use crate::bus::Topic;
use crate::config::WatchdogSettings;

/// Fault raised when drive commands go stale.
pub const CMD_TIMEOUT_FAULT: &str = "cmd timeout";

/// Stops the robot when drive commands stop arriving.
///
/// While the last command is older than the timeout a `Stop` is published
/// every period. The fault is raised once per run.
pub async fn watchdog(
    bb: Blackboard,
    command_tx: Topic<DriveCommand>,
    settings: WatchdogSettings,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    info!("Watchdog task started.");
    let timeout = Duration::from_millis(settings.timeout_ms);
    let mut tick = tokio::time::interval(Duration::from_millis(settings.period_ms));
    let mut tripped = false;
    while running.load(Ordering::Relaxed) {
        tick.tick().await;
        let age = Instant::now().saturating_duration_since(snapshot(&bb).last_cmd_ts);
        if age > timeout {
            if !tripped {
                warn!(?age, "Drive command timeout! Stopping the drivebase.");
                raise_fault(&bb, CMD_TIMEOUT_FAULT);
                tripped = true;
            }
            command_tx.publish(DriveCommand::Stop);
        } else if tripped {
            info!("Drive commands resumed.");
            tripped = false;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::touch_cmd;

    const FAST: WatchdogSettings = WatchdogSettings {
        period_ms: 5,
        timeout_ms: 20,
    };

    async fn stop_after(running: Arc<AtomicBool>, after: Duration) {
        tokio::time::sleep(after).await;
        running.store(false, Ordering::Relaxed);
    }

    #[tokio::test]
    async fn test_stale_commands_raise_one_fault_and_stop() {
        let bb: Blackboard = Arc::default();
        let topic: Topic<DriveCommand> = Topic::new("drive_cmd", 64);
        let mut rx = topic.subscribe();
        let running = Arc::new(AtomicBool::new(true));

        let (result, ()) = tokio::join!(
            watchdog(bb.clone(), topic.clone(), FAST, running.clone()),
            stop_after(running.clone(), Duration::from_millis(80)),
        );
        result.unwrap();

        assert_eq!(snapshot(&bb).faults, vec![CMD_TIMEOUT_FAULT]);
        let mut stops = 0;
        while let Ok(cmd) = rx.try_recv() {
            assert_eq!(*cmd, DriveCommand::Stop);
            stops += 1;
        }
        assert!(stops >= 2, "expected repeated stops, got {stops}");
    }

    #[tokio::test]
    async fn test_fresh_commands_do_not_trip() {
        let bb: Blackboard = Arc::default();
        let topic: Topic<DriveCommand> = Topic::new("drive_cmd", 64);
        let mut rx = topic.subscribe();
        let running = Arc::new(AtomicBool::new(true));
        let settings = WatchdogSettings {
            period_ms: 5,
            timeout_ms: 100,
        };

        let feeder = {
            let bb = bb.clone();
            let running = running.clone();
            async move {
                while running.load(Ordering::Relaxed) {
                    touch_cmd(&bb);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            }
        };
        let (result, (), ()) = tokio::join!(
            watchdog(bb.clone(), topic.clone(), settings, running.clone()),
            feeder,
            stop_after(running.clone(), Duration::from_millis(60)),
        );
        result.unwrap();

        assert!(snapshot(&bb).faults.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_behaviour_stop_counts_as_live() {
        // An unset convergence point makes the behaviour emit Stop every tick.
        let bb: Blackboard = Arc::default();
        bb.write()
            .robot
            .set_convergence_point(robot_model::Position2D::unset());
        let topic: Topic<DriveCommand> = Topic::new("drive_cmd", 64);
        let running = Arc::new(AtomicBool::new(true));
        let behaviour = Box::new(
            robot_behaviour::Convergence::new(robot_behaviour::ConvergenceConfig::default())
                .unwrap(),
        );
        let settings = WatchdogSettings {
            period_ms: 5,
            timeout_ms: 100,
        };

        let (drive, dog) = tokio::join!(
            crate::drive::drive_task(
                bb.clone(),
                behaviour,
                topic.clone(),
                100,
                Duration::from_millis(250),
                running.clone(),
            ),
            watchdog(bb.clone(), topic.clone(), settings, running.clone()),
        );
        drive.unwrap();
        dog.unwrap();

        assert!(snapshot(&bb).faults.is_empty());
    }
}
