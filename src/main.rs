mod blackboard; // shared robot state
mod bus; // broadcast topics
mod config; // settings file + environment
mod drive; // behaviour selection and the drive loop
mod simulation; // drivebase and platform threads
mod watchdog; // stale command detection

use anyhow::{Context, anyhow};
use parking_lot::RwLock;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{self, EnvFilter};

use robot_behaviour::DriveCommand;
use robot_model::Robot;

use blackboard::{Blackboard, snapshot};
use bus::Topic;
use config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let settings = config::load_config(&path).with_context(|| format!("loading {}", path))?;

    info!(behaviour = ?settings.behaviour.kind, "Balance bot simulation started.");
    match run(settings).await {
        Ok(()) => {
            info!("Simulation finished successfully.");
            Ok(())
        }
        Err(e) => {
            error!("Simulation failed: {:?}", e);
            Err(e)
        }
    }
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    let bb: Blackboard = Arc::default();
    {
        let mut g = bb.write();
        g.robot.set_convergence_point(settings.behaviour.convergence_point);
        g.robot.centre_of_mass_position = settings.behaviour.centre_of_mass;
        info!(robot = %g.robot, "Initial robot state");
    }

    let robot_topic: Topic<Robot> = Topic::new("robot_state", 16);
    let command_topic: Topic<DriveCommand> = Topic::new("drive_cmd", 4);
    let applied: Arc<RwLock<DriveCommand>> = Arc::new(RwLock::new(DriveCommand::Stop));
    let running = Arc::new(AtomicBool::new(true));
    let robot_rx = robot_topic.subscribe();

    info!("Spawning sensor thread...");
    let sensor = simulation::spawn_sensor(
        &settings.simulation,
        Arc::clone(&bb),
        Arc::clone(&applied),
        robot_topic,
        Arc::clone(&running),
    )
    .context("spawning sensor thread")?;

    info!("Spawning control thread...");
    let control = simulation::spawn_control(
        Arc::clone(&applied),
        &command_topic,
        Arc::clone(&running),
    )
    .context("spawning control thread")?;

    let behaviour = drive::build_behaviour(&settings)?;
    let result = tokio::try_join!(
        drive::drive_task(
            Arc::clone(&bb),
            behaviour,
            command_topic.clone(),
            settings.behaviour.rate_hz,
            Duration::from_secs_f64(settings.simulation.duration_s),
            Arc::clone(&running),
        ),
        watchdog::watchdog(
            Arc::clone(&bb),
            command_topic,
            settings.watchdog,
            Arc::clone(&running)
        ),
        telemetry(robot_rx, Arc::clone(&running)),
    );

    running.store(false, Ordering::Relaxed);
    sensor.join().map_err(|_| anyhow!("sensor thread panicked"))?;
    control.join().map_err(|_| anyhow!("control thread panicked"))?;
    result?;

    let state = snapshot(&bb);
    info!(
        robot = %state.robot,
        pitch_deg = state.pitch.to_degrees(),
        roll_deg = state.roll.to_degrees(),
        faults = ?state.faults,
        "Final state"
    );
    Ok(())
}

/// Logs the robot roughly once a second.
async fn telemetry(
    mut robot_rx: broadcast::Receiver<Arc<Robot>>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let mut tick = tokio::time::interval(Duration::from_secs(1));
    let mut latest: Option<Arc<Robot>> = None;
    while running.load(Ordering::Relaxed) {
        tokio::select! {
            msg = robot_rx.recv() => match msg {
                Ok(robot) => latest = Some(robot),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(skipped = n, "Telemetry receiver lagged.");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = tick.tick() => {
                if let Some(robot) = &latest {
                    let com = robot.centre_of_mass_world().ok();
                    let here = robot.current_position.position.unwrap_or_default();
                    let (dx, dy) = here.offset_to(&robot.convergence_point);
                    info!(
                        pose = %robot.current_position,
                        com = ?com,
                        to_convergence_x = ?dx,
                        to_convergence_y = ?dy,
                        "Telemetry"
                    );
                }
            }
        }
    }
    Ok(())
}
