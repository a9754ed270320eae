use robot_behaviour::*;
use robot_model::{Pose, Position2D, Robot};

fn main() {
    let mut robot = Robot::default();
    robot.set_convergence_point(Position2D::new(1.0, 0.5));

    let mut behaviour = match Convergence::new(ConvergenceConfig::default()) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Bad convergence config: {}", e);
            return;
        }
    };

    let dt = 0.1;
    println!("Converging on {} from {}", robot.convergence_point, robot.current_position);

    for step in 0..40 {
        let ctx = TickContext {
            robot,
            ..Default::default()
        };
        let cmd = match behaviour.on_tick(&ctx, dt) {
            Ok(cmd) => cmd,
            Err(e) => {
                eprintln!("Step {}: {}", step, e);
                return;
            }
        };
        let Some(v) = cmd.field_velocity(robot.angle) else {
            continue;
        };
        let (x, y, th) = match robot.current_position.components() {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Step {}: {}", step, e);
                return;
            }
        };
        robot.current_position = Pose::from_xy(x + v.vx * dt, y + v.vy * dt, th);
        println!("  Step {:2}: {} -> {}", step + 1, cmd, robot.current_position);
    }
}
