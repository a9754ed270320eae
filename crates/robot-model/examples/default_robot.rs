use robot_model::*;

fn main() {
    let mut robot = Robot::default();
    println!("Default robot:");
    println!("  {}", robot);

    robot.current_position = Pose::from_xy(1.0, 0.5, 0.25);
    robot.angle = 0.25;
    robot.centre_of_mass_position = Position2D::new(0.05, -0.02);

    match robot.centre_of_mass_world() {
        Ok(com) => println!("  Centre of mass on the field: {}", com),
        Err(e) => println!("  Could not place centre of mass: {}", e),
    }

    let here = robot.current_position.position.unwrap_or_default();
    let (dx, dy) = here.offset_to(&robot.convergence_point);
    println!("  Offset to convergence point: dx = {:?}, dy = {:?}", dx, dy);
}
