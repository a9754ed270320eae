use parking_lot::RwLock;
use std::{sync::Arc, time::Instant};

use robot_model::Robot;

#[derive(Clone)]
pub struct State {
    pub robot: Robot,
    /// Gyro pitch (rad).
    pub pitch: f64,
    /// Gyro roll (rad).
    pub roll: f64,
    pub last_cmd_ts: Instant,
    pub faults: Vec<String>,
}

impl Default for State {
    fn default() -> Self {
        State {
            robot: Robot::default(),
            pitch: 0.0,
            roll: 0.0,
            last_cmd_ts: Instant::now(),
            faults: Vec::new(),
        }
    }
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn snapshot(bb: &Blackboard) -> State {
    (*bb.read()).clone()
}

pub fn touch_cmd(bb: &Blackboard) {
    bb.write().last_cmd_ts = Instant::now();
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}
