mod ping;
pub use ping::Ping;

mod send_robot_ping;
pub use send_robot_ping::{RobotPing, RobotPong, SendRobotPing};
