// Typed actuator commands.
//
// The controller only ever asks the agent to do three things: walk at some
// rate, turn at some rate, or hold/release jump. `Command` is that closed set.
// Rendering to the collaborator's text protocol (`move 0.7`, `turn -0.6`,
// `jump 1`) happens in the `Display` impl, at the environment boundary, and
// nowhere else.
//
// Rates are in [-1, 1]: positive move is forward, positive turn is clockwise
// (increasing yaw).
//
// See also: `env.rs` for `Environment::send`, `controller.rs` which emits
// these once per tick.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Forward (positive) or backward (negative) walk rate.
    Move(f64),
    /// Clockwise (positive) or counter-clockwise (negative) turn rate.
    Turn(f64),
    /// Hold (`true`) or release (`false`) jump.
    Jump(bool),
}

impl Command {
    /// The three commands that leave the agent standing still.
    pub const NEUTRAL: [Command; 3] = [Command::Move(0.0), Command::Turn(0.0), Command::Jump(false)];

    /// Clamp rates into [-1, 1].
    pub fn clamped(self) -> Self {
        match self {
            Command::Move(r) => Command::Move(r.clamp(-1.0, 1.0)),
            Command::Turn(r) => Command::Turn(r.clamp(-1.0, 1.0)),
            jump => jump,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move(rate) => write!(f, "move {}", format_rate(*rate)),
            Command::Turn(rate) => write!(f, "turn {}", format_rate(*rate)),
            Command::Jump(held) => write!(f, "jump {}", u8::from(*held)),
        }
    }
}

/// Shortest decimal form, with negative zero printed as `0`.
fn format_rate(rate: f64) -> String {
    let rate = (rate * 1000.0).round() / 1000.0;
    if rate == 0.0 {
        "0".to_string()
    } else {
        format!("{rate}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_collaborator_text() {
        assert_eq!(Command::Move(0.7).to_string(), "move 0.7");
        assert_eq!(Command::Turn(-0.6).to_string(), "turn -0.6");
        assert_eq!(Command::Jump(true).to_string(), "jump 1");
        assert_eq!(Command::Jump(false).to_string(), "jump 0");
        assert_eq!(Command::Move(0.0).to_string(), "move 0");
        assert_eq!(Command::Turn(-0.0).to_string(), "turn 0");
    }

    #[test]
    fn rates_are_rounded_for_the_wire() {
        assert_eq!(Command::Turn(0.123456).to_string(), "turn 0.123");
        assert_eq!(Command::Move(1.0).to_string(), "move 1");
    }

    #[test]
    fn clamped_limits_rates() {
        assert_eq!(Command::Turn(2.5).clamped(), Command::Turn(1.0));
        assert_eq!(Command::Move(-3.0).clamped(), Command::Move(-1.0));
        assert_eq!(Command::Jump(true).clamped(), Command::Jump(true));
    }
}
