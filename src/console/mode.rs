//! Local play modes.

use std::str::FromStr;

/// Who sits opposite the first player.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, strum::Display, strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Mode {
    /// Two humans share the console.
    #[strum(to_string = "players", serialize = "p")]
    Players,
    /// A human plays `X` against the computer playing `O`.
    #[strum(to_string = "computer", serialize = "c")]
    Computer,
}

impl Mode {
    /// Parses a console answer such as `P`, `c` or `computer`.
    pub fn from_answer(answer: &str) -> Option<Self> {
        Self::from_str(answer.trim()).ok()
    }
}
