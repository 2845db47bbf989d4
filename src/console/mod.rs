//! Line-oriented console play.
//!
//! Reads answers from any [`BufRead`] and prints to any [`Write`], so the
//! same loop drives stdin/stdout and scripted tests. End of input ends the
//! session quietly.

mod mode;

pub use mode::Mode;

use anyhow::Result;
use connect_four_engine::{ComputerOpponent, GameEngine, GameStatus, Marker, PlaceError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{BufRead, Write};
use tracing::{debug, info, instrument};

const MODE_PROMPT: &str =
    "Begin Game. Enter 'P' if you want to play against another player;\nenter 'C' to play against computer.";

/// Controls one side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Contender {
    Human,
    Computer(ComputerOpponent),
}

/// How a single game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundEnd {
    Finished(GameStatus),
    InputClosed,
}

/// Console game loop.
pub struct ConsoleGame<R, W> {
    input: R,
    output: W,
    engine: GameEngine,
    rng: StdRng,
}

impl<R: BufRead, W: Write> ConsoleGame<R, W> {
    /// Creates a console game with an entropy-seeded opponent.
    pub fn new(input: R, output: W) -> Self {
        Self::with_rng(input, output, StdRng::from_entropy())
    }

    /// Creates a console game with a given random source for the opponent.
    pub fn with_rng(input: R, output: W, rng: StdRng) -> Self {
        Self {
            input,
            output,
            engine: GameEngine::new(),
            rng,
        }
    }

    /// Consumes the game and returns the output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Plays games until the players decline another one or input ends.
    #[instrument(skip(self))]
    pub fn run(&mut self, mode: Option<Mode>) -> Result<()> {
        self.print_board()?;

        let mode = match mode {
            Some(mode) => mode,
            None => match self.ask_mode()? {
                Some(mode) => mode,
                None => return Ok(()),
            },
        };
        info!(%mode, "Console game starting");

        let o_player = match mode {
            Mode::Players => Contender::Human,
            Mode::Computer => {
                writeln!(self.output, "Start game against computer.")?;
                Contender::Computer(ComputerOpponent::new(Marker::O))
            }
        };

        loop {
            match self.play_round(o_player)? {
                RoundEnd::InputClosed => return Ok(()),
                RoundEnd::Finished(status) => debug!(?status, "Round finished"),
            }

            writeln!(self.output, "Play again? (y/n)")?;
            match self.read_line()? {
                Some(answer) if answer.trim().eq_ignore_ascii_case("y") => {
                    self.engine.reset();
                    self.print_board()?;
                }
                _ => return Ok(()),
            }
        }
    }

    fn ask_mode(&mut self) -> Result<Option<Mode>> {
        writeln!(self.output, "{}", MODE_PROMPT)?;
        loop {
            let Some(answer) = self.read_line()? else {
                return Ok(None);
            };
            if let Some(mode) = Mode::from_answer(&answer) {
                return Ok(Some(mode));
            }
            writeln!(self.output, "Invalid input. {}", MODE_PROMPT)?;
        }
    }

    fn play_round(&mut self, o_player: Contender) -> Result<RoundEnd> {
        let mut marker = Marker::X;

        loop {
            let contender = match marker {
                Marker::X => Contender::Human,
                Marker::O => o_player,
            };

            match contender {
                Contender::Human => {
                    if !self.human_turn(marker, o_player)? {
                        return Ok(RoundEnd::InputClosed);
                    }
                }
                Contender::Computer(opponent) => {
                    writeln!(self.output, "The computer is playing...")?;
                    let placement = opponent.play(&mut self.engine, &mut self.rng)?;
                    writeln!(
                        self.output,
                        "{} played column {}",
                        opponent,
                        placement.column + 1
                    )?;
                }
            }
            debug!(%marker, "Turn complete");
            self.print_board()?;

            match self.engine.status() {
                GameStatus::Won(winner) => {
                    match contender {
                        Contender::Computer(_) => writeln!(self.output, "The computer has won!")?,
                        Contender::Human => writeln!(self.output, "Player{} has won!", winner)?,
                    }
                    return Ok(RoundEnd::Finished(self.engine.status()));
                }
                GameStatus::Draw => {
                    writeln!(self.output, "The game has ended in a draw.")?;
                    return Ok(RoundEnd::Finished(GameStatus::Draw));
                }
                GameStatus::InProgress => marker = marker.opponent(),
            }
        }
    }

    /// Prompts until the human makes a legal move. `false` when input ends.
    fn human_turn(&mut self, marker: Marker, o_player: Contender) -> Result<bool> {
        loop {
            match o_player {
                Contender::Computer(_) => {
                    writeln!(self.output, "It's your turn. Choose a column number from 1-7.")?
                }
                Contender::Human => writeln!(
                    self.output,
                    "Player{} - your turn. Choose a column number from 1-7.",
                    marker
                )?,
            }

            let Some(line) = self.read_line()? else {
                return Ok(false);
            };
            let label: usize = match line.trim().parse() {
                Ok(label) => label,
                Err(_) => {
                    writeln!(self.output, "Input must be a number, please try again.")?;
                    continue;
                }
            };

            match self.engine.place_label(label, marker) {
                Ok(placement) => {
                    debug!(row = placement.row, column = placement.column, "Human move");
                    return Ok(true);
                }
                Err(err @ (PlaceError::ColumnOutOfRange(_) | PlaceError::ColumnFull(_))) => {
                    debug!(error = %err, "Rejected console move");
                    writeln!(self.output, "Not a valid move. Please try again")?;
                }
                Err(PlaceError::GameOver) => return Err(PlaceError::GameOver.into()),
            }
        }
    }

    fn print_board(&mut self) -> Result<()> {
        write!(self.output, "{}", self.engine.board().display())?;
        self.output.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            debug!("Console input closed");
            return Ok(None);
        }
        Ok(Some(line))
    }
}
