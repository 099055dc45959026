//! Referee line protocol
//!
//! The referee drives a match with one command per line:
//!
//! - `gen_move`: the engine picks a move, plays it and replies with its text
//! - `play_move <mv>`: the opponent played `<mv>`
//! - `game_over`: the match is finished
//!
//! Moves are two digits, row then column, each `0`-`7` with a top-left
//! origin (`"00"` is the top-left corner). A side with no legal move sends
//! the literal `pass`.
//!
//! When the engine's colour is not given up front it is taken from the first
//! command: being asked to move first means playing Black, being told about
//! a move first means playing White.

use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::board::{Pos, Side, BOARD_SIZE};
use crate::engine::Coordinator;
use crate::error::{EngineError, EngineResult};

/// Text the referee and the engine use for "no legal move"
pub const PASS_TOKEN: &str = "pass";

/// A move as exchanged with the referee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveOrPass {
    Move(Pos),
    Pass,
}

impl MoveOrPass {
    #[inline]
    pub fn is_pass(self) -> bool {
        self == MoveOrPass::Pass
    }

    #[inline]
    pub fn pos(self) -> Option<Pos> {
        match self {
            MoveOrPass::Move(pos) => Some(pos),
            MoveOrPass::Pass => None,
        }
    }
}

impl From<Option<Pos>> for MoveOrPass {
    fn from(pos: Option<Pos>) -> Self {
        pos.map_or(MoveOrPass::Pass, MoveOrPass::Move)
    }
}

impl FromStr for MoveOrPass {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        let text = s.trim();
        if text == PASS_TOKEN {
            return Ok(MoveOrPass::Pass);
        }
        let digit = |b: u8| {
            let value = b.wrapping_sub(b'0');
            (usize::from(value) < BOARD_SIZE).then_some(value)
        };
        match text.as_bytes() {
            &[r, c] => match (digit(r), digit(c)) {
                (Some(row), Some(col)) => Ok(MoveOrPass::Move(Pos::new(row, col))),
                _ => Err(EngineError::InvalidMoveText {
                    text: text.to_string(),
                }),
            },
            _ => Err(EngineError::InvalidMoveText {
                text: text.to_string(),
            }),
        }
    }
}

impl fmt::Display for MoveOrPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveOrPass::Move(pos) => write!(f, "{}{}", pos.row, pos.col),
            MoveOrPass::Pass => f.write_str(PASS_TOKEN),
        }
    }
}

/// One referee command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GenMove,
    PlayMove(MoveOrPass),
    GameOver,
}

impl FromStr for Command {
    type Err = EngineError;

    fn from_str(line: &str) -> EngineResult<Self> {
        let mut parts = line.split_whitespace();
        let command = parts.next().ok_or_else(|| EngineError::Protocol {
            message: "empty command".to_string(),
        })?;

        match command {
            "gen_move" => Ok(Command::GenMove),
            "game_over" => Ok(Command::GameOver),
            "play_move" => {
                let mv = parts.next().ok_or_else(|| EngineError::Protocol {
                    message: "play_move without a move".to_string(),
                })?;
                Ok(Command::PlayMove(mv.parse()?))
            }
            other => Err(EngineError::Protocol {
                message: format!("unknown command {other:?}"),
            }),
        }
    }
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Colour the engine played, if it was ever decided
    pub colour: Option<Side>,
    /// Number of `gen_move` requests answered
    pub generated: u32,
    /// Whether the referee sent `game_over` (as opposed to closing the input)
    pub game_over: bool,
}

/// A referee session driving one coordinator.
pub struct Session<'a> {
    engine: &'a mut Coordinator,
    colour: Option<Side>,
}

impl<'a> Session<'a> {
    pub fn new(engine: &'a mut Coordinator) -> Self {
        Self {
            engine,
            colour: None,
        }
    }

    /// Fix the engine's colour instead of inferring it.
    #[must_use]
    pub fn with_colour(mut self, colour: Side) -> Self {
        self.colour = Some(colour);
        self
    }

    #[inline]
    pub fn colour(&self) -> Option<Side> {
        self.colour
    }

    /// Serve commands from `input` until `game_over` or end of input.
    ///
    /// Replies go to `output` and are flushed immediately. Malformed lines are
    /// logged and skipped; an illegal opponent move or a failed worker ends
    /// the session with an error.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        mut output: W,
    ) -> EngineResult<SessionSummary> {
        let mut generated = 0;

        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(e) => {
                    warn!(line = line.as_str(), error = %e, "ignoring command");
                    continue;
                }
            };

            match command {
                Command::GenMove => {
                    let colour = *self.colour.get_or_insert(Side::Black);
                    let turn = self.engine.generate_move(colour)?;
                    writeln!(output, "{}", turn.mv)?;
                    output.flush()?;
                    generated += 1;
                    debug!("board after our move\n{}", self.engine.board());
                }
                Command::PlayMove(mv) => {
                    let colour = *self.colour.get_or_insert(Side::White);
                    self.engine.apply_opponent_move(mv, colour.opponent())?;
                    debug!(mv = %mv, "board after opponent move\n{}", self.engine.board());
                }
                Command::GameOver => {
                    let board = self.engine.board();
                    info!(
                        black = board.count_pieces(Side::Black),
                        white = board.count_pieces(Side::White),
                        "game over"
                    );
                    return Ok(self.summary(generated, true));
                }
            }
        }

        warn!("referee closed input before game_over");
        Ok(self.summary(generated, false))
    }

    fn summary(&self, generated: u32, game_over: bool) -> SessionSummary {
        SessionSummary {
            colour: self.colour,
            generated,
            game_over,
        }
    }
}
