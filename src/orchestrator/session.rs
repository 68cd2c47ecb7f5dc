//! Turn sequencing state machine.
//!
//! [`GameSession`] owns the canonical board, the phase of play, and the
//! running score. It is a synchronous machine: every operation commits its
//! state change immediately and returns a [`Step`] describing the follow-up
//! work (a delayed opponent request, a learning report) for the caller to
//! execute. Timers and network never appear here, which keeps every
//! transition testable without a runtime.

use crate::game::{Board, Mark, Outcome, detect_outcome};
use crate::orchestrator::guard::{Ticket, TicketCounter};
use crate::service::ServiceError;
use derive_more::{Display, Error};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Delay before the opponent's opening move of a game.
///
/// Longer than the in-game delay so a fresh board does not fill itself the
/// instant it appears.
pub const OPENING_DELAY: Duration = Duration::from_millis(900);

/// Delay before the opponent's reply to a human move.
pub const REPLY_DELAY: Duration = Duration::from_millis(500);

/// Why automatic progress stopped.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum Fault {
    /// The service reported no move although the board is still playable.
    #[display("opponent service reported no move for a playable board")]
    RefusedMove,
    /// The service chose a cell that is occupied or out of range.
    #[display("opponent service chose impossible cell {index}")]
    ImpossibleMove {
        /// The offending cell index.
        index: usize,
    },
    /// The move request could not complete.
    #[display("{message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },
}

impl From<ServiceError> for Fault {
    fn from(error: ServiceError) -> Self {
        Self::Transport {
            message: error.message,
        }
    }
}

/// Current phase of play. Each variant carries only the data that is valid
/// while it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the human to pick a cell.
    PlayerTurn,
    /// An opponent-move request is in flight (including its artificial
    /// delay). Human input is ignored until the tagged arrival lands.
    OpponentPending {
        /// Tag the next arrival must match.
        ticket: Ticket,
    },
    /// The game concluded; only a new game moves on.
    GameOver {
        /// How the game ended.
        outcome: Outcome,
    },
    /// Automatic progress stopped; requires an explicit clear or new game.
    Error {
        /// What went wrong.
        fault: Fault,
    },
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerTurn => write!(f, "player turn"),
            Self::OpponentPending { ticket } => write!(f, "opponent pending {ticket}"),
            Self::GameOver { .. } => write!(f, "game over"),
            Self::Error { .. } => write!(f, "error"),
        }
    }
}

/// Running tally for the human side. Survives new games; cleared only by a
/// full session reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreTally {
    /// Games the human won.
    pub wins: u32,
    /// Games that ended with a full board and no winner.
    pub draws: u32,
    /// Games the opponent won.
    pub losses: u32,
}

/// Follow-up work a transition asks the caller to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Nothing to do.
    Idle,
    /// Request an opponent move for `board` after `delay`, tagged `ticket`.
    RequestMove {
        /// Tag the eventual arrival must carry.
        ticket: Ticket,
        /// Snapshot the request is about.
        board: Board,
        /// How long to wait before dispatching.
        delay: Duration,
    },
    /// Report a finished game to the learning endpoint.
    ReportOutcome {
        /// The final board.
        board: Board,
        /// How it ended.
        outcome: Outcome,
    },
}

/// The turn sequencer: board, phase, score, and the alternation counter.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    phase: Phase,
    score: ScoreTally,
    tickets: TicketCounter,
    /// Counts games since the session reset; parity decides who opens.
    games_started: u64,
    human: Mark,
}

impl GameSession {
    /// Creates a session at the start of its first game. The human plays
    /// `X` and opens; the service always answers as `O`.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            phase: Phase::PlayerTurn,
            score: ScoreTally::default(),
            tickets: TicketCounter::new(),
            games_started: 1,
            human: Mark::X,
        }
    }

    /// The canonical board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The current phase of play.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The running score.
    pub fn score(&self) -> &ScoreTally {
        &self.score
    }

    /// The mark the human plays.
    pub fn human_mark(&self) -> Mark {
        self.human
    }

    /// The mark the opponent plays.
    pub fn opponent_mark(&self) -> Mark {
        self.human.other()
    }

    /// Whose input the session currently accepts, if anyone's.
    pub fn active_mark(&self) -> Option<Mark> {
        match self.phase {
            Phase::PlayerTurn => Some(self.human),
            Phase::OpponentPending { .. } => Some(self.opponent_mark()),
            Phase::GameOver { .. } | Phase::Error { .. } => None,
        }
    }

    /// True while an opponent-move request is in flight.
    pub fn awaiting_opponent(&self) -> bool {
        matches!(self.phase, Phase::OpponentPending { .. })
    }

    /// Who opens the current game, by alternation.
    fn starting_mark(&self) -> Mark {
        if self.games_started % 2 == 1 {
            self.human
        } else {
            self.opponent_mark()
        }
    }

    /// Issues a fresh ticket and enters the pending phase. Any earlier
    /// arrival becomes stale the moment this runs.
    fn dispatch_opponent(&mut self) -> Step {
        let ticket = self.tickets.issue();
        let delay = if self.board.is_empty() {
            OPENING_DELAY
        } else {
            REPLY_DELAY
        };
        self.phase = Phase::OpponentPending { ticket };
        debug!(%ticket, ?delay, "dispatching opponent request");
        Step::RequestMove {
            ticket,
            board: self.board,
            delay,
        }
    }

    /// Records the outcome and enters `GameOver`. Runs once per game by
    /// construction: both callers leave the phase that allowed them.
    fn finish_game(&mut self, outcome: Outcome) -> Step {
        match outcome.winner() {
            Some(mark) if mark == self.human => self.score.wins += 1,
            Some(_) => self.score.losses += 1,
            None => self.score.draws += 1,
        }
        info!(?outcome, score = ?self.score, "game finished");
        self.phase = Phase::GameOver { outcome };
        Step::ReportOutcome {
            board: self.board,
            outcome,
        }
    }

    /// Applies a human move.
    ///
    /// Ignored outside [`Phase::PlayerTurn`] and for occupied or out-of-range
    /// cells; rejected input leaves the session untouched.
    #[instrument(skip(self), fields(phase = %self.phase))]
    pub fn place_human_mark(&mut self, index: usize) -> Step {
        if !matches!(self.phase, Phase::PlayerTurn) {
            debug!("ignoring input outside the player's turn");
            return Step::Idle;
        }
        let next = match self.board.with_move(index, self.human) {
            Ok(next) => next,
            Err(invalid) => {
                debug!(%invalid, "ignoring invalid input");
                return Step::Idle;
            }
        };
        self.board = next;
        match detect_outcome(&self.board) {
            Some(outcome) => self.finish_game(outcome),
            None => self.dispatch_opponent(),
        }
    }

    /// Applies an opponent-move arrival tagged with `ticket`.
    ///
    /// Arrivals whose ticket no longer matches the pending phase are stale:
    /// the game they were requested for has been superseded. They are
    /// discarded without touching any state.
    #[instrument(skip(self, reply), fields(phase = %self.phase))]
    pub fn apply_opponent_reply(
        &mut self,
        ticket: Ticket,
        reply: Result<Option<usize>, ServiceError>,
    ) -> Step {
        match self.phase {
            Phase::OpponentPending { ticket: live } if live == ticket => {}
            _ => {
                debug!(%ticket, "discarding stale opponent reply");
                return Step::Idle;
            }
        }
        let index = match reply {
            Ok(Some(index)) => index,
            Ok(None) => {
                // The pending phase only exists for non-terminal boards, so
                // a "no move" answer is always a contract violation here.
                warn!("opponent refused to move");
                self.phase = Phase::Error {
                    fault: Fault::RefusedMove,
                };
                return Step::Idle;
            }
            Err(error) => {
                warn!(%error, "opponent request failed");
                self.phase = Phase::Error {
                    fault: error.into(),
                };
                return Step::Idle;
            }
        };
        let next = match self.board.with_move(index, self.opponent_mark()) {
            Ok(next) => next,
            Err(invalid) => {
                warn!(%invalid, "opponent chose an impossible cell");
                self.phase = Phase::Error {
                    fault: Fault::ImpossibleMove { index },
                };
                return Step::Idle;
            }
        };
        self.board = next;
        match detect_outcome(&self.board) {
            Some(outcome) => self.finish_game(outcome),
            None => {
                self.phase = Phase::PlayerTurn;
                Step::Idle
            }
        }
    }

    /// Starts the next game. Allowed in every phase; the opening side
    /// alternates each game regardless of who won the last one.
    #[instrument(skip(self))]
    pub fn new_game(&mut self) -> Step {
        self.games_started += 1;
        self.board = Board::new();
        if self.starting_mark() == self.human {
            info!(game = self.games_started, "new game, human opens");
            self.phase = Phase::PlayerTurn;
            Step::Idle
        } else {
            info!(game = self.games_started, "new game, opponent opens");
            self.dispatch_opponent()
        }
    }

    /// Clears an error and resumes the interrupted turn.
    ///
    /// Every fault interrupts an opponent move that never landed, so
    /// clearing re-dispatches the request for the preserved board. No-op
    /// outside [`Phase::Error`].
    #[instrument(skip(self))]
    pub fn clear_error(&mut self) -> Step {
        if !matches!(self.phase, Phase::Error { .. }) {
            return Step::Idle;
        }
        info!("error cleared, retrying opponent move");
        self.dispatch_opponent()
    }

    /// Resets the whole session: board, phase, score, and alternation, as
    /// after a knowledge reset. Tickets stay monotonic so arrivals from
    /// before the reset remain detectably stale.
    #[instrument(skip(self))]
    pub fn reset_session(&mut self) {
        info!("session reset");
        self.board = Board::new();
        self.phase = Phase::PlayerTurn;
        self.score = ScoreTally::default();
        self.games_started = 1;
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_ticket(session: &GameSession) -> Ticket {
        match session.phase() {
            Phase::OpponentPending { ticket } => *ticket,
            other => panic!("expected pending phase, got {other}"),
        }
    }

    fn opponent_reply(session: &mut GameSession, index: usize) -> Step {
        let ticket = pending_ticket(session);
        session.apply_opponent_reply(ticket, Ok(Some(index)))
    }

    #[test]
    fn test_first_game_opens_with_the_human() {
        let session = GameSession::new();
        assert_eq!(session.phase(), &Phase::PlayerTurn);
        assert_eq!(session.active_mark(), Some(Mark::X));
        assert!(session.board().is_empty());
    }

    #[test]
    fn test_human_move_dispatches_a_delayed_request() {
        let mut session = GameSession::new();
        let step = session.place_human_mark(4);
        let Step::RequestMove { board, delay, .. } = step else {
            panic!("expected a request step, got {step:?}");
        };
        assert_eq!(delay, REPLY_DELAY);
        assert_eq!(board.compact(), "....X....");
        assert!(session.awaiting_opponent());
    }

    #[test]
    fn test_input_is_ignored_while_awaiting_the_opponent() {
        let mut session = GameSession::new();
        session.place_human_mark(4);
        let before = *session.board();
        assert_eq!(session.place_human_mark(0), Step::Idle);
        assert_eq!(session.board(), &before);
    }

    #[test]
    fn test_occupied_and_out_of_range_input_is_ignored() {
        let mut session = GameSession::new();
        session.place_human_mark(4);
        opponent_reply(&mut session, 0);
        assert_eq!(session.place_human_mark(0), Step::Idle);
        assert_eq!(session.place_human_mark(9), Step::Idle);
        assert_eq!(session.phase(), &Phase::PlayerTurn);
    }

    #[test]
    fn test_center_opening_returns_to_the_human() {
        let mut session = GameSession::new();
        session.place_human_mark(4);
        let step = opponent_reply(&mut session, 0);
        assert_eq!(step, Step::Idle);
        assert_eq!(session.phase(), &Phase::PlayerTurn);
        assert_eq!(session.board().compact(), "O...X....");
    }

    #[test]
    fn test_winning_move_scores_and_reports_once() {
        let mut session = GameSession::new();
        // X 0, O 4, X 1, O 6, X 2 completes the top row.
        session.place_human_mark(0);
        opponent_reply(&mut session, 4);
        session.place_human_mark(1);
        opponent_reply(&mut session, 6);
        let step = session.place_human_mark(2);

        let Step::ReportOutcome { board, outcome } = step else {
            panic!("expected a report step, got {step:?}");
        };
        assert_eq!(outcome.winner(), Some(Mark::X));
        assert_eq!(board.compact(), "XXX.O.O..");
        assert_eq!(session.score().wins, 1);
        assert_eq!(session.phase(), &Phase::GameOver { outcome });
        // Late input after the game ended changes nothing.
        assert_eq!(session.place_human_mark(5), Step::Idle);
        assert_eq!(session.score().wins, 1);
    }

    #[test]
    fn test_opponent_win_counts_as_a_loss() {
        let mut session = GameSession::new();
        // X 4, O 0, X 8, O 1, X 5, O 2 completes the top row for O.
        session.place_human_mark(4);
        opponent_reply(&mut session, 0);
        session.place_human_mark(8);
        opponent_reply(&mut session, 1);
        session.place_human_mark(5);
        let step = opponent_reply(&mut session, 2);

        let Step::ReportOutcome { outcome, .. } = step else {
            panic!("expected a report step, got {step:?}");
        };
        assert_eq!(outcome.winner(), Some(Mark::O));
        assert_eq!(session.score().losses, 1);
    }

    #[test]
    fn test_full_board_without_a_winner_is_a_draw() {
        let mut session = GameSession::new();
        for (human, opponent) in [(0, 1), (2, 3), (4, 6), (5, 8)] {
            session.place_human_mark(human);
            opponent_reply(&mut session, opponent);
        }
        let step = session.place_human_mark(7);
        let Step::ReportOutcome { outcome, .. } = step else {
            panic!("expected a report step, got {step:?}");
        };
        assert_eq!(outcome, Outcome::Draw);
        assert_eq!(session.score().draws, 1);
    }

    #[test]
    fn test_occupied_opponent_reply_freezes_the_session() {
        let mut session = GameSession::new();
        session.place_human_mark(4);
        let before = *session.board();
        let step = opponent_reply(&mut session, 4);
        assert_eq!(step, Step::Idle);
        assert_eq!(
            session.phase(),
            &Phase::Error {
                fault: Fault::ImpossibleMove { index: 4 }
            }
        );
        assert_eq!(session.board(), &before);
        // Frozen: clicks are no-ops until an explicit clear or new game.
        assert_eq!(session.place_human_mark(0), Step::Idle);
        assert_eq!(session.board(), &before);
    }

    #[test]
    fn test_refused_move_on_a_playable_board_is_a_fault() {
        let mut session = GameSession::new();
        session.place_human_mark(4);
        let ticket = pending_ticket(&session);
        session.apply_opponent_reply(ticket, Ok(None));
        assert_eq!(
            session.phase(),
            &Phase::Error {
                fault: Fault::RefusedMove
            }
        );
    }

    #[test]
    fn test_transport_failure_preserves_the_board() {
        let mut session = GameSession::new();
        session.place_human_mark(4);
        let before = *session.board();
        let ticket = pending_ticket(&session);
        session.apply_opponent_reply(ticket, Err(ServiceError::new("connection refused")));
        assert!(matches!(
            session.phase(),
            Phase::Error {
                fault: Fault::Transport { .. }
            }
        ));
        assert_eq!(session.board(), &before);
    }

    #[test]
    fn test_stale_reply_after_reset_leaves_the_new_board_alone() {
        let mut session = GameSession::new();
        session.place_human_mark(4);
        let stale = pending_ticket(&session);
        session.new_game();
        let step = session.apply_opponent_reply(stale, Ok(Some(0)));
        assert_eq!(step, Step::Idle);
        // The new game is the opponent's to open, with a fresh ticket; the
        // stale arrival neither placed a mark nor disturbed the phase.
        assert!(session.board().is_empty());
        assert_ne!(pending_ticket(&session), stale);
    }

    #[test]
    fn test_second_reply_with_the_same_ticket_is_stale() {
        let mut session = GameSession::new();
        session.place_human_mark(4);
        let ticket = pending_ticket(&session);
        session.apply_opponent_reply(ticket, Ok(Some(0)));
        let board = *session.board();
        let step = session.apply_opponent_reply(ticket, Ok(Some(1)));
        assert_eq!(step, Step::Idle);
        assert_eq!(session.board(), &board);
    }

    #[test]
    fn test_opening_side_alternates_each_game() {
        let mut session = GameSession::new();
        assert_eq!(session.active_mark(), Some(Mark::X));

        let step = session.new_game();
        let Step::RequestMove { delay, board, .. } = step else {
            panic!("expected the opponent to open, got {step:?}");
        };
        assert_eq!(delay, OPENING_DELAY);
        assert!(board.is_empty());

        session.new_game();
        assert_eq!(session.phase(), &Phase::PlayerTurn);
    }

    #[test]
    fn test_score_survives_new_games() {
        let mut session = GameSession::new();
        session.place_human_mark(0);
        opponent_reply(&mut session, 4);
        session.place_human_mark(1);
        opponent_reply(&mut session, 6);
        session.place_human_mark(2);
        assert_eq!(session.score().wins, 1);

        session.new_game();
        assert_eq!(session.score().wins, 1);
    }

    #[test]
    fn test_clearing_an_error_retries_the_opponent_move() {
        let mut session = GameSession::new();
        session.place_human_mark(4);
        let ticket = pending_ticket(&session);
        session.apply_opponent_reply(ticket, Err(ServiceError::new("timeout")));
        let step = session.clear_error();
        let Step::RequestMove { board, delay, .. } = step else {
            panic!("expected a retry, got {step:?}");
        };
        assert_eq!(board.compact(), "....X....");
        assert_eq!(delay, REPLY_DELAY);
        assert!(session.awaiting_opponent());
    }

    #[test]
    fn test_session_reset_clears_score_and_alternation() {
        let mut session = GameSession::new();
        session.place_human_mark(0);
        opponent_reply(&mut session, 4);
        session.place_human_mark(1);
        opponent_reply(&mut session, 6);
        session.place_human_mark(2);
        session.new_game();

        session.reset_session();
        assert_eq!(session.score(), &ScoreTally::default());
        assert_eq!(session.phase(), &Phase::PlayerTurn);
        assert!(session.board().is_empty());
    }
}
