//! Async shell around the turn sequencer.
//!
//! [`Orchestrator`] is the single owner of all mutable session state. It
//! runs one select loop over UI commands, completions of spawned service
//! calls, and the exhibition ticker; every service call runs in its own
//! spawned task and reports back through the arrival channel, so no await
//! point ever holds the session mid-transition. After each turn of the loop
//! it pushes a fresh [`SessionView`] to the UI.

use crate::game::{Board, Outcome};
use crate::orchestrator::guard::{Ticket, TicketCounter};
use crate::orchestrator::session::{GameSession, Phase, Step};
use crate::orchestrator::status;
use crate::service::{OpponentService, OpponentStatus, ServiceError, TrainingReport};
use crate::sim::{self, Simulation};
use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

/// Requests from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// The human picked a cell.
    Place(usize),
    /// Start the next game.
    NewGame,
    /// Dismiss the error banner and retry the interrupted move.
    ClearError,
    /// Re-fetch the opponent's learning metrics.
    RefreshStatus,
    /// Run bulk self-play training on the service.
    Train {
        /// How many rounds to request.
        rounds: u32,
    },
    /// Clear the opponent's learned knowledge and reset the session.
    ResetKnowledge,
}

/// Everything the UI needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    /// The real game board.
    pub board: Board,
    /// Headline above the board.
    pub headline: String,
    /// True when the headline is an error banner.
    pub error: bool,
    /// Opponent-knowledge line.
    pub knowledge: String,
    /// Score line, human side first.
    pub score: String,
    /// Non-fatal notice, if one is current.
    pub notice: Option<String>,
    /// Exhibition frame while training runs (and briefly after).
    pub exhibition: Option<Board>,
    /// True while the training request itself is still pending.
    pub training: bool,
    /// True when a human move would be accepted right now.
    pub accepts_input: bool,
}

/// Completion of a spawned service call.
#[derive(Debug)]
enum Arrival {
    OpponentReply {
        ticket: Ticket,
        reply: Result<Option<usize>, ServiceError>,
    },
    OutcomeReported {
        result: Result<(), ServiceError>,
    },
    StatusFetched {
        result: Result<OpponentStatus, ServiceError>,
    },
    KnowledgeReset {
        result: Result<(), ServiceError>,
    },
    TrainingSettled {
        bracket: Ticket,
        result: Result<TrainingReport, ServiceError>,
    },
    ExhibitionExpired {
        bracket: Ticket,
    },
}

/// The running exhibition: its bracket tag, generator, and latest frame.
struct Exhibition {
    bracket: Ticket,
    sim: Simulation<StdRng>,
    ticker: Interval,
    frame: Board,
    training: bool,
}

/// Owns the session and sequences everything that can touch it.
pub struct Orchestrator<S> {
    service: Arc<S>,
    session: GameSession,
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<SessionView>,
    arrival_tx: mpsc::UnboundedSender<Arrival>,
    arrivals: mpsc::UnboundedReceiver<Arrival>,
    opponent: Option<OpponentStatus>,
    notice: Option<String>,
    /// Finished games waiting for their learning notification; at most one
    /// notification is in flight at a time.
    reports: VecDeque<(Board, Outcome)>,
    reporting: bool,
    exhibition: Option<Exhibition>,
    brackets: TicketCounter,
}

impl<S: OpponentService + 'static> Orchestrator<S> {
    /// Creates an orchestrator talking to `service`, fed by `commands` and
    /// publishing views on `events`.
    pub fn new(
        service: Arc<S>,
        commands: mpsc::UnboundedReceiver<Command>,
        events: mpsc::UnboundedSender<SessionView>,
    ) -> Self {
        let (arrival_tx, arrivals) = mpsc::unbounded_channel();
        Self {
            service,
            session: GameSession::new(),
            commands,
            events,
            arrival_tx,
            arrivals,
            opponent: None,
            notice: None,
            reports: VecDeque::new(),
            reporting: false,
            exhibition: None,
            brackets: TicketCounter::new(),
        }
    }

    /// Runs the loop until the UI hangs up.
    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<()> {
        info!("starting turn orchestration");
        self.spawn_status_fetch();
        if self.push_view().is_err() {
            return Ok(());
        }
        loop {
            tokio::select! {
                maybe = self.commands.recv() => {
                    let Some(command) = maybe else {
                        info!("command channel closed, shutting down");
                        break;
                    };
                    self.handle_command(command);
                }
                Some(arrival) = self.arrivals.recv() => {
                    self.handle_arrival(arrival);
                }
                _ = Self::next_exhibition_tick(&mut self.exhibition) => {
                    if let Some(ex) = self.exhibition.as_mut() {
                        ex.frame = ex.sim.tick();
                    }
                }
            }
            if self.push_view().is_err() {
                info!("view channel closed, shutting down");
                break;
            }
        }
        Ok(())
    }

    /// Resolves to the next exhibition ply, or never while none is running.
    async fn next_exhibition_tick(exhibition: &mut Option<Exhibition>) {
        match exhibition {
            Some(ex) => {
                ex.ticker.tick().await;
            }
            None => std::future::pending().await,
        }
    }

    fn handle_command(&mut self, command: Command) {
        debug!(?command, "handling command");
        match command {
            Command::Place(index) => {
                let step = self.session.place_human_mark(index);
                self.execute(step);
            }
            Command::NewGame => {
                self.notice = None;
                let step = self.session.new_game();
                self.execute(step);
            }
            Command::ClearError => {
                self.notice = None;
                let step = self.session.clear_error();
                self.execute(step);
            }
            Command::RefreshStatus => self.spawn_status_fetch(),
            Command::Train { rounds } => self.start_training(rounds),
            Command::ResetKnowledge => self.spawn_knowledge_reset(),
        }
    }

    fn handle_arrival(&mut self, arrival: Arrival) {
        match arrival {
            Arrival::OpponentReply { ticket, reply } => {
                let step = self.session.apply_opponent_reply(ticket, reply);
                self.execute(step);
            }
            Arrival::OutcomeReported { result } => {
                self.reporting = false;
                match result {
                    // Learning moves the metrics, so refresh the display.
                    Ok(()) => self.spawn_status_fetch(),
                    Err(error) => {
                        warn!(%error, "learning notification failed");
                        self.notice = Some(format!("Learning update failed: {error}"));
                    }
                }
                self.pump_reports();
            }
            Arrival::StatusFetched { result } => match result {
                Ok(opponent) => self.opponent = Some(opponent),
                Err(error) => {
                    warn!(%error, "status fetch failed");
                    self.notice = Some(format!("Status fetch failed: {error}"));
                }
            },
            Arrival::KnowledgeReset { result } => match result {
                Ok(()) => {
                    info!("opponent knowledge cleared, resetting session");
                    self.session.reset_session();
                    self.notice = Some("Opponent knowledge cleared".to_string());
                    self.spawn_status_fetch();
                }
                Err(error) => {
                    warn!(%error, "knowledge reset failed");
                    self.notice = Some(format!("Knowledge reset failed: {error}"));
                }
            },
            Arrival::TrainingSettled { bracket, result } => {
                self.finish_training(bracket, result);
            }
            Arrival::ExhibitionExpired { bracket } => {
                if self
                    .exhibition
                    .as_ref()
                    .is_some_and(|ex| ex.bracket == bracket)
                {
                    debug!(%bracket, "exhibition stopped");
                    self.exhibition = None;
                }
            }
        }
    }

    /// Performs the follow-up work a session transition asked for.
    fn execute(&mut self, step: Step) {
        match step {
            Step::Idle => {}
            Step::RequestMove {
                ticket,
                board,
                delay,
            } => self.spawn_move_request(ticket, board, delay),
            Step::ReportOutcome { board, outcome } => {
                self.reports.push_back((board, outcome));
                self.pump_reports();
            }
        }
    }

    fn spawn_move_request(&self, ticket: Ticket, board: Board, delay: Duration) {
        let service = Arc::clone(&self.service);
        let tx = self.arrival_tx.clone();
        tokio::spawn(async move {
            time::sleep(delay).await;
            let reply = service.request_move(&board).await;
            let _ = tx.send(Arrival::OpponentReply { ticket, reply });
        });
    }

    /// Dispatches the next queued learning notification, if none is in
    /// flight.
    fn pump_reports(&mut self) {
        if self.reporting {
            return;
        }
        let Some((board, outcome)) = self.reports.pop_front() else {
            return;
        };
        self.reporting = true;
        let service = Arc::clone(&self.service);
        let tx = self.arrival_tx.clone();
        tokio::spawn(async move {
            let result = service.notify_outcome(&board, outcome).await;
            let _ = tx.send(Arrival::OutcomeReported { result });
        });
    }

    fn spawn_status_fetch(&self) {
        let service = Arc::clone(&self.service);
        let tx = self.arrival_tx.clone();
        tokio::spawn(async move {
            let result = service.fetch_status().await;
            let _ = tx.send(Arrival::StatusFetched { result });
        });
    }

    fn spawn_knowledge_reset(&self) {
        let service = Arc::clone(&self.service);
        let tx = self.arrival_tx.clone();
        tokio::spawn(async move {
            let result = service.reset_knowledge().await;
            let _ = tx.send(Arrival::KnowledgeReset { result });
        });
    }

    fn start_training(&mut self, rounds: u32) {
        if self.exhibition.as_ref().is_some_and(|ex| ex.training) {
            self.notice = Some("Training already in progress".to_string());
            return;
        }
        let bracket = self.brackets.issue();
        info!(%bracket, rounds, "starting bulk training");
        match self.exhibition.as_mut() {
            // A run started during the grace tail takes over the running
            // exhibition; the pending expiry now carries a stale bracket.
            Some(ex) => {
                ex.bracket = bracket;
                ex.training = true;
            }
            None => {
                let mut ticker = time::interval(sim::TICK_INTERVAL);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                self.exhibition = Some(Exhibition {
                    bracket,
                    sim: Simulation::new(StdRng::from_os_rng()),
                    ticker,
                    frame: Board::new(),
                    training: true,
                });
            }
        }
        let service = Arc::clone(&self.service);
        let tx = self.arrival_tx.clone();
        tokio::spawn(async move {
            let result = service.request_training(rounds).await;
            let _ = tx.send(Arrival::TrainingSettled { bracket, result });
        });
    }

    /// Handles a settled training request: surface the result, then let the
    /// exhibition play out its grace period before it disappears.
    fn finish_training(&mut self, bracket: Ticket, result: Result<TrainingReport, ServiceError>) {
        if self.exhibition.as_ref().map(|ex| ex.bracket) != Some(bracket) {
            debug!(%bracket, "discarding stale training result");
            return;
        }
        match result {
            Ok(report) => {
                info!(rounds = report.rounds_completed, "training finished");
                self.notice = Some(format!(
                    "Training finished: {} rounds",
                    report.rounds_completed
                ));
                self.spawn_status_fetch();
            }
            Err(error) => {
                warn!(%error, "training failed");
                self.notice = Some(format!("Training failed: {error}"));
            }
        }
        if let Some(ex) = self.exhibition.as_mut() {
            ex.training = false;
        }
        let tx = self.arrival_tx.clone();
        tokio::spawn(async move {
            time::sleep(sim::GRACE_PERIOD).await;
            let _ = tx.send(Arrival::ExhibitionExpired { bracket });
        });
    }

    fn push_view(&self) -> Result<(), mpsc::error::SendError<SessionView>> {
        self.events.send(SessionView {
            board: *self.session.board(),
            headline: status::headline(&self.session),
            error: matches!(self.session.phase(), Phase::Error { .. }),
            knowledge: status::knowledge_line(self.opponent.as_ref()),
            score: status::score_line(self.session.score()),
            notice: self.notice.clone(),
            exhibition: self.exhibition.as_ref().map(|ex| ex.frame),
            training: self.exhibition.as_ref().is_some_and(|ex| ex.training),
            accepts_input: matches!(self.session.phase(), Phase::PlayerTurn),
        })
    }
}
