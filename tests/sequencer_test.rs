//! Tests for the turn sequencer and its derived status text.
//!
//! These walk whole games through the public API the way the UI does:
//! commit a move, perform the returned step by hand, and check the text
//! the session would display at each point.

use ticmytoe::orchestrator::status::{headline, knowledge_line, score_line};
use ticmytoe::{GameSession, Mark, OpponentStatus, Phase, ServiceError, Step};

/// Answers the pending request with `index`, as the orchestrator would.
fn reply(session: &mut GameSession, index: usize) -> Step {
    let ticket = match session.phase() {
        Phase::OpponentPending { ticket } => *ticket,
        other => panic!("no pending request in phase {other}"),
    };
    session.apply_opponent_reply(ticket, Ok(Some(index)))
}

#[test]
fn test_headlines_track_a_full_game() {
    let mut session = GameSession::new();
    assert_eq!(headline(&session), "Next player: X");

    session.place_human_mark(0);
    assert_eq!(headline(&session), "Next player: O (AI thinking...)");

    reply(&mut session, 4);
    assert_eq!(headline(&session), "Next player: X");

    session.place_human_mark(1);
    reply(&mut session, 6);
    session.place_human_mark(2);
    assert_eq!(headline(&session), "Winner: X");
}

#[test]
fn test_draw_headline() {
    let mut session = GameSession::new();
    for (human, opponent) in [(0, 1), (2, 3), (4, 6), (5, 8)] {
        session.place_human_mark(human);
        reply(&mut session, opponent);
    }
    session.place_human_mark(7);
    assert_eq!(headline(&session), "It's a Draw!");
}

#[test]
fn test_error_headline_names_the_fault() {
    let mut session = GameSession::new();
    session.place_human_mark(4);
    let ticket = match session.phase() {
        Phase::OpponentPending { ticket } => *ticket,
        other => panic!("no pending request in phase {other}"),
    };
    session.apply_opponent_reply(ticket, Err(ServiceError::new("connection refused")));
    assert_eq!(headline(&session), "Error: connection refused");
}

#[test]
fn test_score_accumulates_across_three_games() {
    let mut session = GameSession::new();

    // Game one: the human takes the top row.
    session.place_human_mark(0);
    reply(&mut session, 4);
    session.place_human_mark(1);
    reply(&mut session, 6);
    session.place_human_mark(2);

    // Game two: the opponent opens and takes the top row.
    let step = session.new_game();
    assert!(matches!(step, Step::RequestMove { .. }));
    reply(&mut session, 0);
    session.place_human_mark(4);
    reply(&mut session, 1);
    session.place_human_mark(8);
    let step = reply(&mut session, 2);
    let Step::ReportOutcome { outcome, .. } = step else {
        panic!("expected the opponent's win to be reported, got {step:?}");
    };
    assert_eq!(outcome.winner(), Some(Mark::O));

    // Game three: a draw.
    session.new_game();
    for (human, opponent) in [(0, 1), (2, 3), (4, 6), (5, 8)] {
        session.place_human_mark(human);
        reply(&mut session, opponent);
    }
    session.place_human_mark(7);

    assert_eq!(score_line(session.score()), "Wins: 1 | Draws: 1 | Losses: 1");
}

#[test]
fn test_opening_side_alternates_and_reset_restores_it() {
    let mut session = GameSession::new();
    assert_eq!(session.phase(), &Phase::PlayerTurn);

    session.new_game();
    assert!(session.awaiting_opponent());
    session.new_game();
    assert_eq!(session.phase(), &Phase::PlayerTurn);
    session.new_game();
    assert!(session.awaiting_opponent());

    // A full reset starts the alternation over with the human.
    session.reset_session();
    assert_eq!(session.phase(), &Phase::PlayerTurn);
}

#[test]
fn test_knowledge_line_formats_the_learning_metrics() {
    assert_eq!(knowledge_line(None), "Fetching AI status...");

    let sharp = OpponentStatus {
        epsilon: 0.05,
        q_table_size: 4821,
        initial_state_value: 0.82,
    };
    assert_eq!(
        knowledge_line(Some(&sharp)),
        "Difficulty: Hard (ε: 0.050) | Efficacy: Predicts Win (V₀=0.820) | States: 4821"
    );

    let fresh = OpponentStatus {
        epsilon: 0.9,
        q_table_size: 12,
        initial_state_value: -0.6,
    };
    assert_eq!(
        knowledge_line(Some(&fresh)),
        "Difficulty: Easy (ε: 0.900) | Efficacy: Predicts Loss (V₀=-0.600) | States: 12"
    );
}
