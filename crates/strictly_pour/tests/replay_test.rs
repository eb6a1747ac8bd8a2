//! Rebuilding attempts from recorded pour histories.

use strictly_pour::{
    Color, FailReason, LevelDefinition, LevelRecord, Outcome, Pour, PourRecord, PourRejection,
    Remaining, SelectOutcome, SessionController, SessionErrorKind, SessionOptions, SessionState,
    Stars,
};

fn level() -> LevelDefinition {
    let record = LevelRecord::new(vec![
        vec![Color(1), Color(1), Color(2), Color(2)],
        vec![Color(2), Color(2), Color(1), Color(1)],
        vec![],
        vec![],
    ])
    .with_max_moves(8);
    LevelDefinition::from_record(record).expect("valid level")
}

fn timed_level(tubes: Vec<Vec<u8>>, seconds: f64) -> LevelDefinition {
    let tubes = tubes
        .into_iter()
        .map(|t| t.into_iter().map(Color).collect())
        .collect();
    let record = LevelRecord::new(tubes).with_time_limit_seconds(seconds);
    LevelDefinition::from_record(record).expect("valid level")
}

fn play(controller: &mut SessionController, source: usize, dest: usize) {
    controller.select_tube(source).unwrap();
    assert!(matches!(
        controller.select_tube(dest).unwrap(),
        SelectOutcome::Poured(result) if result.is_accepted()
    ));
}

fn untimed(pours: &[Pour]) -> Vec<PourRecord> {
    pours.iter().map(|&p| PourRecord::new(p, 0.0)).collect()
}

fn replay_live(live: &SessionController, level: LevelDefinition) -> SessionController {
    let session = live.session().unwrap();
    SessionController::replay(level, session.history(), session.time_used()).unwrap()
}

#[test]
fn test_replay_reproduces_live_result() {
    let mut live = SessionController::new(SessionOptions::default());
    live.start(level()).unwrap();
    play(&mut live, 0, 2);
    play(&mut live, 1, 3);
    play(&mut live, 3, 0);
    play(&mut live, 2, 1);
    assert_eq!(live.state(), SessionState::Won);

    let replayed = replay_live(&live, level());

    assert_eq!(replayed.state(), SessionState::Won);
    assert_eq!(replayed.outcome(), live.outcome());
    let result = replayed.outcome().and_then(Outcome::result).unwrap();
    assert_eq!(result.moves_used, 4);
    assert_eq!(result.stars, Stars::THREE);
}

#[test]
fn test_replay_timed_win_keeps_time_and_stars() {
    let mut live = SessionController::new(SessionOptions::default());
    live.start(timed_level(vec![vec![1, 1], vec![1, 1]], 10.0)).unwrap();
    live.tick(9.0).unwrap();
    play(&mut live, 0, 1);
    assert_eq!(live.session().unwrap().history()[0].time_used_seconds, 9.0);

    let replayed = replay_live(&live, timed_level(vec![vec![1, 1], vec![1, 1]], 10.0));

    assert_eq!(replayed.outcome(), live.outcome());
    assert_eq!(
        replayed.outcome(),
        Some(&Outcome::Won {
            stars: Stars::ONE,
            time_used: 9.0,
            moves_used: 1
        })
    );
}

#[test]
fn test_replay_reproduces_out_of_time() {
    let tubes = vec![vec![1, 2], vec![], vec![]];
    let mut live = SessionController::new(SessionOptions::default());
    live.start(timed_level(tubes.clone(), 10.0)).unwrap();
    live.tick(3.0).unwrap();
    play(&mut live, 0, 1);
    live.tick(8.0).unwrap();
    assert_eq!(live.state(), SessionState::Failed);

    let replayed = replay_live(&live, timed_level(tubes, 10.0));

    assert_eq!(replayed.state(), SessionState::Failed);
    assert_eq!(
        replayed.outcome(),
        Some(&Outcome::Failed {
            reason: FailReason::OutOfTime
        })
    );
    let session = replayed.session().unwrap();
    assert_eq!(session.remaining_time(), Remaining::Limited(0.0));
    assert_eq!(session.time_used(), 11.0);
}

#[test]
fn test_replay_pour_after_deadline_is_rejected() {
    let history = [PourRecord::new(Pour::new(0, 1, Color(2), 1), 12.0)];

    let err = SessionController::replay(
        timed_level(vec![vec![1, 2], vec![], vec![]], 10.0),
        &history,
        12.0,
    )
    .unwrap_err();

    assert_eq!(
        err.kind,
        SessionErrorKind::ReplayRejected {
            step: 0,
            reason: PourRejection::SessionOver
        }
    );
}

#[test]
fn test_replay_rejects_time_running_backwards() {
    let history = [PourRecord::new(Pour::new(0, 1, Color(2), 1), 5.0)];

    let err = SessionController::replay(
        timed_level(vec![vec![1, 2], vec![], vec![]], 10.0),
        &history,
        2.0,
    )
    .unwrap_err();

    assert_eq!(
        err.kind,
        SessionErrorKind::ReplayClockReversed {
            step: 1,
            recorded: 2.0,
            played: 5.0
        }
    );
}

#[test]
fn test_replay_partial_history_keeps_playing() {
    let history = untimed(&[Pour::new(0, 2, Color(2), 2)]);

    let replayed = SessionController::replay(level(), &history, 0.0).unwrap();

    assert_eq!(replayed.state(), SessionState::Playing);
    assert_eq!(replayed.session().unwrap().moves_used(), 1);
}

#[test]
fn test_replay_rejects_illegal_pour() {
    // Tube 0 has color 2 on top; tube 1 has color 1 on top.
    let history = untimed(&[Pour::new(0, 1, Color(2), 1)]);

    let err = SessionController::replay(level(), &history, 0.0).unwrap_err();

    assert_eq!(
        err.kind,
        SessionErrorKind::ReplayRejected {
            step: 0,
            reason: PourRejection::Rejected
        }
    );
}

#[test]
fn test_replay_detects_tampered_record() {
    let recorded = Pour::new(0, 2, Color(2), 3);

    let err = SessionController::replay(level(), &untimed(&[recorded]), 0.0).unwrap_err();

    assert_eq!(
        err.kind,
        SessionErrorKind::ReplayMismatch {
            step: 0,
            recorded,
            actual: Pour::new(0, 2, Color(2), 2)
        }
    );
}

#[test]
fn test_replay_from_empty_source_fails() {
    let history = untimed(&[Pour::new(2, 0, Color(1), 1)]);

    let err = SessionController::replay(level(), &history, 0.0).unwrap_err();

    assert_eq!(
        err.kind,
        SessionErrorKind::ReplayRejected {
            step: 0,
            reason: PourRejection::SourceEmpty
        }
    );
}

#[test]
fn test_history_serializes_as_json() {
    let history = vec![
        PourRecord::new(Pour::new(0, 2, Color(2), 2), 1.5),
        PourRecord::new(Pour::new(1, 3, Color(1), 2), 4.0),
    ];

    let json = serde_json::to_string(&history).unwrap();
    let parsed: Vec<PourRecord> = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, history);
    let replayed = SessionController::replay(level(), &parsed, 6.0).unwrap();
    assert_eq!(replayed.session().unwrap().history(), history.as_slice());
    assert_eq!(replayed.session().unwrap().time_used(), 6.0);
}
