//! Two-click selection protocol, restart, and retry.

use strictly_pour::{
    Color, LevelDefinition, LevelRecord, PourRejection, PourResult, SelectOutcome,
    SessionController, SessionErrorKind, SessionEvent, SessionOptions, SessionState,
};

fn controller(tubes: Vec<Vec<u8>>, locked: Vec<usize>) -> SessionController {
    let tubes = tubes
        .into_iter()
        .map(|t| t.into_iter().map(Color).collect())
        .collect();
    let record = LevelRecord::new(tubes).with_locked_tubes(locked);
    let level = LevelDefinition::from_record(record).expect("valid level");
    let mut controller = SessionController::new(SessionOptions::default());
    controller.start(level).expect("start");
    controller.drain_events();
    controller
}

#[test]
fn test_empty_tube_cannot_be_selected() {
    let mut c = controller(vec![vec![1], vec![]], vec![]);

    assert_eq!(c.select_tube(1).unwrap(), SelectOutcome::EmptyRejected(1));
    assert_eq!(c.session().unwrap().selected(), None);
    assert_eq!(
        c.drain_events(),
        vec![SessionEvent::SelectionRejected { index: 1 }]
    );
}

#[test]
fn test_clicking_selected_tube_deselects() {
    let mut c = controller(vec![vec![1], vec![]], vec![]);

    assert_eq!(c.select_tube(0).unwrap(), SelectOutcome::Selected(0));
    assert_eq!(c.session().unwrap().selected(), Some(0));
    assert_eq!(c.select_tube(0).unwrap(), SelectOutcome::Deselected(0));
    assert_eq!(c.session().unwrap().selected(), None);
    assert_eq!(
        c.drain_events(),
        vec![
            SessionEvent::TubeSelected { index: 0 },
            SessionEvent::TubeDeselected { index: 0 },
        ]
    );
}

#[test]
fn test_accepted_pour_clears_selection() {
    let mut c = controller(vec![vec![1, 2], vec![]], vec![]);

    c.select_tube(0).unwrap();
    let outcome = c.select_tube(1).unwrap();

    assert!(matches!(outcome, SelectOutcome::Poured(PourResult::Accepted(_))));
    assert_eq!(c.session().unwrap().selected(), None);
    assert_eq!(c.session().unwrap().moves_used(), 1);
}

#[test]
fn test_rejected_pour_keeps_selection_for_another_target() {
    let mut c = controller(vec![vec![1], vec![2], vec![]], vec![]);

    c.select_tube(0).unwrap();
    let rejected = c.select_tube(1).unwrap();
    assert_eq!(
        rejected,
        SelectOutcome::Poured(PourResult::Rejected(PourRejection::Rejected))
    );
    assert_eq!(c.session().unwrap().selected(), Some(0));
    assert_eq!(c.session().unwrap().moves_used(), 0);

    let accepted = c.select_tube(2).unwrap();
    assert!(matches!(accepted, SelectOutcome::Poured(PourResult::Accepted(_))));
}

#[test]
fn test_locked_tube_rejects_pours() {
    let mut c = controller(vec![vec![1], vec![1], vec![]], vec![1]);

    c.select_tube(0).unwrap();
    assert_eq!(
        c.select_tube(1).unwrap(),
        SelectOutcome::Poured(PourResult::Rejected(PourRejection::TubeLocked))
    );

    let events = c.drain_events();
    assert_eq!(
        events.last(),
        Some(&SessionEvent::PourRejected {
            source_index: 0,
            dest_index: 1,
            reason: PourRejection::TubeLocked
        })
    );
}

#[test]
fn test_event_order_for_accepted_pour() {
    let mut c = controller(vec![vec![3, 3], vec![3, 3]], vec![]);

    c.select_tube(0).unwrap();
    c.select_tube(1).unwrap();

    let events = c.drain_events();
    assert_eq!(events[0], SessionEvent::TubeSelected { index: 0 });
    assert_eq!(
        events[1],
        SessionEvent::PourAccepted {
            source_index: 0,
            dest_index: 1,
            color: Color(3),
            count: 2
        }
    );
    assert!(events[2].is_terminal());
    assert_eq!(events.len(), 3);
}

#[test]
fn test_retry_resets_attempt() {
    let mut c = controller(vec![vec![1, 2], vec![], vec![]], vec![]);
    c.select_tube(0).unwrap();
    c.select_tube(1).unwrap();
    c.tick(4.0).unwrap();
    assert_eq!(c.session().unwrap().moves_used(), 1);

    c.retry().unwrap();

    let session = c.session().unwrap();
    assert_eq!(c.state(), SessionState::Playing);
    assert_eq!(session.moves_used(), 0);
    assert_eq!(session.time_used(), 0.0);
    assert!(session.history().is_empty());
    assert_eq!(session.tubes()[0].segments(), &[Color(1), Color(2)]);
    assert!(matches!(
        c.drain_events().first(),
        Some(SessionEvent::LevelStarted { tube_count: 3, .. })
    ));
}

#[test]
fn test_retry_before_start_fails() {
    let mut c = SessionController::new(SessionOptions::default());
    let err = c.retry().unwrap_err();
    assert_eq!(err.kind, SessionErrorKind::NotStarted);
}

#[test]
fn test_ticks_after_outcome_are_ignored() {
    let record = LevelRecord::new(vec![vec![Color(1), Color(2)], vec![]])
        .with_time_limit_seconds(1.0);
    let mut c = SessionController::new(SessionOptions::default());
    c.start(LevelDefinition::from_record(record).unwrap()).unwrap();

    c.tick(2.0).unwrap();
    assert_eq!(c.state(), SessionState::Failed);
    c.drain_events();

    c.tick(2.0).unwrap();
    assert!(c.pending_events().is_empty());
    assert_eq!(c.session().unwrap().time_used(), 2.0);
}
