use chess::PlayerSide;
use proptest::prelude::*;
use puzzle::{Puzzle, PuzzleController, PuzzleRecord, SessionMode};

#[derive(Debug, Clone)]
enum Action {
    /// Play the expected move.
    Expected,
    /// Play the n-th legal move, right or wrong.
    AnyLegal(u16),
    Hint,
    EnterSolution,
    Forward,
    Backward,
    ExitSolution,
    Reset,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => Just(Action::Expected),
        3 => any::<u16>().prop_map(Action::AnyLegal),
        1 => Just(Action::Hint),
        1 => Just(Action::EnterSolution),
        2 => Just(Action::Forward),
        2 => Just(Action::Backward),
        1 => Just(Action::ExitSolution),
        1 => Just(Action::Reset),
    ]
}

fn puzzles() -> Vec<Puzzle> {
    vec![
        Puzzle::new(PuzzleRecord {
            id: "fork".into(),
            fen: "3q2k1/4b3/2N5/8/8/2N5/8/6K1 w - - 0 1".into(),
            moves: vec!["Nxe7+".into(), "Qxe7".into(), "Nd5".into()],
            user_side: Some(PlayerSide::White),
            rating: 1350,
            ..Default::default()
        })
        .unwrap(),
        Puzzle::new(PuzzleRecord {
            id: "opening".into(),
            fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".into(),
            moves: vec!["e2e4".into(), "e7e5".into(), "g1f3".into(), "b8c6".into()],
            rating: 900,
            ..Default::default()
        })
        .unwrap(),
    ]
}

fn apply(controller: &mut PuzzleController, action: &Action) {
    match action {
        Action::Expected => {
            if let Some(uci) = controller.next_expected_move().map(|ply| ply.uci.clone()) {
                controller.submit_text(&uci);
            }
        }
        Action::AnyLegal(n) => {
            let legal = match controller.session() {
                Some(session) => session.game().legal_moves(),
                None => return,
            };
            if !legal.is_empty() {
                let mv = legal[*n as usize % legal.len()];
                controller.submit_move(mv.into());
            }
        }
        Action::Hint => {
            let _ = controller.show_hint();
        }
        Action::EnterSolution => {
            let _ = controller.enter_solution_mode();
        }
        Action::Forward => {
            let _ = controller.step_solution_forward();
        }
        Action::Backward => {
            let _ = controller.step_solution_backward();
        }
        Action::ExitSolution => {
            let _ = controller.exit_solution_mode();
        }
        Action::Reset => {
            let _ = controller.reset_puzzle();
        }
    }
}

proptest! {
    #[test]
    fn session_invariants_hold(which in 0usize..2, actions in proptest::collection::vec(action(), 0..60)) {
        let puzzle = puzzles().swap_remove(which);
        let plies = puzzle.solution().len();
        let mut controller = PuzzleController::new();
        controller.install_puzzle(puzzle).unwrap();
        let mut reports = 0usize;

        for action in &actions {
            let live_before = controller.session().unwrap().position();
            let in_replay = controller.replay().is_some();

            apply(&mut controller, action);
            if controller.take_pending_report().is_some() {
                reports += 1;
            }

            let session = controller.session().unwrap();
            prop_assert!(session.solved_moves() <= session.total_moves());
            prop_assert_eq!(
                session.is_completed(),
                session.solved_moves() == session.total_moves() && session.total_moves() > 0
            );
            prop_assert_eq!(
                controller.replay().is_some(),
                session.mode() == SessionMode::SolutionStepping
            );
            if let Some(state) = controller.replay_state() {
                prop_assert!(state.solution_index <= plies);
            }
            // Replay stepping never touches the live board
            if in_replay && matches!(action, Action::Forward | Action::Backward | Action::ExitSolution) {
                prop_assert_eq!(session.position(), live_before);
            }
        }

        // At most one report per session: every report follows a completion
        // and each reset starts a new session.
        let resets = actions.iter().filter(|a| matches!(a, Action::Reset)).count();
        prop_assert!(reports <= resets + 1);
    }
}
