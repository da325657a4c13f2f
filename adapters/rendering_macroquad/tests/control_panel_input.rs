use maze_crawl_rendering_macroquad::ControlPanelInputState;

fn run_sequence(sequence: &[bool]) -> Vec<bool> {
    let mut state = ControlPanelInputState::default();
    let mut requests = Vec::new();
    for &pressed in sequence {
        requests.push(state.take_regenerate());
        if pressed {
            state.register_regenerate();
        }
    }

    // Flush any trailing latched press so the harness observes the final request.
    requests.push(state.take_regenerate());
    requests
}

#[test]
fn new_maze_button_fires_once_on_the_following_frame() {
    let button_sequence = [false, true, false, true, true, false];
    let expected = vec![false, false, true, false, true, true, false];

    let first_run = run_sequence(&button_sequence);
    let second_run = run_sequence(&button_sequence);

    assert_eq!(first_run, expected);
    assert_eq!(first_run, second_run);
}

#[test]
fn repeated_presses_within_a_frame_collapse() {
    let mut state = ControlPanelInputState::default();
    state.register_regenerate();
    state.register_regenerate();

    assert!(state.take_regenerate());
    assert!(!state.take_regenerate());
}
