use vipalink::workflow::state::{get_next_state, initial_state_for};
use vipalink::workflow::{DeviceAction, SubWorkflowState};

const ACTIONS: [DeviceAction; 6] = [
    DeviceAction::DisplayIdleScreen,
    DeviceAction::EnableAdkLogger,
    DeviceAction::AdkLoggerReset,
    DeviceAction::GetTerminalLogs,
    DeviceAction::ReportVipaVersions,
    DeviceAction::ReportBundleVersions,
];

#[test]
fn every_action_walks_to_rest_in_three_steps() {
    for action in ACTIONS {
        for exception in [false, true] {
            let mut state = initial_state_for(&action);
            let mut steps = 0;
            while state != SubWorkflowState::Undefined {
                state = get_next_state(state, exception).expect("defined transition");
                steps += 1;
                assert!(steps <= 3, "walk from {:?} did not terminate", action);
            }
            assert_eq!(steps, 3);
        }
    }
}

#[test]
fn exception_flag_never_changes_the_path() {
    for action in ACTIONS {
        let state = initial_state_for(&action);
        assert_eq!(
            get_next_state(state, false).expect("clean"),
            get_next_state(state, true).expect("exceptional"),
        );
    }
}

#[test]
fn both_reports_share_a_successor() {
    assert_eq!(
        get_next_state(SubWorkflowState::ReportVipaVersions, false).expect("versions"),
        get_next_state(SubWorkflowState::ReportBundleVersions, false).expect("bundles"),
    );
}
