// Aggregator for workflow integration tests in `tests/workflow/`.

#[path = "workflow/state_machine_test.rs"]
mod state_machine_test;

#[path = "workflow/report_bundle_versions_test.rs"]
mod report_bundle_versions_test;
