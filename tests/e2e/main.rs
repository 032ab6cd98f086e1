//! E2E test suite entry point.

mod context_workflow;
mod fixture;
