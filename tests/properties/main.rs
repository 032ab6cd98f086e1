//! Property-based test suite entry point.

mod ranking_props;
mod safety_props;
