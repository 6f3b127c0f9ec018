//! Crate-level tests for the launch flow and transaction layout

mod transaction_layout_tests;
