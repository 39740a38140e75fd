//! End-to-end tests for `grafter add` against fixture projects.

mod add_tests;
mod common;
