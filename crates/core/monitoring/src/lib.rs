//! Logging setup shared by the workspace binaries and tests.

pub mod logging;
