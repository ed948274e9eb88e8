//! End-to-end tests for the contract test harness live under `tests/`.

#![forbid(unsafe_code)]
