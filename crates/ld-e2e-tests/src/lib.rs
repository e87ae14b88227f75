//! End-to-end tests for logdesk live in `tests/`.
