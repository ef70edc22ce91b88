//! Black-box tests for the chat api live under `tests/`.
