//! The workspace root package. It carries no code of its own — every
//! behavior lives in the `reelforge-*` crates under `crates/` — and exists
//! only so `tests/integration/` has a package to attach to, driving the
//! crates together the way a real run would.
