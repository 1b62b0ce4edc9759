// blockpath_env: concrete `Environment` implementations.
//
// `blockpath_core` only knows the `Environment` trait. This crate provides the
// two implementations callers inject:
//
// - `mock.rs`:   `MockEnvironment`, a kinematic agent in an optional block
//                terrain. Deterministic (seeded heading jitter), with
//                switches for an immobile agent and scripted pose dropouts.
//                Used by the integration tests and for offline runs.
// - `link.rs`:   `LinkEnvironment`, a newline-delimited request/response
//                link over any `BufRead` + `Write` pair (pipe, socket,
//                child process stdio).
// - `jitter.rs`: SplitMix64-backed heading noise for the mock.

pub mod jitter;
pub mod link;
pub mod mock;

pub use jitter::HeadingJitter;
pub use link::LinkEnvironment;
pub use mock::{MockConfig, MockEnvironment};
