//! HTTP implementations of the taskbridge capability traits.
//!
//! - `TrackerClient`: `TaskClient` over the tracker's JSON-RPC endpoint
//! - `GithubNotifier`: `CommentNotifier` over the GitHub REST API
//!
//! Both share one retry loop: 5xx, 429 and transient transport errors are
//! retried with exponential backoff up to `RetryPolicy::max_attempts`.

pub mod client;
pub mod config;
pub mod github;
pub mod retry;
pub mod rpc;

pub use client::TrackerClient;
pub use config::{GithubConfig, RetryPolicy, TrackerConfig};
pub use github::GithubNotifier;
pub use retry::{retry_delay, HttpFailure, RETRY_ATTEMPT_HEADER};
pub use rpc::RpcClient;
