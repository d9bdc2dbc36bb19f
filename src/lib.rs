//! Resumable, rate-limited creation of one GitHub issue across many
//! repositories.
//!
//! The library parses repository identifiers, keeps a durable progress file
//! keyed by target, samples organization-balanced subsets of outstanding
//! work and drives every target through retrying issue creation with a fixed
//! throttle between remote calls. Execution is strictly sequential; an
//! interrupted run resumes where it stopped without repeating successes.

mod catalog;
mod config;
mod content;
mod error;
mod github;
mod observer;
mod progress;
mod rate;
mod retry;
mod runner;
mod sampler;
mod stats;
mod target;

pub use catalog::{load_target_list, write_target_list};
pub use config::{RunConfig, RunMode};
pub use content::IssueContent;
pub use error::{Error, describe_remote, io_error, persistence_error};
pub use github::{GithubIssueCreator, IssueCreator};
pub use observer::{NullObserver, ProgressDisplay, RunEvent, RunObserver, TargetState};
pub use progress::{Outcome, ProgressStore};
pub use rate::RateGovernor;
pub use retry::{RetryPolicy, RetryingAction, retry_with_fixed_delay};
pub use runner::{BatchRunner, FailedTarget, RunSummary};
pub use sampler::{DiversitySampler, Sample};
pub use stats::Statistics;
pub use target::{RepositoryRef, organization_of, parse_target};
