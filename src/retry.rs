// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Retry utilities with a fixed delay for remote calls.
///
/// [`retry_with_fixed_delay`] is the generic loop; [`RetryingAction`] applies
/// it to issue creation and folds exhaustion into a failure [`Outcome`].
use std::time::Duration;

use masterror::AppError;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::{
    content::IssueContent,
    error::{Error, describe_remote},
    github::IssueCreator,
    progress::Outcome,
};

/// Retry budget and delay applied to each target.
#[derive(Debug, Clone, Copy, PartialEq, Eq,)]
pub struct RetryPolicy
{
    /// Additional attempts after the first failure (default: 3).
    pub retry_budget: u32,
    /// Pause between attempts (default: 5 seconds).
    pub delay:        Duration,
}

impl Default for RetryPolicy
{
    fn default() -> Self
    {
        Self {
            retry_budget: 3, delay: Duration::from_secs(5,),
        }
    }
}

impl RetryPolicy
{
    /// Total number of attempts, including the first one.
    pub fn max_attempts(&self,) -> u32
    {
        self.retry_budget.saturating_add(1,)
    }
}

/// Executes an async operation, retrying with a fixed delay between attempts.
///
/// The operation runs at most `1 + retry_budget` times.
///
/// # Errors
///
/// Returns the last error encountered if all attempts fail.
///
/// # Example
///
/// ```no_run
/// use issue_fanout::{RetryPolicy, retry_with_fixed_delay};
/// use masterror::AppError;
///
/// # async fn example() -> Result<(), AppError> {
/// let policy = RetryPolicy::default();
/// let result = retry_with_fixed_delay(&policy, "fetch data", || async {
///     Ok::<_, AppError,>(42,)
/// },)
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn retry_with_fixed_delay<F, Fut, T,>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut f: F,
) -> Result<T, AppError,>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, AppError,>,>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        match f().await {
            Ok(result,) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result,);
            }
            Err(error,) => {
                if attempt >= max_attempts {
                    warn!(
                        "{} failed after {} attempts: {}",
                        operation_name,
                        max_attempts,
                        describe_remote(&error)
                    );
                    return Err(error,);
                }

                warn!(
                    "{} failed on attempt {}/{}: {}. Retrying in {}s...",
                    operation_name,
                    attempt,
                    max_attempts,
                    describe_remote(&error),
                    policy.delay.as_secs_f64()
                );

                sleep(policy.delay,).await;
                attempt += 1;
            }
        }
    }
}

/// Issue creation wrapped in the retry policy.
#[derive(Debug, Clone,)]
pub struct RetryingAction<C,>
{
    creator: C,
    policy:  RetryPolicy,
}

impl<C: IssueCreator,> RetryingAction<C,>
{
    /// Wraps `creator` with `policy`.
    pub fn new(creator: C, policy: RetryPolicy,) -> Self
    {
        Self {
            creator, policy,
        }
    }

    /// Creates the issue in `owner/repo`, retrying transient failures.
    ///
    /// Never fails: exhaustion yields [`Outcome::Failure`] carrying the last
    /// error's description.
    pub async fn execute(&self, owner: &str, repo: &str, content: &IssueContent,) -> Outcome
    {
        let operation = format!("create issue in {owner}/{repo}");
        let result = retry_with_fixed_delay(&self.policy, &operation, || {
            self.creator.create_issue(owner, repo, &content.title, &content.body,)
        },)
        .await;

        match result {
            Ok(url,) => {
                info!("Issue created in {}/{}: {}", owner, repo, url);
                Outcome::Success(url,)
            }
            Err(error,) => Outcome::failure(Error::from(error,).to_display_string(),),
        }
    }

    /// Policy applied by this action.
    pub fn policy(&self,) -> &RetryPolicy
    {
        &self.policy
    }

    /// Underlying issue creator.
    pub fn creator(&self,) -> &C
    {
        &self.creator
    }
}

#[cfg(test)]
mod tests
{
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
    };

    use tokio::time::Instant;

    use super::*;

    /// Fails the first `failures` calls, then succeeds.
    #[derive(Debug, Default,)]
    struct FlakyCreator
    {
        failures: u32,
        calls:    AtomicU32,
        seen:     Mutex<Vec<(String, String, String,),>,>,
    }

    impl IssueCreator for FlakyCreator
    {
        async fn create_issue(
            &self,
            owner: &str,
            repo: &str,
            title: &str,
            _body: &str,
        ) -> Result<String, AppError,>
        {
            let call = self.calls.fetch_add(1, Ordering::SeqCst,) + 1;
            self.seen.lock().unwrap().push((owner.to_owned(), repo.to_owned(), title.to_owned(),),);
            if call <= self.failures {
                Err(AppError::service(format!("failure {call}"),),)
            } else {
                Ok(format!("https://github.com/{owner}/{repo}/issues/{call}"),)
            }
        }
    }

    fn content() -> IssueContent
    {
        IssueContent::parse("# Title\nBody",).expect("valid content",)
    }

    #[test]
    fn retry_policy_default_values()
    {
        let policy = RetryPolicy::default();
        assert_eq!(policy.retry_budget, 3);
        assert_eq!(policy.delay, Duration::from_secs(5));
        assert_eq!(policy.max_attempts(), 4);
    }

    #[tokio::test]
    async fn retry_succeeds_on_first_attempt()
    {
        let policy = RetryPolicy::default();
        let result =
            retry_with_fixed_delay(&policy, "test", || async { Ok::<_, AppError,>(42,) },)
                .await
                .expect("should succeed",);
        assert_eq!(result, 42);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_fails_after_budget_is_spent()
    {
        let policy = RetryPolicy {
            retry_budget: 2, delay: Duration::from_millis(10,),
        };
        let counter = Arc::new(Mutex::new(0,),);
        let counter_clone = counter.clone();

        let result = retry_with_fixed_delay(&policy, "test", move || {
            let counter = counter_clone.clone();
            async move {
                *counter.lock().unwrap() += 1;
                Err::<i32, _,>(AppError::service("persistent failure",),)
            }
        },)
        .await;

        assert!(result.is_err(), "should fail after max attempts",);
        assert_eq!(*counter.lock().unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn always_failing_action_runs_one_plus_budget_times()
    {
        let creator = FlakyCreator {
            failures: u32::MAX, ..FlakyCreator::default()
        };
        let action = RetryingAction::new(creator, RetryPolicy::default(),);

        let outcome = action.execute("acme", "widget", &content(),).await;

        assert_eq!(action.creator().calls.load(Ordering::SeqCst), 4);
        let error = outcome.error().expect("expected failure outcome",);
        assert_eq!(error, "failure 4");
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_recover_within_budget()
    {
        let creator = FlakyCreator {
            failures: 2, ..FlakyCreator::default()
        };
        let action = RetryingAction::new(creator, RetryPolicy::default(),);

        let outcome = action.execute("acme", "widget", &content(),).await;

        assert_eq!(outcome, Outcome::Success("https://github.com/acme/widget/issues/3".to_owned()));
        let seen = action.creator().seen.lock().unwrap().clone();
        assert!(seen.iter().all(|(owner, repo, title,)| owner == "acme"
            && repo == "widget"
            && title == "Title"));
    }

    #[tokio::test(start_paused = true)]
    async fn attempts_are_separated_by_the_fixed_delay()
    {
        let creator = FlakyCreator {
            failures: u32::MAX, ..FlakyCreator::default()
        };
        let policy = RetryPolicy {
            retry_budget: 3, delay: Duration::from_secs(5,),
        };
        let action = RetryingAction::new(creator, policy,);

        let started = Instant::now();
        action.execute("acme", "widget", &content(),).await;

        assert!(started.elapsed() >= Duration::from_secs(15));
        assert!(started.elapsed() < Duration::from_secs(20));
    }

    #[tokio::test]
    async fn zero_budget_means_single_attempt()
    {
        let creator = FlakyCreator {
            failures: 1, ..FlakyCreator::default()
        };
        let action = RetryingAction::new(creator, RetryPolicy {
            retry_budget: 0, delay: Duration::from_secs(5,),
        },);

        let outcome = action.execute("acme", "widget", &content(),).await;

        assert!(!outcome.is_success());
        assert_eq!(action.creator().calls.load(Ordering::SeqCst), 1);
    }
}
