// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// GitHub issue creation.
///
/// The batch runner only depends on the [`IssueCreator`] capability; the
/// production implementation talks to the GitHub REST API through octocrab.
use std::future::Future;

use masterror::AppError;
use octocrab::Octocrab;
use tracing::debug;

/// Remote capability that opens an issue in a repository.
pub trait IssueCreator
{
    /// Creates an issue and returns an opaque reference to it (its URL).
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] describing authentication failures, missing
    /// repositories, abuse or rate-limit rejections and network failures.
    fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
    ) -> impl Future<Output = Result<String, AppError,>,> + Send;
}

/// [`IssueCreator`] backed by an authenticated octocrab client.
#[derive(Clone,)]
pub struct GithubIssueCreator
{
    client: Octocrab,
}

impl GithubIssueCreator
{
    /// Builds a client authenticated with a personal access token.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the HTTP client cannot be initialized.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use issue_fanout::GithubIssueCreator;
    ///
    /// # async fn example() -> Result<(), masterror::AppError> {
    /// let token = std::env::var("GITHUB_TOKEN",).unwrap();
    /// let creator = GithubIssueCreator::new(&token,)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(token: &str,) -> Result<Self, AppError,>
    {
        let client =
            Octocrab::builder().personal_token(token,).build().map_err(client_build_error,)?;

        Ok(Self {
            client,
        },)
    }
}

impl IssueCreator for GithubIssueCreator
{
    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
    ) -> Result<String, AppError,>
    {
        debug!("Creating issue in {}/{}", owner, repo);

        let issue = self
            .client
            .issues(owner, repo,)
            .create(title,)
            .body(body,)
            .send()
            .await
            .map_err(classify_error,)?;

        Ok(issue.html_url.to_string(),)
    }
}

fn client_build_error(error: impl std::fmt::Display,) -> AppError
{
    AppError::service(format!("failed to build octocrab: {error}"),)
}

/// Maps octocrab failures onto application error kinds.
fn classify_error(error: octocrab::Error,) -> AppError
{
    match &error {
        octocrab::Error::GitHub {
            source, ..
        } => classify_status(source.status_code.as_u16(), &source.message,),
        _ => AppError::service(format!("GitHub request failed: {error}"),),
    }
}

fn classify_status(status: u16, message: &str,) -> AppError
{
    match status {
        401 => AppError::unauthorized(message.to_owned(),),
        403 => AppError::forbidden(message.to_owned(),),
        404 | 410 => AppError::not_found(message.to_owned(),),
        429 => AppError::service(format!("rate limited: {message}"),),
        _ => AppError::service(message.to_owned(),),
    }
}
