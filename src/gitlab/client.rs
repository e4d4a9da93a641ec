use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use crate::error::Result;
use crate::gitlab::{day_window, is_merge_message, AuthorIdentity, Commit, RawCommit};

const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";
const COMMITS_PER_PAGE: u32 = 100;

/// GitLab API client
pub struct GitLabClient {
    base_url: String,
    token: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    email: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawProject {
    name: String,
}

impl GitLabClient {
    /// Create a new GitLab API client against the given instance URL
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client,
        })
    }

    /// Resolve the canonical identity of the token's account.
    ///
    /// Fail-open: any lookup failure degrades to an identity with no
    /// email/name so attribution falls back to username-substring matching.
    pub async fn resolve_identity(&self, username: &str) -> AuthorIdentity {
        match self.fetch_current_user().await {
            Ok(user) => {
                let identity = AuthorIdentity::new(
                    user.email.filter(|e| !e.is_empty()),
                    user.name.filter(|n| !n.is_empty()),
                    username,
                );
                println!(
                    "✅ 获取到用户信息: {} ({})",
                    identity.name.as_deref().unwrap_or("?"),
                    identity.email.as_deref().unwrap_or("?")
                );
                identity
            }
            Err(e) => {
                warn!(error = %e, "无法获取用户信息,将使用用户名匹配");
                AuthorIdentity::unresolved(username)
            }
        }
    }

    async fn fetch_current_user(&self) -> Result<RawUser> {
        let user = self
            .client
            .get(format!("{}/api/v4/user", self.base_url))
            .header(PRIVATE_TOKEN_HEADER, &self.token)
            .send()
            .await?
            .error_for_status()?
            .json::<RawUser>()
            .await?;
        Ok(user)
    }

    /// Resolve a human-readable project name, falling back to a placeholder
    /// built from the id. Lookup failure is non-fatal.
    pub async fn project_name(&self, project_id: &str) -> String {
        let result = self
            .client
            .get(format!("{}/api/v4/projects/{}", self.base_url, project_id))
            .header(PRIVATE_TOKEN_HEADER, &self.token)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match result {
            Ok(response) => match response.json::<RawProject>().await {
                Ok(project) => project.name,
                Err(e) => {
                    warn!(%project_id, error = %e, "无法获取项目名称,使用默认名称");
                    format!("项目 {}", project_id)
                }
            },
            Err(e) => {
                warn!(%project_id, error = %e, "无法获取项目名称,使用默认名称");
                format!("项目 {}", project_id)
            }
        }
    }

    /// Fetch raw commits authored within `[since, until]` for one project.
    ///
    /// Single page, capped at 100 records; no pagination is attempted.
    pub async fn fetch_commits(
        &self,
        project_id: &str,
        since: &str,
        until: &str,
    ) -> Result<Vec<RawCommit>> {
        let per_page = COMMITS_PER_PAGE.to_string();
        let commits = self
            .client
            .get(format!(
                "{}/api/v4/projects/{}/repository/commits",
                self.base_url, project_id
            ))
            .header(PRIVATE_TOKEN_HEADER, &self.token)
            .query(&[
                ("since", since),
                ("until", until),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<RawCommit>>()
            .await?;
        Ok(commits)
    }

    /// Collect the author's commits across all configured projects for one day.
    ///
    /// Projects are fetched sequentially and independently; a failing project
    /// contributes zero commits and never aborts collection for the others.
    pub async fn collect_commits(
        &self,
        project_ids: &[String],
        identity: &AuthorIdentity,
        date: NaiveDate,
    ) -> Result<Vec<Commit>> {
        let (since, until) = day_window(date)?;
        println!("时间范围: {} ~ {}", since, until);
        println!("过滤用户: {}", identity.username);

        let mut all_commits = Vec::new();

        for project_id in project_ids {
            let project_name = self.project_name(project_id).await;

            let raw = match self.fetch_commits(project_id, &since, &until).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(%project_id, error = %e, "获取项目提交失败");
                    continue;
                }
            };

            let total = raw.len();
            let user_commits: Vec<Commit> = raw
                .into_iter()
                .filter(|c| {
                    identity.matches(&c.author_email, &c.author_name)
                        && !is_merge_message(&c.message)
                })
                .map(|c| Commit {
                    project_id: project_id.clone(),
                    project_name: project_name.clone(),
                    title: c.title,
                    message: c.message,
                    created_at: c.created_at,
                    short_id: c.short_id,
                    url: c.web_url,
                })
                .collect();

            println!(
                "{}: 总共 {} 条提交,过滤后 {} 条",
                project_name,
                total,
                user_commits.len()
            );

            all_commits.extend(user_commits);
        }

        Ok(all_commits)
    }
}
