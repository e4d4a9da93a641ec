use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::ai::GenerationClient;
use crate::config::Config;
use crate::dingtalk::{self, DingTalkPublisher};
use crate::error::Result;
use crate::gitlab::client::GitLabClient;
use crate::prompt;

/// Orchestrator for the report pipeline: identity → commits → prompt →
/// generation → delivery. Strictly sequential; each stage awaits the prior
/// stage's result.
pub struct Orchestrator {
    config: Config,
    gitlab: GitLabClient,
    generator: GenerationClient,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(config: Config) -> Result<Self> {
        let gitlab = GitLabClient::new(&config.gitlab_url, &config.gitlab_token)?;
        let generator = GenerationClient::new()?;

        Ok(Self {
            config,
            gitlab,
            generator,
        })
    }

    /// Run the full pipeline for one day
    pub async fn run(&self, date: NaiveDate, dry_run: bool) -> Result<()> {
        println!("正在获取 {} 的提交记录...", date);

        let identity = self
            .gitlab
            .resolve_identity(&self.config.author_username)
            .await;

        let commits = self
            .gitlab
            .collect_commits(&self.config.project_ids, &identity, date)
            .await?;
        println!("✅ 共获取到 {} 条提交记录\n", commits.len());

        let prompt_text = prompt::synthesize(&commits);
        println!("📝 AI Prompt 已生成\n");

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.blue} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!(
            "正在使用 {} 生成日报...",
            self.config.provider.provider
        ));
        spinner.enable_steady_tick(Duration::from_millis(80));

        let report = self
            .generator
            .generate(&prompt_text, &self.config.provider)
            .await;
        spinner.finish_and_clear();
        let report = report?;
        println!("✅ 日报内容已生成\n");

        let publisher = self.publisher()?;
        if dry_run {
            println!("模拟运行模式 (不会发送到钉钉)\n");
            let plain = publisher.print_report(&report);
            dingtalk::copy_to_clipboard(&plain);
        } else {
            publisher.send(&report).await?;
        }

        Ok(())
    }

    fn publisher(&self) -> Result<DingTalkPublisher> {
        DingTalkPublisher::new(
            self.config.dingtalk_webhook.as_deref(),
            self.config.dingtalk_secret.as_deref(),
            &self.config.report_author,
            &self.config.report_team,
        )
    }
}
