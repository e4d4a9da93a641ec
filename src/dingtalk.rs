use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Local;
use hmac::{Hmac, Mac};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use std::time::Duration;
use tracing::{error, warn};

use crate::error::{DailyRecapError, Result};

type HmacSha256 = Hmac<Sha256>;

const REPORT_TITLE: &str = "每日工作日报";

lazy_static! {
    static ref FENCE_RE: Regex = Regex::new(r"(?m)^```[^\n]*$\n?").expect("valid fence regex");
    static ref HEADING_RE: Regex = Regex::new(r"(?m)^#{1,6}\s+").expect("valid heading regex");
    static ref BOLD_RE: Regex = Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex");
    static ref ITALIC_RE: Regex = Regex::new(r"\*(.+?)\*").expect("valid italic regex");
    static ref LINK_RE: Regex = Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("valid link regex");
    static ref INLINE_CODE_RE: Regex = Regex::new(r"`([^`]*)`").expect("valid inline-code regex");
    static ref RULE_RE: Regex = Regex::new(r"(?m)^-{3,}\s*$\n?").expect("valid rule regex");
    static ref BLANK_RUN_RE: Regex = Regex::new(r"\n{3,}").expect("valid blank-run regex");
}

#[derive(Debug, Deserialize)]
struct WebhookResponse {
    #[serde(default = "default_errcode")]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

fn default_errcode() -> i64 {
    -1
}

/// DingTalk group-robot publisher
pub struct DingTalkPublisher {
    client: Client,
    webhook: Option<String>,
    secret: Option<String>,
    author: String,
    team: String,
}

impl DingTalkPublisher {
    pub fn new(
        webhook: Option<&str>,
        secret: Option<&str>,
        author: &str,
        team: &str,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            webhook: webhook.map(str::to_string),
            secret: secret.map(str::to_string),
            author: author.to_string(),
            team: team.to_string(),
        })
    }

    /// Post the report as a markdown message.
    ///
    /// A non-zero `errcode` is reported but does not fail the run: the
    /// report was generated and already shown to the caller.
    pub async fn send(&self, content: &str) -> Result<()> {
        println!("📤 正在发送日报到钉钉...");

        let url = self.signed_webhook_url()?;
        let text = self.build_markdown(content);
        let message = json!({
            "msgtype": "markdown",
            "markdown": {
                "title": REPORT_TITLE,
                "text": text,
            },
        });

        let response: WebhookResponse = self
            .client
            .post(url)
            .json(&message)
            .send()
            .await?
            .json()
            .await?;

        if response.errcode == 0 {
            println!("✅ 日报发送成功!");
        } else {
            error!(
                errcode = response.errcode,
                errmsg = %response.errmsg,
                "钉钉返回错误"
            );
        }

        Ok(())
    }

    /// Render the full markdown document for the report
    pub fn build_markdown(&self, content: &str) -> String {
        let date = Local::now().format("%Y-%m-%d");
        format!(
            "### {} 工作日报\n\n**姓名:** {}\n**部门:** {}\n\n---\n\n{}\n\n---\n\n🤖 本日报由 AI 自动生成",
            date, self.author, self.team, content
        )
    }

    /// Print the report locally and return its plain-text rendering for copy.
    ///
    /// Used by dry-run mode instead of posting to the webhook.
    pub fn print_report(&self, content: &str) -> String {
        let markdown = self.build_markdown(content);
        let plain = clean_markdown(&markdown);

        println!("\n{}", "=".repeat(60));
        println!("{}", markdown);
        println!("{}", "-".repeat(60));
        println!("{}", plain);
        println!("{}\n", "=".repeat(60));

        plain
    }

    /// Webhook URL with `timestamp`/`sign` query parameters appended when a
    /// signing secret is configured
    fn signed_webhook_url(&self) -> Result<Url> {
        let webhook = self.webhook.as_deref().ok_or_else(|| {
            DailyRecapError::config("DINGTALK_WEBHOOK is required unless --dry-run is set")
        })?;
        let mut url = Url::parse(webhook)
            .map_err(|e| DailyRecapError::config(format!("invalid DINGTALK_WEBHOOK: {}", e)))?;

        if let Some(ref secret) = self.secret {
            let timestamp = Local::now().timestamp_millis();
            let signature = sign(timestamp, secret);
            url.query_pairs_mut()
                .append_pair("timestamp", &timestamp.to_string())
                .append_pair("sign", &signature);
        }

        Ok(url)
    }
}

/// DingTalk robot signature: base64(HMAC-SHA256(key=secret,
/// msg="{timestamp}\n{secret}")). The string-to-sign format is fixed by the
/// receiving service.
pub fn sign(timestamp_ms: i64, secret: &str) -> String {
    let string_to_sign = format!("{}\n{}", timestamp_ms, secret);
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(string_to_sign.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Strip markdown syntax down to plain text for local display/copy.
///
/// Ordered substitutions, then collapse runs of 3+ newlines to exactly 2 and
/// trim. Applying the cleaner to already-cleaned text is a no-op.
pub fn clean_markdown(text: &str) -> String {
    let text = FENCE_RE.replace_all(text, "");
    let text = HEADING_RE.replace_all(&text, "");
    let text = BOLD_RE.replace_all(&text, "$1");
    let text = ITALIC_RE.replace_all(&text, "$1");
    let text = LINK_RE.replace_all(&text, "$1");
    let text = INLINE_CODE_RE.replace_all(&text, "$1");
    let text = RULE_RE.replace_all(&text, "");
    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Copy plain text to the system clipboard, degrading to display-only when
/// no clipboard integration is available. Kept as a seam for platform
/// integrations; failure never aborts the run.
pub fn copy_to_clipboard(_text: &str) -> bool {
    warn!("剪贴板不可用,仅显示日报内容");
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publisher() -> DingTalkPublisher {
        DingTalkPublisher::new(
            Some("https://oapi.dingtalk.com/robot/send?access_token=token123"),
            Some("abc"),
            "张三",
            "平台组",
        )
        .unwrap()
    }

    #[test]
    fn test_sign_known_vector() {
        assert_eq!(
            sign(1_700_000_000_000, "abc"),
            "op8PfVzJL3l7ytCWjPLUMemWOtOBySrLOe22d7A7me4="
        );
    }

    #[test]
    fn test_sign_other_secret() {
        assert_eq!(
            sign(1_700_000_000_000, "secret"),
            "OuzzJR5+xZ4/EYwqtNt6sMYZQMTa/HEGvc9miJe7XzY="
        );
    }

    #[test]
    fn test_signed_url_keeps_access_token() {
        let url = publisher().signed_webhook_url().unwrap();
        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(query.iter().any(|(k, v)| k == "access_token" && v == "token123"));
        assert!(query.iter().any(|(k, _)| k == "timestamp"));
        assert!(query.iter().any(|(k, _)| k == "sign"));
    }

    #[test]
    fn test_unsigned_url_without_secret() {
        let publisher = DingTalkPublisher::new(
            Some("https://oapi.dingtalk.com/robot/send?access_token=token123"),
            None,
            "张三",
            "平台组",
        )
        .unwrap();

        let url = publisher.signed_webhook_url().unwrap();
        assert!(!url.query().unwrap_or_default().contains("sign"));
    }

    #[test]
    fn test_missing_webhook_is_config_error() {
        let publisher = DingTalkPublisher::new(None, None, "张三", "平台组").unwrap();
        assert!(matches!(
            publisher.signed_webhook_url(),
            Err(DailyRecapError::Config(_))
        ));
    }

    #[test]
    fn test_build_markdown_structure() {
        let markdown = publisher().build_markdown("今天完成了登录模块");
        assert!(markdown.contains("工作日报"));
        assert!(markdown.contains("**姓名:** 张三"));
        assert!(markdown.contains("**部门:** 平台组"));
        assert!(markdown.contains("今天完成了登录模块"));
        assert!(markdown.contains("🤖 本日报由 AI 自动生成"));
        assert_eq!(markdown.matches("---").count(), 2);
    }

    #[test]
    fn test_clean_markdown_strips_syntax() {
        let input = "### 标题\n\n**粗体** 和 *斜体*\n\n[链接](https://example.com)\n\n```rust\nlet x = 1;\n```\n\n`inline`\n\n---\n\n正文";
        let plain = clean_markdown(input);

        assert!(!plain.contains('#'));
        assert!(!plain.contains("**"));
        assert!(!plain.contains('['));
        assert!(!plain.contains('`'));
        assert!(!plain.contains("---"));
        assert!(plain.contains("标题"));
        assert!(plain.contains("粗体 和 斜体"));
        assert!(plain.contains("链接"));
        assert!(plain.contains("let x = 1;"));
        assert!(plain.contains("inline"));
        assert!(plain.contains("正文"));
    }

    #[test]
    fn test_clean_markdown_collapses_blank_runs() {
        let plain = clean_markdown("a\n\n\n\n\nb");
        assert_eq!(plain, "a\n\nb");
    }

    #[test]
    fn test_clean_markdown_idempotent() {
        let input = publisher().build_markdown("**今天** 完成了 `登录` 模块\n\n\n详见 [MR](https://x)");
        let once = clean_markdown(&input);
        let twice = clean_markdown(&once);
        assert_eq!(once, twice);
    }
}
