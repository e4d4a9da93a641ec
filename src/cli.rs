use chrono::NaiveDate;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "daily-recap")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "AI-powered GitLab daily report generator",
    long_about = "daily-recap collects your GitLab commits for one day, asks an AI provider \
                  to turn them into a short daily report, and posts the result to a DingTalk \
                  group webhook. Use --dry-run to render the report locally instead."
)]
pub struct Cli {
    /// Render the report locally instead of posting to DingTalk
    #[arg(long)]
    pub dry_run: bool,

    /// Date to collect commits for (YYYY-MM-DD, default: today)
    #[arg(short, long, value_name = "DATE")]
    pub date: Option<String>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Validate CLI arguments
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref date) = self.date {
            if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                return Err(format!("Invalid --date '{}': expected YYYY-MM-DD", date));
            }
        }
        Ok(())
    }

    /// Resolve the report date, defaulting to today in local time
    pub fn report_date(&self) -> NaiveDate {
        self.date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}
