use lazy_static::lazy_static;
use regex::Regex;

use crate::gitlab::Commit;

/// Sentinel returned when nothing remains after filtering, instructing the
/// generator to answer with "no data" semantics
pub const NO_DATA_PROMPT: &str =
    "今天没有有效的 GitLab 提交记录。请直接返回\"今日工作内容：暂无数据\"";

lazy_static! {
    /// Pure merge commits carrying no author-authored content, matched
    /// against the entire title. Broader than the collector's message filter
    /// on purpose: the two run on different raw fields.
    static ref MERGE_TITLE_RE: Regex = Regex::new(
        r"(?i)^(Merge branch|Merge remote-tracking|Merge pull request)\s+\S+\s+into\s+\S+$"
    )
    .expect("valid merge-title regex");
}

/// Commits of one project, ordered by ascending commit time
#[derive(Debug)]
struct ProjectGroup<'a> {
    project_name: &'a str,
    commits: Vec<&'a Commit>,
}

/// Whether a commit title is a pure merge line with no other content
pub fn is_pure_merge_title(title: &str) -> bool {
    MERGE_TITLE_RE.is_match(title)
}

/// Render the instructional prompt for the generation provider.
///
/// Pure and deterministic: identical commit sequences produce byte-identical
/// prompt text.
pub fn synthesize(commits: &[Commit]) -> String {
    let filtered: Vec<&Commit> = commits
        .iter()
        .filter(|c| !is_pure_merge_title(&c.title))
        .collect();

    if filtered.is_empty() {
        return NO_DATA_PROMPT.to_string();
    }

    let groups = group_by_project(&filtered);

    let mut text = String::new();
    text.push_str("以下是我今天在 GitLab 的提交记录,请帮我生成一份工作日报(中文):\n\n");

    text.push_str("提交前缀说明:\n");
    text.push_str("- feat: 新增功能\n");
    text.push_str("- fix: 修复错误\n");
    text.push_str("- style: 代码样式修改,不影响逻辑\n");
    text.push_str("- refactor: 代码重构,优化结构但不改变功能\n");
    text.push_str("- build: 构建系统或依赖项变更\n");
    text.push_str("- revert: 回滚之前的提交\n");
    text.push_str("- perf: 性能优化\n");
    text.push_str("- test: 测试相关\n");
    text.push_str("- docs: 文档更新\n");
    text.push_str("- chore: 构建/工具链相关\n\n");

    for group in &groups {
        text.push_str(&format!("#### {}\n\n", group.project_name));
        for (index, commit) in group.commits.iter().enumerate() {
            text.push_str(&format!("{}. {}\n", index + 1, commit.title));
            if let Some(first_line) = commit.message.lines().next() {
                if first_line != commit.title {
                    text.push_str(&format!("   {}\n", first_line));
                }
            }
        }
        text.push('\n');
    }

    text.push_str("要求:\n");
    text.push_str("- 使用\"工作内容\"开头\n");
    text.push_str("- 以项目名称为一级标题\n");
    text.push_str("- 以项目内的提交记录作为标题下面的工作内容列表，也就是二级内容\n");
    text.push_str("- **重要**: 每条提交记录要保留原始内容,只是润色语言表达,不要改写成\"合并\"、\"成功合并\"这种通用描述\n");
    text.push_str("- 直接使用提交标题作为工作内容,根据提交前缀说明理解含义,必要时补充说明让语句更通顺\n");
    text.push_str("- 偏技术日报风格\n");
    text.push_str("- 根据提交前缀自动标注: feat→【新增】, fix→【修复】, refactor→【优化】, perf→【优化】, style→【样式】\n");
    text.push_str("- 总字数控制在 300 字以内\n");
    text.push_str("- 总体检查一遍看看有无重复内容或者错误输出，无需输出提交记录总结\n");

    text
}

/// Group commits by project id; commits within a group ascend by commit
/// time, groups ascend by project name.
fn group_by_project<'a>(commits: &[&'a Commit]) -> Vec<ProjectGroup<'a>> {
    let mut groups: Vec<(&str, ProjectGroup<'a>)> = Vec::new();

    for &commit in commits {
        match groups.iter_mut().find(|(id, _)| *id == commit.project_id) {
            Some((_, group)) => group.commits.push(commit),
            None => groups.push((
                &commit.project_id,
                ProjectGroup {
                    project_name: &commit.project_name,
                    commits: vec![commit],
                },
            )),
        }
    }

    let mut groups: Vec<ProjectGroup<'a>> = groups.into_iter().map(|(_, g)| g).collect();
    for group in &mut groups {
        group.commits.sort_by_key(|c| c.created_at);
    }
    groups.sort_by(|a, b| a.project_name.cmp(b.project_name));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};

    fn commit(project_id: &str, project_name: &str, title: &str, created_at: &str) -> Commit {
        Commit {
            project_id: project_id.to_string(),
            project_name: project_name.to_string(),
            title: title.to_string(),
            message: title.to_string(),
            created_at: DateTime::<FixedOffset>::parse_from_rfc3339(created_at).unwrap(),
            short_id: "abc1234".to_string(),
            url: format!("https://gitlab.example.com/{}/-/commit/abc1234", project_id),
        }
    }

    #[test]
    fn test_pure_merge_title_patterns() {
        assert!(is_pure_merge_title("Merge branch 'dev' into 'main'"));
        assert!(is_pure_merge_title(
            "Merge remote-tracking 'origin/dev' into main"
        ));
        assert!(is_pure_merge_title("Merge pull request #12 into main"));
        assert!(is_pure_merge_title("merge branch 'dev' into 'main'"));
        // Anchored to the whole title: trailing content means real work
        assert!(!is_pure_merge_title(
            "Merge branch 'dev' into 'main' and fix conflicts"
        ));
        assert!(!is_pure_merge_title("feat: add merge dialog"));
    }

    #[test]
    fn test_empty_input_yields_sentinel() {
        assert_eq!(synthesize(&[]), NO_DATA_PROMPT);
    }

    #[test]
    fn test_fully_merge_filtered_yields_sentinel() {
        let commits = vec![commit(
            "1",
            "backend",
            "Merge branch 'dev' into 'main'",
            "2026-08-27T10:00:00+08:00",
        )];
        assert_eq!(synthesize(&commits), NO_DATA_PROMPT);
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let commits = vec![
            commit("1", "backend", "feat: add login", "2026-08-27T10:00:00+08:00"),
            commit("2", "frontend", "fix: button color", "2026-08-27T11:00:00+08:00"),
        ];
        assert_eq!(synthesize(&commits), synthesize(&commits));
    }

    #[test]
    fn test_commits_sorted_ascending_within_group() {
        let commits = vec![
            commit("1", "backend", "fix: later", "2026-08-27T15:00:00+08:00"),
            commit("1", "backend", "feat: earlier", "2026-08-27T09:00:00+08:00"),
        ];
        let prompt = synthesize(&commits);
        assert!(prompt.contains("1. feat: earlier\n2. fix: later"));
    }

    #[test]
    fn test_groups_sorted_by_project_name() {
        let commits = vec![
            commit("9", "zeta", "feat: z work", "2026-08-27T10:00:00+08:00"),
            commit("3", "alpha", "feat: a work", "2026-08-27T11:00:00+08:00"),
        ];
        let prompt = synthesize(&commits);
        let alpha = prompt.find("#### alpha").unwrap();
        let zeta = prompt.find("#### zeta").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn test_body_first_line_continuation() {
        let mut c = commit("1", "backend", "feat: add cache", "2026-08-27T10:00:00+08:00");
        c.message = "implement sled-backed cache layer\n\ndetails".to_string();
        let prompt = synthesize(&[c]);
        assert!(prompt.contains("1. feat: add cache\n   implement sled-backed cache layer\n"));
    }

    #[test]
    fn test_no_continuation_when_body_repeats_title() {
        let c = commit("1", "backend", "feat: add cache", "2026-08-27T10:00:00+08:00");
        let prompt = synthesize(&[c]);
        assert!(prompt.contains("1. feat: add cache\n\n"));
    }

    #[test]
    fn test_end_to_end_two_projects_with_merge() {
        let commits = vec![
            commit("1", "Project A", "feat: x", "2026-08-27T10:00:00+08:00"),
            commit(
                "1",
                "Project A",
                "Merge branch 'b' into 'main'",
                "2026-08-27T11:00:00+08:00",
            ),
            commit("2", "Project B", "fix: y", "2026-08-27T12:00:00+08:00"),
        ];
        let prompt = synthesize(&commits);
        assert!(prompt.contains("#### Project A\n\n1. feat: x\n"));
        assert!(prompt.contains("#### Project B\n\n1. fix: y\n"));
        assert!(!prompt.contains("Merge branch"));
        // Exactly one entry per project
        assert!(!prompt.contains("2. "));
    }
}
