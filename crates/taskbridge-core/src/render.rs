//! Message bodies posted to the tracker and to pull requests.

use crate::domain::event::PrAction;

const COMMIT_ICON: &str = "🔨";
const PULL_REQUEST_ICON: &str = "🔀";

/// Escape text for inclusion in an HTML message body.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Tracker message for a commit that references a task.
pub fn commit_message(short_hash: &str, commit_url: &str, commit_title: &str) -> String {
    format!(
        "{COMMIT_ICON} Commit <a href=\"{}\">{}</a>: {}",
        escape_html(commit_url),
        escape_html(short_hash),
        escape_html(commit_title)
    )
}

/// Word describing what happened to a pull request.
pub fn pull_request_action_word(action: &PrAction, merged: bool) -> &str {
    match action {
        PrAction::Closed if merged => "merged",
        PrAction::Closed => "closed",
        other => other.as_str(),
    }
}

/// Tracker message for a pull request that references a task.
pub fn pull_request_message(
    action_word: &str,
    number: u64,
    url: &str,
    title: &str,
    author_login: Option<&str>,
) -> String {
    let mut body = format!(
        "{PULL_REQUEST_ICON} Pull request <a href=\"{}\">#{number}</a> {}: {}",
        escape_html(url),
        escape_html(action_word),
        escape_html(title)
    );
    if let Some(login) = author_login {
        body.push_str(&format!(" (by {})", escape_html(login)));
    }
    body
}

/// Plain-text summary comment for a pull request.
pub fn summary_comment(task_ids: &[String]) -> String {
    format!("Task tracker updated: {}", task_ids.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_commit_message_links_commit() {
        let body = commit_message("abc1234", "https://example.test/c/abc1234", "Fix <div>");
        assert_eq!(
            body,
            "🔨 Commit <a href=\"https://example.test/c/abc1234\">abc1234</a>: Fix &lt;div&gt;"
        );
    }

    #[test]
    fn test_action_word() {
        assert_eq!(pull_request_action_word(&PrAction::Closed, true), "merged");
        assert_eq!(pull_request_action_word(&PrAction::Closed, false), "closed");
        assert_eq!(pull_request_action_word(&PrAction::Opened, false), "opened");
        assert_eq!(pull_request_action_word(&PrAction::Reopened, true), "reopened");
    }

    #[test]
    fn test_pull_request_message_with_author() {
        let body = pull_request_message("merged", 7, "https://example.test/pr/7", "Closes ODP-1", Some("octocat"));
        assert!(body.starts_with("🔀 Pull request <a href=\"https://example.test/pr/7\">#7</a> merged"));
        assert!(body.ends_with("(by octocat)"));
    }

    #[test]
    fn test_summary_comment_joins_ids() {
        let ids = vec!["ODP-1".to_string(), "ODP-2".to_string()];
        assert_eq!(summary_comment(&ids), "Task tracker updated: ODP-1, ODP-2");
    }
}
