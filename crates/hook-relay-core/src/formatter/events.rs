//! Built-in formatters, one per GitHub event type.

use super::{ensure_object, FormatError, FormatterFn};
use crate::markdown::{
    bold_safe, code_span_safe, escape_markdown, excerpt, first_line, link_text_safe,
};
use crate::payload::{Payload, PayloadView, MISSING_FIELD_PLACEHOLDER};
use std::fmt::Write;

/// Commits listed individually in a push notification.
pub const MAX_LISTED_COMMITS: usize = 5;

pub(super) const DEFAULT_FORMATTERS: &[(&str, FormatterFn)] = &[
    ("ping", format_ping),
    ("push", format_push),
    ("issues", format_issues),
    ("issue_comment", format_issue_comment),
    ("pull_request", format_pull_request),
    ("pull_request_review", format_pull_request_review),
    ("pull_request_review_comment", format_pull_request_review_comment),
    ("discussion", format_discussion),
    ("discussion_comment", format_discussion_comment),
    ("dependabot_alert", format_dependabot_alert),
    ("code_scanning_alert", format_code_scanning_alert),
    ("secret_scanning_alert", format_secret_scanning_alert),
    ("create", format_create),
    ("delete", format_delete),
    ("release", format_release),
    ("fork", format_fork),
    ("star", format_star),
    ("watch", format_watch),
    ("workflow_run", format_workflow_run),
];

// ============================================================================
// Rendering helpers
// ============================================================================

/// Repository name for use inside a bold header.
fn repository(payload: &Payload) -> String {
    bold_safe(&payload.text_or_unknown("repository.full_name"))
}

/// Field rendered inside an inline code span.
fn code(view: PayloadView<'_>, path: &str) -> String {
    code_span_safe(&view.text_or_unknown(path))
}

/// Markdown link, or plain text when there is no URL to point at.
fn link(text: &str, url: Option<String>) -> String {
    match url.filter(|url| !url.is_empty()) {
        Some(url) => format!("[{}]({})", link_text_safe(text), url),
        None => escape_markdown(text),
    }
}

fn action(payload: &Payload) -> Option<String> {
    payload.text("action")
}

fn section<'a>(payload: &'a Payload, name: &str) -> Result<PayloadView<'a>, FormatError> {
    let view = payload.view();
    if !view.has(name) {
        return Err(FormatError::missing(name));
    }
    view.get(name).ok_or_else(|| FormatError::missing(name))
}

fn push_excerpt(message: &mut String, label: &str, body: Option<String>) {
    if let Some(body) = body.filter(|body| !body.trim().is_empty()) {
        let _ = write!(message, "_{}:_\n{}\n", label, excerpt(&body));
    }
}

fn lifecycle_emoji(action: &str) -> &'static str {
    match action {
        "opened" | "created" => "🟢",
        "closed" => "🔴",
        "reopened" => "🔄",
        _ => "",
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Formatters
// ============================================================================

pub fn format_ping(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    let source = payload
        .text("repository.full_name")
        .or_else(|| payload.text("organization.login"))
        .unwrap_or_else(|| "GitHub".to_string());

    Ok(Some(format!(
        "🏓 *Webhook ping from {}*\n*Hook ID:* `{}`\n*Zen:* {}\n",
        bold_safe(&source),
        code(payload.view(), "hook_id"),
        escape_markdown(&payload.text_or_unknown("zen"))
    )))
}

pub fn format_push(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    let commits = payload.items("commits");
    if commits.is_empty() {
        return Ok(None);
    }

    let branch = payload.text_or_unknown("ref");
    let branch = branch.strip_prefix("refs/heads/").unwrap_or(&branch);

    let mut message = format!(
        "🔨 *Push to {}*\n*Branch:* `{}`\n*By:* `{}`\n\n",
        repository(payload),
        code_span_safe(branch),
        code(payload.view(), "pusher.name")
    );

    for commit in commits.iter().take(MAX_LISTED_COMMITS) {
        let id = commit.text_or_unknown("id");
        let short_id: String = id.chars().take(7).collect();
        let subject = commit.text("message").unwrap_or_default();

        // Entities cannot nest, so a linked sha is plain link text.
        let sha = match commit.text("url").filter(|url| !url.is_empty()) {
            Some(url) => format!("[{}]({})", link_text_safe(&short_id), url),
            None => format!("`{}`", code_span_safe(&short_id)),
        };

        let _ = writeln!(
            message,
            "• {}: {}",
            sha,
            escape_markdown(first_line(&subject))
        );
    }

    if commits.len() > MAX_LISTED_COMMITS {
        let _ = write!(
            message,
            "\n_...and {} more commits_",
            commits.len() - MAX_LISTED_COMMITS
        );
    }

    Ok(Some(message))
}

pub fn format_issues(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    let action = match action(payload) {
        Some(action) if matches!(action.as_str(), "opened" | "closed" | "reopened") => action,
        _ => return Ok(None),
    };
    let issue = section(payload, "issue")?;

    let mut message = format!(
        "{} *Issue {} in {}*\n*#{}:* {}\n*By:* `{}`\n\n",
        lifecycle_emoji(&action),
        action,
        repository(payload),
        issue.text_or_unknown("number"),
        link(&issue.text_or_unknown("title"), issue.text("html_url")),
        code(issue, "user.login")
    );

    if action == "opened" {
        push_excerpt(&mut message, "Description", issue.text("body"));
    }

    Ok(Some(message))
}

pub fn format_issue_comment(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    if action(payload).as_deref() != Some("created") {
        return Ok(None);
    }
    let comment = section(payload, "comment")?;
    let issue = section(payload, "issue")?;

    let mut message = format!(
        "💬 *New comment on {}*\n*Issue #{}:* {}\n*By:* `{}`\n\n",
        repository(payload),
        issue.text_or_unknown("number"),
        link(&issue.text_or_unknown("title"), comment.text("html_url")),
        code(comment, "user.login")
    );
    push_excerpt(&mut message, "Comment", comment.text("body"));

    Ok(Some(message))
}

pub fn format_pull_request(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    let action = match action(payload) {
        Some(action) if matches!(action.as_str(), "opened" | "closed" | "reopened") => action,
        _ => return Ok(None),
    };
    let pr = section(payload, "pull_request")?;

    let merged = action == "closed" && pr.flag("merged");
    let (emoji, verb) = if merged {
        ("🟣", "merged")
    } else {
        (lifecycle_emoji(&action), action.as_str())
    };

    let mut message = format!(
        "{} *Pull Request {} in {}*\n*#{}:* {}\n*By:* `{}`\n\n",
        emoji,
        verb,
        repository(payload),
        pr.text_or_unknown("number"),
        link(&pr.text_or_unknown("title"), pr.text("html_url")),
        code(pr, "user.login")
    );

    if action == "opened" {
        push_excerpt(&mut message, "Description", pr.text("body"));
    }

    Ok(Some(message))
}

pub fn format_pull_request_review(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    if action(payload).as_deref() != Some("submitted") {
        return Ok(None);
    }
    let review = section(payload, "review")?;
    let pr = section(payload, "pull_request")?;

    let state = review.text("state").unwrap_or_default().to_lowercase();
    let emoji = match state.as_str() {
        "approved" => "✅",
        "changes_requested" => "❌",
        "commented" => "💭",
        _ => return Ok(None),
    };

    let mut message = format!(
        "{} *Pull Request Review in {}*\n*PR #{}:* {}\n*Reviewer:* `{}`\n*Status:* {}\n\n",
        emoji,
        repository(payload),
        pr.text_or_unknown("number"),
        link(&pr.text_or_unknown("title"), review.text("html_url")),
        code(review, "user.login"),
        escape_markdown(&state)
    );
    push_excerpt(&mut message, "Review comment", review.text("body"));

    Ok(Some(message))
}

pub fn format_pull_request_review_comment(
    payload: &Payload,
) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    if action(payload).as_deref() != Some("created") {
        return Ok(None);
    }
    let comment = section(payload, "comment")?;
    let pr = section(payload, "pull_request")?;

    let mut message = format!(
        "💬 *New review comment on {}*\n*PR #{}:* {}\n*By:* `{}`\n*File:* `{}`\n",
        repository(payload),
        pr.text_or_unknown("number"),
        link(&pr.text_or_unknown("title"), comment.text("html_url")),
        code(comment, "user.login"),
        code(comment, "path")
    );

    if let Some(line) = comment.text("line").or_else(|| comment.text("position")) {
        let _ = writeln!(message, "*Line:* `{}`", code_span_safe(&line));
    }
    message.push('\n');
    push_excerpt(&mut message, "Comment", comment.text("body"));

    Ok(Some(message))
}

pub fn format_discussion(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    let action = match action(payload) {
        Some(action) if matches!(action.as_str(), "created" | "closed" | "reopened") => action,
        _ => return Ok(None),
    };
    let discussion = section(payload, "discussion")?;

    let mut message = format!(
        "{} *Discussion {} in {}*\n*#{}:* {}\n*By:* `{}`\n*Category:* {}\n\n",
        lifecycle_emoji(&action),
        action,
        repository(payload),
        discussion.text_or_unknown("number"),
        link(
            &discussion.text_or_unknown("title"),
            discussion.text("html_url")
        ),
        code(discussion, "user.login"),
        escape_markdown(&discussion.text_or_unknown("category.name"))
    );

    if action == "created" {
        push_excerpt(&mut message, "Description", discussion.text("body"));
    }

    Ok(Some(message))
}

pub fn format_discussion_comment(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    if action(payload).as_deref() != Some("created") {
        return Ok(None);
    }
    let comment = section(payload, "comment")?;
    let discussion = section(payload, "discussion")?;

    let mut message = format!(
        "💬 *New comment on discussion in {}*\n*Discussion #{}:* {}\n*By:* `{}`\n\n",
        repository(payload),
        discussion.text_or_unknown("number"),
        link(
            &discussion.text_or_unknown("title"),
            comment.text("html_url")
        ),
        code(comment, "user.login")
    );
    push_excerpt(&mut message, "Comment", comment.text("body"));

    Ok(Some(message))
}

pub fn format_dependabot_alert(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    let alert = section(payload, "alert")?;
    let action = payload.text_or_unknown("action");
    let emoji = match action.as_str() {
        "created" => "🚨",
        "fixed" => "✅",
        "dismissed" => "🚫",
        _ => "⚠️",
    };

    Ok(Some(format!(
        "{} *Dependabot Alert {} in {}*\n*Package:* `{}`\n*Severity:* {}\n*Affected versions:* `{}`\n*Details:* {}\n",
        emoji,
        bold_safe(&action),
        repository(payload),
        code(alert, "dependency.package.name"),
        escape_markdown(&alert.text_or_unknown("security_vulnerability.severity")),
        code(alert, "security_vulnerability.vulnerable_version_range"),
        link("View alert", alert.text("html_url"))
    )))
}

pub fn format_code_scanning_alert(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    let alert = section(payload, "alert")?;
    let action = payload.text_or_unknown("action");
    let emoji = match action.as_str() {
        "created" => "🚨",
        "fixed" => "✅",
        "closed" | "closed_by_user" => "🚫",
        _ => "⚠️",
    };

    Ok(Some(format!(
        "{} *Code Scanning Alert {} in {}*\n*Rule:* `{}`\n*Severity:* {}\n*Details:* {}\n",
        emoji,
        bold_safe(&action),
        repository(payload),
        code(alert, "rule.id"),
        escape_markdown(&alert.text_or_unknown("rule.severity")),
        link("View alert", alert.text("html_url"))
    )))
}

pub fn format_secret_scanning_alert(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    let alert = section(payload, "alert")?;
    let action = payload.text_or_unknown("action");
    let emoji = match action.as_str() {
        "created" => "🚨",
        "resolved" => "✅",
        "reopened" => "🔄",
        _ => "⚠️",
    };

    Ok(Some(format!(
        "{} *Secret Scanning Alert {} in {}*\n*Secret Type:* `{}`\n*Details:* {}\n",
        emoji,
        bold_safe(&action),
        repository(payload),
        code(alert, "secret_type"),
        link("View alert", alert.text("html_url"))
    )))
}

fn ref_emoji(ref_type: &str) -> &'static str {
    match ref_type {
        "tag" => "🏷️",
        _ => "🌿",
    }
}

pub fn format_create(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    let ref_type = payload.text_or("ref_type", "ref");
    Ok(Some(format!(
        "{} *{} created in {}*\n*Name:* `{}`\n*By:* `{}`\n",
        ref_emoji(&ref_type),
        bold_safe(&capitalize(&ref_type)),
        repository(payload),
        code(payload.view(), "ref"),
        code(payload.view(), "sender.login")
    )))
}

pub fn format_delete(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    let ref_type = payload.text_or("ref_type", "ref");
    Ok(Some(format!(
        "🗑️ *{} deleted in {}*\n*Name:* `{}`\n*By:* `{}`\n",
        bold_safe(&capitalize(&ref_type)),
        repository(payload),
        code(payload.view(), "ref"),
        code(payload.view(), "sender.login")
    )))
}

pub fn format_release(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    if action(payload).as_deref() != Some("published") {
        return Ok(None);
    }
    let release = section(payload, "release")?;

    let tag = release.text_or_unknown("tag_name");
    let name = release.text_or("name", &tag);

    let mut message = format!(
        "🚀 *Release published in {}*\n*Tag:* `{}`\n*Name:* {}\n*By:* `{}`\n\n",
        repository(payload),
        code_span_safe(&tag),
        link(&name, release.text("html_url")),
        code(release, "author.login")
    );
    push_excerpt(&mut message, "Release notes", release.text("body"));

    Ok(Some(message))
}

pub fn format_fork(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    Ok(Some(format!(
        "🍴 *{} was forked*\n*Fork:* {}\n*By:* `{}`\n",
        repository(payload),
        link(
            &payload.text_or_unknown("forkee.full_name"),
            payload.text("forkee.html_url")
        ),
        code(payload.view(), "sender.login")
    )))
}

pub fn format_star(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    if action(payload).as_deref() != Some("created") {
        return Ok(None);
    }

    let mut message = format!(
        "⭐ *{} was starred*\n*By:* `{}`\n",
        repository(payload),
        code(payload.view(), "sender.login")
    );
    if let Some(count) = payload.text("repository.stargazers_count") {
        let _ = writeln!(message, "*Stars:* {}", count);
    }

    Ok(Some(message))
}

pub fn format_watch(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    if action(payload).as_deref() != Some("started") {
        return Ok(None);
    }

    Ok(Some(format!(
        "👀 *{} is being watched*\n*By:* `{}`\n",
        repository(payload),
        code(payload.view(), "sender.login")
    )))
}

pub fn format_workflow_run(payload: &Payload) -> Result<Option<String>, FormatError> {
    ensure_object(payload)?;

    if action(payload).as_deref() != Some("completed") {
        return Ok(None);
    }
    let run = section(payload, "workflow_run")?;

    let conclusion = run.text_or_unknown("conclusion");
    let emoji = match conclusion.as_str() {
        "success" => "✅",
        "failure" | "timed_out" => "❌",
        "cancelled" => "🚫",
        _ => "⚠️",
    };
    let run_label = match run.text("run_number") {
        Some(number) => format!("#{}", number),
        None => MISSING_FIELD_PLACEHOLDER.to_string(),
    };

    Ok(Some(format!(
        "{} *Workflow {} {} in {}*\n*Branch:* `{}`\n*Run:* {}\n*Triggered by:* `{}`\n",
        emoji,
        bold_safe(&run.text_or_unknown("name")),
        bold_safe(&conclusion),
        repository(payload),
        code(run, "head_branch"),
        link(&run_label, run.text("html_url")),
        code(run, "actor.login")
    )))
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
