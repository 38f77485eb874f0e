use super::*;
use serde_json::json;

fn payload(value: serde_json::Value) -> Payload {
    Payload::new(value)
}

fn repo() -> serde_json::Value {
    json!({ "full_name": "octo/relay", "stargazers_count": 42 })
}

mod ping_tests {
    use super::*;

    #[test]
    fn test_ping_contains_zen_and_hook_id() {
        let message = format_ping(&payload(json!({ "zen": "test", "hook_id": 1 })))
            .unwrap()
            .unwrap();

        assert!(message.contains("test"));
        assert!(message.contains("`1`"));
        assert!(message.contains("GitHub"));
    }

    #[test]
    fn test_ping_without_fields_uses_placeholder() {
        let message = format_ping(&payload(json!({ "repository": repo() })))
            .unwrap()
            .unwrap();

        assert!(message.contains("octo/relay"));
        assert!(message.contains("unknown"));
    }
}

mod push_tests {
    use super::*;

    fn commit(i: usize) -> serde_json::Value {
        json!({
            "id": format!("{:07}abcdef", i),
            "message": format!("Commit {}\n\nlong body", i),
            "url": format!("https://github.com/octo/relay/commit/{}", i)
        })
    }

    #[test]
    fn test_push_lists_commits_with_short_sha_and_subject() {
        let message = format_push(&payload(json!({
            "ref": "refs/heads/main",
            "repository": repo(),
            "pusher": { "name": "alice" },
            "commits": [commit(1)]
        })))
        .unwrap()
        .unwrap();

        assert!(message.contains("*Push to octo/relay*"));
        assert!(message.contains("`main`"));
        assert!(message.contains("`alice`"));
        assert!(message.contains("[0000001](https://github.com/octo/relay/commit/1): Commit 1"));
        assert!(!message.contains("long body"));
    }

    #[test]
    fn test_push_caps_listed_commits() {
        let commits: Vec<_> = (0..8).map(commit).collect();
        let message = format_push(&payload(json!({
            "ref": "refs/heads/main",
            "commits": commits
        })))
        .unwrap()
        .unwrap();

        assert_eq!(message.matches("• ").count(), MAX_LISTED_COMMITS);
        assert!(message.contains("...and 3 more commits"));
    }

    #[test]
    fn test_push_without_commits_is_skipped() {
        assert_eq!(
            format_push(&payload(json!({ "ref": "refs/heads/main", "commits": [] }))),
            Ok(None)
        );
        assert_eq!(format_push(&payload(json!({ "ref": "refs/tags/v1" }))), Ok(None));
    }
}

mod issue_tests {
    use super::*;

    fn issue_event(action: &str) -> Payload {
        payload(json!({
            "action": action,
            "repository": repo(),
            "issue": {
                "number": 12,
                "title": "Crash on *start*",
                "html_url": "https://github.com/octo/relay/issues/12",
                "user": { "login": "bob" },
                "body": "Steps to reproduce"
            }
        }))
    }

    #[test]
    fn test_opened_issue_includes_excerpt() {
        let message = format_issues(&issue_event("opened")).unwrap().unwrap();

        assert!(message.starts_with("🟢 *Issue opened in octo/relay*"));
        assert!(message.contains("*#12:* [Crash on *start*](https://github.com/octo/relay/issues/12)"));
        assert!(message.contains("_Description:_\nSteps to reproduce"));
    }

    #[test]
    fn test_closed_issue_omits_excerpt() {
        let message = format_issues(&issue_event("closed")).unwrap().unwrap();

        assert!(message.starts_with("🔴"));
        assert!(!message.contains("Description"));
    }

    #[test]
    fn test_unsupported_issue_actions_are_filtered() {
        assert_eq!(format_issues(&issue_event("labeled")), Ok(None));
        assert_eq!(format_issues(&payload(json!({ "issue": {} }))), Ok(None));
    }

    #[test]
    fn test_issue_without_issue_section_is_an_error() {
        let result = format_issues(&payload(json!({ "action": "opened" })));
        assert!(matches!(result, Err(FormatError::MissingSection { .. })));
    }

    #[test]
    fn test_issue_comment_is_rendered() {
        let message = format_issue_comment(&payload(json!({
            "action": "created",
            "repository": repo(),
            "issue": { "number": 3, "title": "Docs" },
            "comment": {
                "user": { "login": "carol" },
                "body": "LGTM",
                "html_url": "https://github.com/octo/relay/issues/3#c1"
            }
        })))
        .unwrap()
        .unwrap();

        assert!(message.contains("*Issue #3:* [Docs](https://github.com/octo/relay/issues/3#c1)"));
        assert!(message.contains("`carol`"));
        assert!(message.contains("_Comment:_\nLGTM"));
    }

    #[test]
    fn test_edited_issue_comment_is_filtered() {
        let result = format_issue_comment(&payload(json!({
            "action": "edited",
            "issue": { "number": 3 },
            "comment": { "body": "x" }
        })));
        assert_eq!(result, Ok(None));
    }
}

mod entity_text_tests {
    use super::*;

    #[test]
    fn test_underscores_inside_entities_are_left_alone() {
        let message = format_issues(&payload(json!({
            "action": "opened",
            "repository": { "full_name": "org/my_repo" },
            "issue": {
                "number": 3,
                "title": "snake_case bug",
                "html_url": "https://x/3",
                "user": { "login": "dev_one" }
            }
        })))
        .unwrap()
        .unwrap();

        assert!(message.starts_with("🟢 *Issue opened in org/my_repo*\n*#3:* [snake_case bug](https://x/3)"));
        assert!(!message.contains('\\'));
    }

    #[test]
    fn test_entity_closing_characters_are_replaced() {
        let message = format_pull_request(&payload(json!({
            "action": "opened",
            "repository": { "full_name": "org/*star*" },
            "pull_request": {
                "number": 9,
                "title": "Handle [draft] PRs",
                "html_url": "https://x/9",
                "user": { "login": "dev" }
            }
        })))
        .unwrap()
        .unwrap();

        assert!(message.contains("*Pull Request opened in org/∗star∗*"));
        assert!(message.contains("[Handle (draft) PRs](https://x/9)"));
    }

    #[test]
    fn test_unlinked_title_is_escaped_as_plain_text() {
        let message = format_issues(&payload(json!({
            "action": "closed",
            "repository": repo(),
            "issue": { "number": 4, "title": "snake_case bug" }
        })))
        .unwrap()
        .unwrap();

        assert!(message.contains("*#4:* snake\\_case bug"));
    }
}

mod pull_request_tests {
    use super::*;

    fn pr_event(action: &str, merged: bool) -> Payload {
        payload(json!({
            "action": action,
            "repository": repo(),
            "pull_request": {
                "number": 5,
                "title": "Fix bug",
                "html_url": "https://github.com/octo/relay/pull/5",
                "user": { "login": "alice" },
                "body": "x".repeat(400),
                "merged": merged
            }
        }))
    }

    #[test]
    fn test_opened_pull_request() {
        let message = format_pull_request(&pr_event("opened", false))
            .unwrap()
            .unwrap();

        assert!(message.contains("#5"));
        assert!(message.contains("Fix bug"));
        assert!(message.contains("alice"));
        assert!(message.contains(&format!("{}...", "x".repeat(197))));
        assert!(!message.contains(&"x".repeat(198)));
    }

    #[test]
    fn test_merged_pull_request_is_marked_merged() {
        let message = format_pull_request(&pr_event("closed", true))
            .unwrap()
            .unwrap();

        assert!(message.starts_with("🟣 *Pull Request merged in octo/relay*"));
        assert!(!message.contains("🔴"));
    }

    #[test]
    fn test_closed_unmerged_pull_request() {
        let message = format_pull_request(&pr_event("closed", false))
            .unwrap()
            .unwrap();

        assert!(message.starts_with("🔴 *Pull Request closed"));
    }

    #[test]
    fn test_labeled_pull_request_is_filtered() {
        assert_eq!(format_pull_request(&pr_event("labeled", false)), Ok(None));
        assert_eq!(format_pull_request(&pr_event("synchronize", false)), Ok(None));
    }

    #[test]
    fn test_missing_nested_fields_render_placeholder() {
        let message = format_pull_request(&payload(json!({
            "action": "reopened",
            "pull_request": { "number": 9 }
        })))
        .unwrap()
        .unwrap();

        assert!(message.contains("🔄 *Pull Request reopened in unknown*"));
        assert!(message.contains("*#9:* unknown"));
        assert!(message.contains("`unknown`"));
    }

    #[test]
    fn test_review_states() {
        for (state, emoji) in [
            ("approved", "✅"),
            ("CHANGES_REQUESTED", "❌"),
            ("commented", "💭"),
        ] {
            let message = format_pull_request_review(&payload(json!({
                "action": "submitted",
                "repository": repo(),
                "pull_request": { "number": 5, "title": "Fix bug" },
                "review": { "state": state, "user": { "login": "dave" }, "body": "ok" }
            })))
            .unwrap()
            .unwrap();

            assert!(message.starts_with(emoji), "state {}", state);
            assert!(message.contains("`dave`"));
        }
    }

    #[test]
    fn test_review_with_dismissed_state_is_filtered() {
        let result = format_pull_request_review(&payload(json!({
            "action": "submitted",
            "pull_request": { "number": 5 },
            "review": { "state": "dismissed" }
        })));
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn test_review_comment_includes_file_and_line() {
        let message = format_pull_request_review_comment(&payload(json!({
            "action": "created",
            "repository": repo(),
            "pull_request": { "number": 5, "title": "Fix bug" },
            "comment": {
                "user": { "login": "erin" },
                "path": "src/main.rs",
                "line": 17,
                "body": "nit"
            }
        })))
        .unwrap()
        .unwrap();

        assert!(message.contains("*File:* `src/main.rs`"));
        assert!(message.contains("*Line:* `17`"));
        assert!(message.contains("_Comment:_\nnit"));
    }
}

mod discussion_tests {
    use super::*;

    #[test]
    fn test_created_discussion_includes_category() {
        let message = format_discussion(&payload(json!({
            "action": "created",
            "repository": repo(),
            "discussion": {
                "number": 8,
                "title": "Roadmap",
                "user": { "login": "frank" },
                "category": { "name": "Ideas" },
                "body": "What next?"
            }
        })))
        .unwrap()
        .unwrap();

        assert!(message.starts_with("🟢 *Discussion created"));
        assert!(message.contains("*Category:* Ideas"));
        assert!(message.contains("What next?"));
    }

    #[test]
    fn test_discussion_comment() {
        let message = format_discussion_comment(&payload(json!({
            "action": "created",
            "repository": repo(),
            "discussion": { "number": 8, "title": "Roadmap" },
            "comment": { "user": { "login": "gina" }, "body": "+1" }
        })))
        .unwrap()
        .unwrap();

        assert!(message.contains("*Discussion #8:* Roadmap"));
        assert!(message.contains("`gina`"));
    }

    #[test]
    fn test_answered_discussion_is_filtered() {
        let result = format_discussion(&payload(json!({
            "action": "answered",
            "discussion": { "number": 8 }
        })));
        assert_eq!(result, Ok(None));
    }
}

mod security_alert_tests {
    use super::*;

    #[test]
    fn test_dependabot_alert() {
        let message = format_dependabot_alert(&payload(json!({
            "action": "created",
            "repository": repo(),
            "alert": {
                "dependency": { "package": { "name": "openssl" } },
                "security_vulnerability": {
                    "severity": "high",
                    "vulnerable_version_range": "< 0.10.55"
                },
                "html_url": "https://github.com/octo/relay/security/dependabot/1"
            }
        })))
        .unwrap()
        .unwrap();

        assert!(message.starts_with("🚨 *Dependabot Alert created"));
        assert!(message.contains("`openssl`"));
        assert!(message.contains("*Severity:* high"));
        assert!(message.contains("[View alert](https://github.com/octo/relay/security/dependabot/1)"));
    }

    #[test]
    fn test_alert_emoji_falls_back_for_other_actions() {
        let message = format_dependabot_alert(&payload(json!({
            "action": "auto_reopened",
            "alert": { "number": 1 }
        })))
        .unwrap()
        .unwrap();

        assert!(message.starts_with("⚠️"));
        assert!(message.contains("*Dependabot Alert auto_reopened in"));
    }

    #[test]
    fn test_code_scanning_alert() {
        let message = format_code_scanning_alert(&payload(json!({
            "action": "fixed",
            "repository": repo(),
            "alert": { "rule": { "id": "js/xss", "severity": "error" } }
        })))
        .unwrap()
        .unwrap();

        assert!(message.starts_with("✅"));
        assert!(message.contains("`js/xss`"));
        assert!(message.contains("*Details:* View alert"));
    }

    #[test]
    fn test_secret_scanning_alert() {
        let message = format_secret_scanning_alert(&payload(json!({
            "action": "resolved",
            "alert": { "secret_type": "github_personal_access_token" }
        })))
        .unwrap()
        .unwrap();

        assert!(message.starts_with("✅"));
        assert!(message.contains("`github_personal_access_token`"));
    }

    #[test]
    fn test_alert_without_alert_section_is_an_error() {
        assert!(format_secret_scanning_alert(&payload(json!({ "action": "created" }))).is_err());
    }
}

mod repository_event_tests {
    use super::*;

    #[test]
    fn test_tag_created() {
        let message = format_create(&payload(json!({
            "ref": "v1.2.0",
            "ref_type": "tag",
            "repository": repo(),
            "sender": { "login": "hank" }
        })))
        .unwrap()
        .unwrap();

        assert!(message.starts_with("🏷️ *Tag created in octo/relay*"));
        assert!(message.contains("`v1.2.0`"));
    }

    #[test]
    fn test_branch_deleted() {
        let message = format_delete(&payload(json!({
            "ref": "feature/x",
            "ref_type": "branch"
        })))
        .unwrap()
        .unwrap();

        assert!(message.contains("*Branch deleted in unknown*"));
        assert!(message.contains("`feature/x`"));
    }

    #[test]
    fn test_published_release() {
        let message = format_release(&payload(json!({
            "action": "published",
            "repository": repo(),
            "release": {
                "tag_name": "v2.0.0",
                "html_url": "https://github.com/octo/relay/releases/v2.0.0",
                "author": { "login": "ivy" },
                "body": "Highlights"
            }
        })))
        .unwrap()
        .unwrap();

        assert!(message.contains("*Tag:* `v2.0.0`"));
        assert!(message.contains("[v2.0.0](https://github.com/octo/relay/releases/v2.0.0)"));
        assert!(message.contains("Highlights"));
    }

    #[test]
    fn test_draft_release_actions_are_filtered() {
        let result = format_release(&payload(json!({
            "action": "created",
            "release": { "tag_name": "v2" }
        })));
        assert_eq!(result, Ok(None));
    }

    #[test]
    fn test_fork_star_and_watch() {
        let fork = format_fork(&payload(json!({
            "repository": repo(),
            "forkee": { "full_name": "jack/relay", "html_url": "https://github.com/jack/relay" },
            "sender": { "login": "jack" }
        })))
        .unwrap()
        .unwrap();
        assert!(fork.contains("[jack/relay](https://github.com/jack/relay)"));

        let star = format_star(&payload(json!({
            "action": "created",
            "repository": repo(),
            "sender": { "login": "kim" }
        })))
        .unwrap()
        .unwrap();
        assert!(star.contains("*Stars:* 42"));

        assert_eq!(
            format_star(&payload(json!({ "action": "deleted" }))),
            Ok(None)
        );

        let watch = format_watch(&payload(json!({
            "action": "started",
            "sender": { "login": "lee" }
        })))
        .unwrap()
        .unwrap();
        assert!(watch.contains("`lee`"));
    }

    #[test]
    fn test_completed_workflow_run() {
        let message = format_workflow_run(&payload(json!({
            "action": "completed",
            "repository": repo(),
            "workflow_run": {
                "name": "CI",
                "conclusion": "failure",
                "head_branch": "main",
                "run_number": 77,
                "html_url": "https://github.com/octo/relay/actions/runs/1",
                "actor": { "login": "mona" }
            }
        })))
        .unwrap()
        .unwrap();

        assert!(message.starts_with("❌ *Workflow CI failure in octo/relay*"));
        assert!(message.contains("[#77](https://github.com/octo/relay/actions/runs/1)"));
    }

    #[test]
    fn test_requested_workflow_run_is_filtered() {
        let result = format_workflow_run(&payload(json!({
            "action": "requested",
            "workflow_run": { "name": "CI" }
        })));
        assert_eq!(result, Ok(None));
    }
}

#[test]
fn test_non_object_payloads_are_rejected() {
    for (_, formatter) in DEFAULT_FORMATTERS {
        let result = formatter(&payload(json!(["not", "an", "object"])));
        assert!(matches!(result, Err(FormatError::NotAnObject { .. })));
    }
}

#[test]
fn test_capitalize() {
    assert_eq!(capitalize("branch"), "Branch");
    assert_eq!(capitalize(""), "");
}
