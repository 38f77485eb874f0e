use super::*;

fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

mod header_tests {
    use super::*;

    #[test]
    fn test_headers_are_case_insensitive() {
        let parsed = WebhookHeaders::from_http_headers(&headers(&[
            ("x-github-event", "push"),
            ("X-GITHUB-DELIVERY", "72d3162e-cc78-11e3-81ab-4c9367dc0958"),
            ("user-agent", "GitHub-Hookshot/abc"),
        ]))
        .unwrap();

        assert_eq!(parsed.event_type.as_str(), "push");
        assert_eq!(
            parsed.delivery_id.as_deref(),
            Some("72d3162e-cc78-11e3-81ab-4c9367dc0958")
        );
        assert_eq!(parsed.user_agent.as_deref(), Some("GitHub-Hookshot/abc"));
    }

    #[test]
    fn test_missing_event_header_is_required() {
        let result = WebhookHeaders::from_http_headers(&headers(&[("content-type", "application/json")]));

        assert_eq!(
            result,
            Err(ValidationError::Required {
                field: "X-GitHub-Event".to_string()
            })
        );
    }

    #[test]
    fn test_blank_event_header_is_required() {
        let result = WebhookHeaders::from_http_headers(&headers(&[("X-GitHub-Event", "  ")]));
        assert!(matches!(result, Err(ValidationError::Required { .. })));
    }

    #[test]
    fn test_delivery_id_is_optional() {
        let parsed =
            WebhookHeaders::from_http_headers(&headers(&[("X-GitHub-Event", "ping")])).unwrap();
        assert_eq!(parsed.delivery_id, None);
    }
}

mod payload_tests {
    use super::*;

    #[test]
    fn test_empty_bodies_are_rejected() {
        assert_eq!(parse_payload(b""), Err(PayloadError::Empty));
        assert_eq!(parse_payload(b"  \n"), Err(PayloadError::Empty));
        assert_eq!(parse_payload(b"null"), Err(PayloadError::Empty));
        assert_eq!(parse_payload(b"{}"), Err(PayloadError::Empty));
        assert_eq!(parse_payload(b"[]"), Err(PayloadError::Empty));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(matches!(
            parse_payload(b"{\"zen\":"),
            Err(PayloadError::Malformed { .. })
        ));
        assert!(matches!(
            parse_payload(b"payload=%7B%7D"),
            Err(PayloadError::Malformed { .. })
        ));
    }

    #[test]
    fn test_object_payload_is_accepted() {
        let payload = parse_payload(br#"{"zen":"test","hook_id":1}"#).unwrap();
        assert_eq!(payload.text("zen").as_deref(), Some("test"));
    }
}

#[test]
fn test_event_from_request() {
    let event = WebhookEvent::from_request(
        &headers(&[("X-GitHub-Event", "ping"), ("X-GitHub-Delivery", "d-1")]),
        &Bytes::from_static(br#"{"zen":"test","hook_id":1}"#),
    )
    .unwrap();

    assert_eq!(event.event_type().as_str(), "ping");
    assert_eq!(event.delivery_id(), Some("d-1"));
    assert_eq!(event.payload().text("hook_id").as_deref(), Some("1"));
}

#[test]
fn test_headers_are_checked_before_body() {
    let result = WebhookEvent::from_request(&headers(&[]), &Bytes::new());
    assert!(matches!(result, Err(WebhookError::Headers(_))));

    let result = WebhookEvent::from_request(&headers(&[("X-GitHub-Event", "ping")]), &Bytes::new());
    assert_eq!(result, Err(WebhookError::Payload(PayloadError::Empty)));
}
