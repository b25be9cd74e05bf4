use super::*;

// =============================================================
// ChatMessageResponse
// =============================================================

#[test]
fn chat_message_response_maps_is_user_message_flag() {
    let raw = r#"{"id": 4, "message": "hi", "is_user_message": 1, "created_at": "2024-05-01T10:00:00Z", "project_id": 9}"#;
    let msg = serde_json::from_str::<ChatMessageResponse>(raw)
        .unwrap()
        .into_message();
    assert_eq!(msg.id, MessageId(4));
    assert_eq!(msg.role, ChatRole::User);
    assert_eq!(msg.content, "hi");
    assert_eq!(msg.timestamp, "2024-05-01T10:00:00Z");
}

#[test]
fn chat_message_response_zero_flag_is_assistant() {
    let raw = r#"{"id": 5, "message": "answer", "is_user_message": 0, "created_at": ""}"#;
    let msg = serde_json::from_str::<ChatMessageResponse>(raw)
        .unwrap()
        .into_message();
    assert_eq!(msg.role, ChatRole::Assistant);
}

#[test]
fn chat_message_response_accepts_role_content_shape() {
    let raw = r#"{"id": 6, "content": "hey", "role": "user", "timestamp": "2024-05-01T10:00:00Z"}"#;
    let msg = serde_json::from_str::<ChatMessageResponse>(raw)
        .unwrap()
        .into_message();
    assert_eq!(msg.role, ChatRole::User);
    assert_eq!(msg.content, "hey");
    assert_eq!(msg.timestamp, "2024-05-01T10:00:00Z");
}

// =============================================================
// SessionResponse
// =============================================================

#[test]
fn session_response_blank_or_missing_id_is_absent() {
    assert!(serde_json::from_str::<SessionResponse>("{}").unwrap().into_session_id().is_none());
    assert!(
        serde_json::from_str::<SessionResponse>(r#"{"session_id": null}"#)
            .unwrap()
            .into_session_id()
            .is_none()
    );
    assert!(
        serde_json::from_str::<SessionResponse>(r#"{"session_id": "  "}"#)
            .unwrap()
            .into_session_id()
            .is_none()
    );
}

#[test]
fn session_response_reads_id_alias() {
    let resp = serde_json::from_str::<SessionResponse>(r#"{"id": "s-1"}"#).unwrap();
    assert_eq!(resp.into_session_id(), Some(SessionId("s-1".to_owned())));
}

// =============================================================
// SessionHistory
// =============================================================

#[test]
fn session_history_keeps_server_order() {
    let raw = r#"{
        "id": "s-1",
        "title": "Lease review",
        "created_at": "2024-05-01T09:00:00Z",
        "messages": [
            {"id": 2, "message": "q", "is_user_message": 1, "created_at": "b"},
            {"id": 1, "message": "a", "is_user_message": 0, "created_at": "a"}
        ]
    }"#;
    let history: SessionHistory = serde_json::from_str::<ChatSessionResponse>(raw).unwrap().into();
    assert_eq!(history.session.id, SessionId("s-1".to_owned()));
    assert_eq!(history.session.title, "Lease review");
    let ids: Vec<i64> = history.messages.iter().map(|m| m.id.0).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn page_response_defaults_missing_text() {
    let page = serde_json::from_str::<PageResponse>(r#"{"id": 1, "page_number": 3}"#).unwrap();
    assert_eq!(page.text_content, "");
    assert!(page.generated_form_html.is_none());
}

#[test]
fn generated_html_response_reads_html_content() {
    let resp = serde_json::from_str::<GeneratedHtmlResponse>(r#"{"html_content": "<form></form>"}"#).unwrap();
    assert_eq!(resp.html_content, "<form></form>");
    assert_eq!(serde_json::from_str::<GeneratedHtmlResponse>("{}").unwrap().html_content, "");
}
