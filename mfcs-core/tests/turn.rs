use mfcs_core::{CallFamily, Markers, Settings, Turn, TurnEvent};
use serde_json::json;
use std::sync::Arc;


use fixture::{agent_block, discovered, reports, tool_block, Fixture};

#[test]
fn test_out_of_order_ids_render_sorted() {
    let mut fixture = Fixture::new();
    let text = format!(
        "pre {} mid {} post",
        tool_block(2, "second", r#"{"q": 2}"#),
        tool_block(1, "first", r#"{"q": 1}"#)
    );

    let events = fixture.feed(&text, true);
    let ids: Vec<_> = discovered(&events).iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![2, 1], "calls are discovered in textual order");
    assert!(reports(&events).is_empty());

    assert!(fixture
        .submit(1, CallFamily::Tool, "first", json!("one"))
        .is_empty());
    let events = fixture.submit(2, CallFamily::Tool, "second", json!({"rows": 2}));

    assert_eq!(
        reports(&events),
        vec![Some(
            "<mfcs_result>\n[call_id: 1 name: first] one\n[call_id: 2 name: second] {\"rows\":2}\n</mfcs_result>"
                .to_string()
        )]
    );
}

#[test]
fn test_block_split_across_fragments() {
    let mut fixture = Fixture::new();
    let block = tool_block(1, "search", r#"{"query": "rust"}"#);
    let (head, tail) = block.split_at(block.find("<name>").unwrap());

    assert!(discovered(&fixture.feed(head, false)).is_empty());

    let calls = discovered(&fixture.feed(tail, false));
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].arguments, json!({"query": "rust"}));
    assert_eq!(calls[0].instructions, "run search");
}

#[test]
fn test_streamed_line_by_line() {
    let mut fixture = Fixture::new();
    let fragments = [
        "This is some text, then there is an API call:",
        "<mfcs_call>",
        "<instructions>Get user information</instructions>",
        "<call_id>1</call_id>",
        "<name>getUserInfo</name>",
        "<parameters>",
        "{\"userId\": \"12345\"}",
        "</parameters>",
        "</mfcs_call>",
        "This is more text, then there is another API call:",
        "<mfcs_call>",
        "<instructions>Update user status</instructions>",
        "<call_id>2</call_id>",
        "<name>updateUserStatus</name>",
        "<parameters>",
        "{\"userId\": \"12345\", \"status\": \"active\"}",
        "</parameters>",
        "</mfcs_call>",
        "This is the last text.",
        "",
    ];

    let events = fixture.stream(&fragments);
    let names: Vec<_> = discovered(&events).into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["getUserInfo", "updateUserStatus"]);

    fixture.submit(2, CallFamily::Tool, "updateUserStatus", json!({"success": true}));
    let events = fixture.submit(1, CallFamily::Tool, "getUserInfo", json!({"success": true}));
    let report = reports(&events).pop().flatten().unwrap();
    assert!(report.find("[call_id: 1").unwrap() < report.find("[call_id: 2").unwrap());
}

#[test]
fn test_no_calls_sentinel_once() {
    let mut fixture = Fixture::new();

    let events = fixture.feed("just an answer", true);
    assert_eq!(events, vec![TurnEvent::TurnComplete { report: None }]);

    assert!(fixture.feed("", true).is_empty());
    assert!(fixture
        .submit(1, CallFamily::Tool, "ghost", json!("x"))
        .is_empty());
}

#[test]
fn test_malformed_blocks_are_silent() {
    let mut fixture = Fixture::new();
    let missing_name = tool_block(1, "x", "{}").replace("<name>x</name>", "");
    let bad_json = tool_block(2, "y", "{not json");

    let events = fixture.feed(&format!("{missing_name}{bad_json}"), true);

    assert_eq!(events, vec![TurnEvent::TurnComplete { report: None }]);
}

#[test]
fn test_results_before_finish_wait_for_end_of_stream() {
    let mut fixture = Fixture::new();

    let events = fixture.feed(&tool_block(1, "early", "{}"), false);
    assert_eq!(discovered(&events).len(), 1);

    assert!(fixture
        .submit(1, CallFamily::Tool, "early", json!("done"))
        .is_empty());

    let events = fixture.feed(" trailing text", true);
    assert_eq!(reports(&events).len(), 1);
    assert!(fixture.turn.is_complete());
}

#[test]
fn test_tool_and_agent_ids_overlap() {
    let mut fixture = Fixture::new();
    let text = format!(
        "{}\n{}",
        agent_block(1, "planner", r#"{"goal": "plan"}"#),
        tool_block(1, "search", "{}")
    );

    let events = fixture.feed(&text, true);
    let calls = discovered(&events);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].family, CallFamily::Agent);
    assert_eq!(calls[1].family, CallFamily::Tool);

    assert!(fixture
        .submit(1, CallFamily::Tool, "search", json!("found"))
        .is_empty());
    let events = fixture.submit(1, CallFamily::Agent, "planner", json!("planned"));

    assert_eq!(
        reports(&events),
        vec![Some(
            "<mfcs_result>\n[call_id: 1 name: search] found\n</mfcs_result>\n<mfcs_agent_result>\n[agent_id: 1 name: planner] planned\n</mfcs_agent_result>"
                .to_string()
        )]
    );
}

#[test]
fn test_duplicate_results_in_both_orders() {
    for duplicate_first in [true, false] {
        let mut fixture = Fixture::new();
        fixture.feed(
            &format!("{}{}", tool_block(1, "a", "{}"), tool_block(2, "b", "{}")),
            true,
        );

        let mut events = Vec::new();
        if duplicate_first {
            events.extend(fixture.submit(1, CallFamily::Tool, "a", json!("a1")));
            events.extend(fixture.submit(1, CallFamily::Tool, "a", json!("a2")));
            assert!(events.is_empty(), "a duplicate must not count twice");
            events.extend(fixture.submit(2, CallFamily::Tool, "b", json!("b")));
        } else {
            events.extend(fixture.submit(1, CallFamily::Tool, "a", json!("a1")));
            events.extend(fixture.submit(2, CallFamily::Tool, "b", json!("b")));
            events.extend(fixture.submit(1, CallFamily::Tool, "a", json!("a2")));
        }

        let reports = reports(&events);
        assert_eq!(reports.len(), 1, "exactly one report per turn");
        let report = reports[0].clone().unwrap();
        if duplicate_first {
            assert!(report.contains("[call_id: 1 name: a] a2"));
        } else {
            assert!(report.contains("[call_id: 1 name: a] a1"));
        }
    }
}

#[test]
fn test_custom_tags_from_settings() {
    let mut settings = Settings::default();
    settings.tool.call_tag = "tool_call".to_string();
    settings.tool.result_tag = "tool_result".to_string();
    let mut fixture = Fixture::with_settings(&settings);

    let block = "<tool_call><instructions>i</instructions><call_id>5</call_id><name>n</name><parameters>{}</parameters></tool_call>";
    let events = fixture.feed(&format!("{}{}", block, tool_block(6, "ignored", "{}")), true);
    let calls = discovered(&events);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].id, 5);

    let events = fixture.submit(5, CallFamily::Tool, "n", json!(null));
    assert_eq!(
        reports(&events),
        vec![Some("<tool_result>\n[call_id: 5 name: n] null\n</tool_result>".to_string())]
    );
}

#[tokio::test]
async fn test_dispatcher_answers_every_call() {
    let (mut turn, mut event_rx) = Turn::new(Arc::new(Markers::default()));
    turn.feed(
        &format!(
            "{} {}",
            tool_block(2, "echo", r#"{"text": "b"}"#),
            tool_block(1, "echo", r#"{"text": "a"}"#)
        ),
        true,
    );

    let mut report = None;
    while let Some(event) = event_rx.recv().await {
        match event {
            TurnEvent::CallDiscovered(call) => {
                let payload = call.arguments["text"].clone();
                turn.submit_result(call.id, call.family, call.name, payload);
            }
            TurnEvent::TurnComplete { report: done } => {
                report = done;
                break;
            }
        }
    }

    assert_eq!(
        report.as_deref(),
        Some("<mfcs_result>\n[call_id: 1 name: echo] a\n[call_id: 2 name: echo] b\n</mfcs_result>")
    );
}
