use std::path::PathBuf;
use std::time::Duration;

use bureau::agent::{Metadata, RecordStatus, ReturnType, TriggerRunner, TriggerType};
use bureau::app::App;
use bureau::config::Settings;
use bureau::definitions::FocusArea;
use bureau::panels::TranscriptLine;
use bureau::store::{Identity, NewAgent, NewDepartment, OfficeStore};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_text(app: &mut App, text: &str) {
    for ch in text.chars() {
        app.handle_key(key(KeyCode::Char(ch)));
    }
}

/// An office with two departments; the newer one ("Support") holds one agent.
fn app_with_agent(webhook_url: String, trigger_type: TriggerType, active: bool) -> App {
    let identity = Identity {
        user_id: String::from("tester"),
    };
    let mut store = OfficeStore::in_memory();
    let office = store.ensure_office(&identity).unwrap();
    store
        .create_department(NewDepartment {
            name: String::from("Finance"),
            office_id: office.id.clone(),
            position: None,
        })
        .unwrap();
    let support = store
        .create_department(NewDepartment {
            name: String::from("Support"),
            office_id: office.id.clone(),
            position: None,
        })
        .unwrap();
    let agent = store
        .create_agent(NewAgent {
            name: String::from("Helpdesk"),
            description: None,
            trigger_type,
            return_type: ReturnType::Chat,
            webhook_url,
            workflow_url: None,
            department_id: support.id,
        })
        .unwrap();
    if !active {
        store
            .update_agent(&agent.id, bureau::store::AgentPatch::active(false))
            .unwrap();
    }

    App::with_parts(
        PathBuf::from("."),
        Settings::default(),
        identity,
        store,
        TriggerRunner::http(Metadata::default()),
    )
}

async fn settle(app: &mut App) {
    for _ in 0..200 {
        app.on_tick();
        if !app.has_pending() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("dispatch never completed");
}

async fn chat_server(delay: Duration) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"message": "How can I help?"}))
                .set_delay(delay),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn chat_message_round_trip_through_the_keyboard() {
    let server = chat_server(Duration::ZERO).await;
    let mut app = app_with_agent(format!("{}/hook", server.uri()), TriggerType::Chat, true);

    assert_eq!(app.selected_department().unwrap().name, "Support");
    app.handle_key(key(KeyCode::Tab));
    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.focus, FocusArea::Card);

    type_text(&mut app, "hi");
    app.handle_key(key(KeyCode::Enter));
    assert!(app.has_pending());
    assert_eq!(
        app.selected_card().unwrap().transcript().last(),
        Some(&TranscriptLine::AgentPending)
    );

    settle(&mut app).await;

    let card = app.selected_card().unwrap();
    assert_eq!(card.interaction.last_output(), Some("How can I help?"));
    assert_eq!(card.interaction.input_draft.text(), "");
    let record = card.interaction.history().latest().unwrap();
    assert_eq!(record.status, RecordStatus::Success);
    assert_eq!(record.input_echo.to_string(), "hi");
    assert_eq!(
        card.transcript().first(),
        Some(&TranscriptLine::You(String::from("hi")))
    );
    assert_eq!(app.status_message, "Helpdesk: response received");
}

#[tokio::test]
async fn switching_department_drops_the_late_reply() {
    let server = chat_server(Duration::from_millis(200)).await;
    let mut app = app_with_agent(format!("{}/hook", server.uri()), TriggerType::Click, true);

    app.handle_key(key(KeyCode::Tab));
    app.handle_key(key(KeyCode::Enter));
    app.handle_key(key(KeyCode::Enter));
    assert!(app.has_pending());

    // Away to Finance and back before the webhook answers.
    app.handle_key(key(KeyCode::Esc));
    app.handle_key(key(KeyCode::Esc));
    app.handle_key(key(KeyCode::Down));
    assert_eq!(app.selected_department().unwrap().name, "Finance");
    assert!(app.cards.is_empty());
    app.handle_key(key(KeyCode::Up));
    assert!(!app.has_pending());

    tokio::time::sleep(Duration::from_millis(400)).await;
    app.on_tick();

    let card = app.selected_card().unwrap();
    assert!(card.interaction.history().is_empty());
    assert_eq!(card.interaction.last_output(), None);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn inactive_agent_does_not_call_the_webhook() {
    let server = chat_server(Duration::ZERO).await;
    let mut app = app_with_agent(format!("{}/hook", server.uri()), TriggerType::Click, false);

    app.handle_key(key(KeyCode::Tab));
    app.handle_key(key(KeyCode::Enter));
    app.handle_key(key(KeyCode::Enter));

    assert!(!app.has_pending());
    let card = app.selected_card().unwrap();
    assert!(card.interaction.history().is_empty());
    assert!(app.status_message.starts_with("Helpdesk: "));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn new_department_prompt_selects_the_created_department() {
    let mut app = app_with_agent(String::from("http://127.0.0.1:9/hook"), TriggerType::Click, true);

    app.handle_key(key(KeyCode::Char('n')));
    type_text(&mut app, "Research");
    app.handle_key(key(KeyCode::Enter));

    assert!(app.overlay.is_none());
    assert_eq!(app.departments.len(), 3);
    assert_eq!(app.selected_department().unwrap().name, "Research");
    assert!(app.agents.is_empty());
    assert_eq!(app.status_message, "Created department Research");
}

#[tokio::test]
async fn newline_keys_extend_the_chat_draft_without_sending() {
    let server = chat_server(Duration::ZERO).await;
    let mut app = app_with_agent(format!("{}/hook", server.uri()), TriggerType::Chat, true);

    app.handle_key(key(KeyCode::Tab));
    app.handle_key(key(KeyCode::Enter));
    type_text(&mut app, "a");
    app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
    type_text(&mut app, "b");
    app.handle_key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL));
    type_text(&mut app, "c");
    app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
    type_text(&mut app, "d");

    assert!(!app.has_pending());
    let card = app.selected_card().unwrap();
    assert_eq!(card.interaction.input_draft.text(), "a\nb\nc\nd");
    assert!(server.received_requests().await.unwrap().is_empty());

    app.handle_key(key(KeyCode::Enter));
    settle(&mut app).await;
    let record = app.selected_card().unwrap().interaction.history().latest().unwrap();
    assert_eq!(record.input_echo.to_string(), "a\nb\nc\nd");
}
