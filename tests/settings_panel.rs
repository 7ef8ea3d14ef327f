// End-to-end tests for the settings panel, driven through key events

mod common;

use common::harness::PanelTestHarness;
use crossterm::event::{KeyCode, KeyModifiers};
use settings_editor::app::AppEvent;
use settings_editor::config::Settings;
use settings_editor::services::async_bridge::AsyncMessage;
use settings_editor::services::providers::{OptionSource, StaticProvider};
use settings_editor::view::settings::{Mode, OptionState, StatusLevel};
use std::sync::Arc;
use std::time::Duration;

const ASYNC_TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn test_out_of_range_temperature_is_rejected() {
    let mut harness = PanelTestHarness::new(Settings::default(), 80, 30).unwrap();

    harness.edit_field("temperature", "3.5");

    let status = harness.panel().status().unwrap();
    assert_eq!(status.level, StatusLevel::Error);
    assert!(status.text.contains("between"), "status: {}", status.text);
    assert_eq!(harness.panel().settings().temperature, 0.7);
    assert_eq!(harness.store().save_count(), 0);
    assert!(harness.drain_notifications().is_empty());
    assert!(matches!(harness.panel().mode(), Mode::Browsing));
}

#[test]
fn test_valid_temperature_is_saved_and_announced() {
    let mut harness = PanelTestHarness::new(Settings::default(), 80, 30).unwrap();

    harness.edit_field("temperature", "1.25");

    assert_eq!(harness.panel().settings().temperature, 1.25);
    assert_eq!(harness.store().saved().unwrap().temperature, 1.25);
    let notifications = harness.drain_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].key, Some("temperature"));
}

#[test]
fn test_toggle_notifies_in_same_cycle() {
    let mut harness = PanelTestHarness::new(Settings::default(), 80, 30).unwrap();

    harness.select("stream");
    harness.press(KeyCode::Enter);

    let notifications = harness.drain_notifications();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].settings.stream);
    assert!(harness.store().saved().unwrap().stream);
    assert!(!harness.panel().draft().has_dirty());
}

#[test]
fn test_theme_cycles_and_wraps() {
    let mut harness = PanelTestHarness::new(Settings::default(), 80, 30).unwrap();
    harness.select("theme");

    let mut seen = Vec::new();
    for _ in 0..3 {
        harness.press(KeyCode::Char(' '));
        seen.push(harness.panel().settings().theme.clone());
    }
    assert_eq!(seen, vec!["light", "high-contrast", "dark"]);
}

#[test]
fn test_companion_fields_gate_notification() {
    let mut harness = PanelTestHarness::new(Settings::default(), 80, 30).unwrap();

    harness.select("rag_enabled");
    harness.press(KeyCode::Enter);
    assert!(harness.panel().settings().rag_enabled);
    assert!(harness.store().saved().unwrap().rag_enabled);
    assert!(harness.drain_notifications().is_empty());
    assert_eq!(
        harness.panel().status().unwrap().level,
        StatusLevel::Warning
    );

    // No option lists are loaded, so any name is accepted
    harness.edit_field("embedding_model", "nomic-embed-text");
    harness.edit_field("collection", "docs");
    let keys: Vec<_> = harness
        .drain_notifications()
        .into_iter()
        .map(|n| n.key)
        .collect();
    assert_eq!(keys, vec![Some("embedding_model"), Some("collection")]);
}

#[test]
fn test_multiline_edit_and_save() {
    let mut harness = PanelTestHarness::new(Settings::default(), 80, 30).unwrap();

    harness.select("system_prompt");
    harness.press(KeyCode::Enter);
    assert!(matches!(harness.panel().mode(), Mode::ViewingMultiline(_)));

    // Typing is ignored until editing is enabled
    harness.press(KeyCode::Char('x'));
    harness.press(KeyCode::Char('e'));
    assert!(matches!(harness.panel().mode(), Mode::EditingMultiline(_)));

    harness.type_text("Be brief.\nAnswer in English.");
    harness.press(KeyCode::Tab);
    harness.type_text("ok");
    harness.ctrl('s');

    assert!(matches!(harness.panel().mode(), Mode::Browsing));
    let expected = "Be brief.\nAnswer in English.    ok";
    assert_eq!(harness.panel().settings().system_prompt, expected);
    assert_eq!(harness.store().saved().unwrap().system_prompt, expected);
    assert_eq!(
        harness.drain_notifications()[0].key,
        Some("system_prompt")
    );
}

#[test]
fn test_multiline_cancel_discards() {
    let settings = Settings {
        system_prompt: "keep me".to_string(),
        ..Settings::default()
    };
    let mut harness = PanelTestHarness::new(settings, 80, 30).unwrap();

    harness.select("system_prompt");
    harness.press(KeyCode::Enter);
    harness.press(KeyCode::Enter);
    harness.type_text("junk");
    harness.press(KeyCode::Esc);

    assert!(matches!(harness.panel().mode(), Mode::Browsing));
    assert_eq!(harness.panel().settings().system_prompt, "keep me");
    assert_eq!(harness.store().save_count(), 0);
}

#[test]
fn test_external_merge_keeps_dirty_fields() {
    let mut harness = PanelTestHarness::without_auto_save(Settings::default()).unwrap();
    harness.edit_field("temperature", "1.5");
    assert!(harness.panel().draft().is_dirty("temperature"));

    let snapshot = Settings {
        temperature: 0.2,
        model: "qwen2".to_string(),
        ..Settings::default()
    };
    harness
        .app_mut()
        .handle_event(AppEvent::Async(AsyncMessage::ExternalSettings(snapshot)));

    assert_eq!(harness.panel().settings().temperature, 1.5);
    assert_eq!(harness.panel().settings().model, "qwen2");
}

#[test]
fn test_external_merge_skips_field_being_edited() {
    let mut harness = PanelTestHarness::new(Settings::default(), 80, 30).unwrap();
    harness.select("max_tokens");
    harness.press(KeyCode::Enter);

    let snapshot = Settings {
        max_tokens: 99,
        top_k: 9,
        ..Settings::default()
    };
    harness
        .app_mut()
        .handle_event(AppEvent::Async(AsyncMessage::ExternalSettings(snapshot)));
    assert_eq!(harness.panel().settings().max_tokens, 2048);
    assert_eq!(harness.panel().settings().top_k, 9);

    harness.press(KeyCode::End);
    harness.press(KeyCode::Backspace);
    harness.type_text("9\n");
    assert_eq!(harness.panel().settings().max_tokens, 2049);
}

#[test]
fn test_external_value_survives_cancelled_edit() {
    let mut harness = PanelTestHarness::new(Settings::default(), 80, 30).unwrap();
    harness.select("top_k");
    harness.press(KeyCode::Enter);

    let snapshot = Settings {
        top_k: 10,
        ..Settings::default()
    };
    harness
        .app_mut()
        .handle_event(AppEvent::Async(AsyncMessage::ExternalSettings(snapshot)));
    harness.press(KeyCode::Esc);
    assert_eq!(harness.panel().settings().top_k, 10);

    harness.select("stream");
    harness.press(KeyCode::Enter);
    let saved = harness.store().saved().unwrap();
    assert!(saved.stream);
    assert_eq!(saved.top_k, 10);
}

#[test]
fn test_external_merge_refreshes_open_viewer() {
    let mut harness = PanelTestHarness::new(Settings::default(), 80, 30).unwrap();
    harness.select("system_prompt");
    harness.press(KeyCode::Enter);

    let snapshot = Settings {
        system_prompt: "from elsewhere".to_string(),
        ..Settings::default()
    };
    harness
        .app_mut()
        .handle_event(AppEvent::Async(AsyncMessage::ExternalSettings(snapshot)));

    match harness.panel().mode() {
        Mode::ViewingMultiline(editor) => assert_eq!(editor.text(), "from elsewhere"),
        other => panic!("unexpected mode {}", other.name()),
    }
}

#[test]
fn test_save_all_without_auto_save() {
    let mut harness = PanelTestHarness::without_auto_save(Settings::default()).unwrap();
    harness.edit_field("top_k", "8");
    assert_eq!(harness.store().save_count(), 0);
    assert!(harness.drain_notifications().is_empty());

    harness.ctrl('s');
    assert_eq!(harness.store().save_count(), 1);
    assert_eq!(harness.store().saved().unwrap().top_k, 8);
    let notifications = harness.drain_notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].key, None);
}

#[test]
fn test_reset_reloads_from_store() {
    let mut harness = PanelTestHarness::without_auto_save(Settings::default()).unwrap();
    harness.edit_field("top_k", "8");
    harness.ctrl('r');
    assert_eq!(harness.panel().settings().top_k, 4);
    assert!(!harness.panel().draft().has_dirty());
}

#[test]
fn test_quit_requires_confirmation_with_unsaved_changes() {
    let mut harness = PanelTestHarness::without_auto_save(Settings::default()).unwrap();
    harness.edit_field("top_k", "8");

    harness.press(KeyCode::Esc);
    assert!(!harness.app().should_quit());
    assert!(harness.panel().is_quit_armed());

    harness.press(KeyCode::Esc);
    assert!(harness.app().should_quit());
}

#[test]
fn test_server_change_opens_new_generation() {
    let mut harness = PanelTestHarness::new(Settings::default(), 80, 30).unwrap();
    let before = harness.app().generation();
    harness.edit_field("server_url", "http://gpu-box:11434");
    assert_eq!(harness.panel().settings().server_url, "http://gpu-box:11434");
    assert_eq!(harness.app().generation(), before + 1);
}

#[test]
fn test_model_options_fetched_from_provider() {
    let provider = Arc::new(StaticProvider::new(&["llama3", "mistral"], &[]));
    let mut harness = PanelTestHarness::with_provider(Settings::default(), provider).unwrap();

    harness.select("model");
    harness.press(KeyCode::Enter);
    assert!(harness.wait_until(ASYNC_TIMEOUT, |panel| matches!(
        panel.option_state(OptionSource::Models),
        Some(OptionState::Loaded(_))
    )));

    harness.type_text("gpt4\n");
    assert_eq!(harness.panel().status().unwrap().level, StatusLevel::Error);
    assert_eq!(harness.panel().settings().model, "");

    harness.press(KeyCode::Enter);
    harness.type_text("mistral\n");
    assert_eq!(harness.panel().settings().model, "mistral");
}

#[test]
fn test_failed_fetch_is_reported() {
    let provider = Arc::new(StaticProvider::failing("connection refused"));
    let mut harness = PanelTestHarness::with_provider(Settings::default(), provider).unwrap();

    harness.select("model");
    harness.press(KeyCode::Enter);
    assert!(harness.wait_until(ASYNC_TIMEOUT, |panel| matches!(
        panel.option_state(OptionSource::Models),
        Some(OptionState::Failed(_))
    )));
    assert_eq!(harness.panel().status().unwrap().level, StatusLevel::Error);
}

#[test]
fn test_connection_check_reports_connectivity() {
    let provider = Arc::new(StaticProvider::new(&[], &[]));
    let mut harness = PanelTestHarness::with_provider(Settings::default(), provider).unwrap();

    harness.app_mut().start();
    assert!(harness.wait_until(ASYNC_TIMEOUT, |panel| {
        panel.connectivity() == Some(&Ok("static".to_string()))
    }));

    harness.render().unwrap();
    harness.assert_screen_contains("connected (vstatic)");
}

#[test]
fn test_render_lists_every_field() {
    let mut harness = PanelTestHarness::new(Settings::default(), 80, 30).unwrap();
    harness.render().unwrap();
    for label in ["Server URL", "Temperature", "Theme", "System prompt"] {
        harness.assert_screen_contains(label);
    }
    harness.assert_screen_contains("http://localhost:11434");
}

#[test]
fn test_multiline_editor_follows_resize() {
    let text = "word ".repeat(200);
    let settings = Settings {
        system_prompt: text,
        ..Settings::default()
    };
    let mut harness = PanelTestHarness::new(settings, 80, 30).unwrap();
    harness.select("system_prompt");
    harness.press(KeyCode::Enter);
    harness.send_key(KeyCode::End, KeyModifiers::CONTROL);

    harness.app_mut().handle_event(AppEvent::Resize(40, 24));

    let (width, height) = harness.panel().editor_size();
    match harness.panel().mode() {
        Mode::ViewingMultiline(editor) => {
            assert_eq!(editor.width(), width);
            let (line, _) = editor.cursor_display();
            let window = editor.window();
            assert!(line >= window.offset());
            assert!(line < window.offset() + height.max(1));
        }
        other => panic!("unexpected mode {}", other.name()),
    }

    harness.render().unwrap();
}
