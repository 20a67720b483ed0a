// Integration tests for the replay speech engine and the backend factory

use anyhow::Result;
use dicta::config::RecognitionConfig;
use dicta::engine::{
    EngineErrorKind, EngineEvent, RecognitionResult, RecognitionScript, ReplayEngine, ScriptedEvent,
    SpeechBackend, SpeechBackendFactory,
};
use tokio::sync::mpsc;

fn short_script() -> RecognitionScript {
    RecognitionScript {
        events: vec![
            ScriptedEvent::Results {
                after_ms: 100,
                results: vec![RecognitionResult::interim("hello wor")],
            },
            ScriptedEvent::Results {
                after_ms: 100,
                results: vec![RecognitionResult::final_piece("Hello world.", 0.9)],
            },
            ScriptedEvent::End { after_ms: 100 },
        ],
    }
}

async fn drain(mut rx: mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn test_replay_plays_script_in_order() -> Result<()> {
    let mut engine = ReplayEngine::new(short_script());
    let rx = engine.start().await?;

    let events = drain(rx).await;
    assert_eq!(events.len(), 4);
    assert!(matches!(events[0], EngineEvent::Started));
    assert!(matches!(&events[1], EngineEvent::Results(r) if !r[0].is_final));
    assert!(matches!(&events[2], EngineEvent::Results(r) if r[0].is_final));
    assert!(matches!(events[3], EngineEvent::Ended));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_replay_script_without_terminal_ends_itself() -> Result<()> {
    let script = RecognitionScript {
        events: vec![ScriptedEvent::Results {
            after_ms: 50,
            results: vec![RecognitionResult::final_piece("Only entry.", 0.9)],
        }],
    };
    let mut engine = ReplayEngine::new(script);
    let events = drain(engine.start().await?).await;

    assert!(matches!(events.last(), Some(EngineEvent::Ended)));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_replay_stop_ends_session_gracefully() -> Result<()> {
    // Long delay so stop lands mid-sleep
    let script = RecognitionScript {
        events: vec![ScriptedEvent::Results {
            after_ms: 60_000,
            results: vec![RecognitionResult::final_piece("Never delivered.", 0.9)],
        }],
    };
    let mut engine = ReplayEngine::new(script);
    let mut rx = engine.start().await?;

    assert!(matches!(rx.recv().await, Some(EngineEvent::Started)));
    engine.stop().await;

    // The pending results are dropped; the session ends cleanly
    assert!(matches!(rx.recv().await, Some(EngineEvent::Ended)));
    assert!(rx.recv().await.is_none());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_replay_abort_suppresses_terminal_event() -> Result<()> {
    let script = RecognitionScript {
        events: vec![ScriptedEvent::End { after_ms: 60_000 }],
    };
    let mut engine = ReplayEngine::new(script);
    let mut rx = engine.start().await?;

    assert!(matches!(rx.recv().await, Some(EngineEvent::Started)));
    engine.abort().await;

    // No Ended, no Failed, the channel just closes
    assert!(rx.recv().await.is_none());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_replay_rejects_second_start_while_live() -> Result<()> {
    let script = RecognitionScript {
        events: vec![ScriptedEvent::End { after_ms: 60_000 }],
    };
    let mut engine = ReplayEngine::new(script);
    let _rx = engine.start().await?;

    let second = engine.start().await;
    assert!(matches!(second, Err(e) if e.kind == EngineErrorKind::AlreadyStarted));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_replay_can_start_again_after_session_ends() -> Result<()> {
    let mut engine = ReplayEngine::new(short_script());

    let first = drain(engine.start().await?).await;
    assert!(matches!(first.last(), Some(EngineEvent::Ended)));

    // Each start replays from the top
    let second = drain(engine.start().await?).await;
    assert_eq!(second.len(), first.len());
    assert!(matches!(second[0], EngineEvent::Started));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_scripted_error_becomes_failed_event() -> Result<()> {
    let script = RecognitionScript {
        events: vec![ScriptedEvent::Error {
            after_ms: 100,
            error: EngineErrorKind::Network,
            message: "connection reset".to_string(),
        }],
    };
    let mut engine = ReplayEngine::new(script);
    let events = drain(engine.start().await?).await;

    match events.last() {
        Some(EngineEvent::Failed(e)) => {
            assert_eq!(e.kind, EngineErrorKind::Network);
            assert_eq!(e.message, "connection reset");
        }
        other => panic!("expected failure, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_script_json_field_names() {
    // Fixtures and configs rely on these exact field names
    let json = r#"{
        "events": [
            {"kind": "results", "after_ms": 100,
             "results": [{"text": "hi", "is_final": false}]},
            {"kind": "error", "after_ms": 50, "error": "network", "message": "down"},
            {"kind": "end", "after_ms": 10}
        ]
    }"#;

    let script: RecognitionScript = serde_json::from_str(json).unwrap();
    assert_eq!(script.events.len(), 3);
    assert!(matches!(
        &script.events[1],
        ScriptedEvent::Error { error: EngineErrorKind::Network, .. }
    ));
}

#[test]
fn test_fixture_script_parses() {
    let script = RecognitionScript::load("tests/fixtures/sample-dictation.json").unwrap();
    assert!(!script.events.is_empty());
    assert!(matches!(script.events.last(), Some(ScriptedEvent::End { .. })));
}

#[test]
fn test_factory_unknown_provider_is_unsupported() {
    let err = SpeechBackendFactory::create(&RecognitionConfig {
        provider: "webspeech".to_string(),
        script: None,
    })
    .err()
    .expect("factory error");
    assert_eq!(err.kind, EngineErrorKind::Unsupported);

    let err = SpeechBackendFactory::create(&RecognitionConfig {
        provider: "none".to_string(),
        script: None,
    })
    .err()
    .expect("factory error");
    assert_eq!(err.kind, EngineErrorKind::Unsupported);
}

#[test]
fn test_factory_replay_requires_loadable_script() {
    let err = SpeechBackendFactory::create(&RecognitionConfig {
        provider: "replay".to_string(),
        script: None,
    })
    .err()
    .expect("factory error");
    assert_eq!(err.kind, EngineErrorKind::Unknown);

    let err = SpeechBackendFactory::create(&RecognitionConfig {
        provider: "replay".to_string(),
        script: Some("does/not/exist.json".to_string()),
    })
    .err()
    .expect("factory error");
    assert_eq!(err.kind, EngineErrorKind::Unknown);
}

#[test]
fn test_factory_builds_replay_engine_from_fixture() {
    let engine = SpeechBackendFactory::create(&RecognitionConfig {
        provider: "replay".to_string(),
        script: Some("tests/fixtures/sample-dictation.json".to_string()),
    })
    .expect("factory success");
    assert_eq!(engine.name(), "replay");
}
