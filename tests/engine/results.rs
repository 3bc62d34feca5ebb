//! Result record serialization tests

use std::time::Duration;

use probe_engine::{CommandRunner, RunnerConfig};
use serde_json::{Value as Json, json};

fn runner() -> CommandRunner {
    CommandRunner::new(RunnerConfig::default().with_settle_delay(Duration::ZERO))
}

async fn run_json(source: &str) -> Json {
    let result = runner().run(source).await;
    serde_json::from_str(&result.to_json().unwrap()).unwrap()
}

#[tokio::test]
async fn success_json_shape() {
    assert_eq!(
        run_json("console.log('hi')").await,
        json!({
            "ok": true,
            "error": null,
            "statementIndex": null,
            "logEvents": [{ "level": "log", "message": "hi" }],
        })
    );
}

#[tokio::test]
async fn failure_json_shape() {
    assert_eq!(
        run_json("refresh();\n  nope").await,
        json!({
            "ok": false,
            "error": {
                "kind": "UnknownIdentifierError",
                "message": "\"nope\" is not valid",
                "line": 2,
                "column": 3,
            },
            "statementIndex": 1,
            "logEvents": [],
        })
    );
}

#[tokio::test]
async fn parse_failure_json_has_null_index() {
    let json = run_json("a b").await;
    assert_eq!(json["error"]["kind"], "ParseError");
    assert_eq!(json["statementIndex"], Json::Null);
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("expected ';' or line break"));
}
