use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_workspace(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_academicod");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn academicod");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn login_and_select(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    workspace: &PathBuf,
) -> String {
    let result = request_ok(
        stdin,
        reader,
        "login",
        "auth.login",
        json!({ "email": "professor@g.com", "password": "1234" }),
    );
    let token = result
        .get("token")
        .and_then(|v| v.as_str())
        .expect("token")
        .to_string();
    request_ok(
        stdin,
        reader,
        "ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    token
}

#[test]
fn committed_mutations_survive_a_process_restart() {
    let ws = temp_workspace("academicod-roundtrip");

    // First session: create a class and fill half its budget.
    {
        let (mut child, mut stdin, mut reader) = spawn_sidecar();
        let token = login_and_select(&mut stdin, &mut reader, &ws);

        request_ok(
            &mut stdin,
            &mut reader,
            "create",
            "evaluations.createClass",
            json!({ "token": token, "name": "Turma Nova" }),
        );
        request_ok(
            &mut stdin,
            &mut reader,
            "add",
            "evaluations.criteria.add",
            json!({ "token": token, "class": "Turma Nova", "name": "Prova Final", "weight": 50.0 }),
        );
        request_ok(
            &mut stdin,
            &mut reader,
            "student",
            "students.create",
            json!({
                "token": token,
                "name": "Carlos Souza",
                "email": "carlos@email.com",
                "class": "Turma Nova"
            }),
        );

        let _ = child.kill();
        let _ = child.wait();
    }

    assert!(ws.join("academico.json").is_file());

    // Second session over the same workspace sees the committed state.
    {
        let (mut child, mut stdin, mut reader) = spawn_sidecar();
        let token = login_and_select(&mut stdin, &mut reader, &ws);

        let opened = request_ok(
            &mut stdin,
            &mut reader,
            "open",
            "evaluations.open",
            json!({ "token": token, "class": "Turma Nova" }),
        );
        assert_eq!(
            opened.pointer("/summary/sum").and_then(|v| v.as_f64()),
            Some(50.0)
        );
        assert_eq!(
            opened
                .pointer("/summary/classification")
                .and_then(|v| v.as_str()),
            Some("insufficient")
        );
        assert_eq!(
            opened
                .pointer("/config/criteria/0/name")
                .and_then(|v| v.as_str()),
            Some("Prova Final")
        );

        let listed = request_ok(
            &mut stdin,
            &mut reader,
            "students",
            "students.list",
            json!({ "token": token, "search": "carlos" }),
        );
        assert_eq!(
            listed
                .pointer("/students/0/email")
                .and_then(|v| v.as_str()),
            Some("carlos@email.com")
        );

        let _ = child.kill();
    }
}

#[test]
fn reads_never_touch_the_store() {
    let ws = temp_workspace("academicod-readonly");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let token = login_and_select(&mut stdin, &mut reader, &ws);

    request_ok(
        &mut stdin,
        &mut reader,
        "list",
        "evaluations.list",
        json!({ "token": token }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "students",
        "students.list",
        json!({ "token": token }),
    );

    // Pure reads leave a fresh workspace file-less; only commits persist.
    assert!(!ws.join("academico.json").is_file());

    let _ = child.kill();
}
