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

fn request(
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
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn request_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        !value.get("ok").and_then(|v| v.as_bool()).unwrap_or(true),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value.get("error").cloned().expect("error object")
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

fn names(result: &serde_json::Value, key: &str) -> Vec<String> {
    result
        .get(key)
        .and_then(|v| v.as_array())
        .expect("array")
        .iter()
        .map(|s| {
            s.get("name")
                .and_then(|v| v.as_str())
                .expect("name")
                .to_string()
        })
        .collect()
}

#[test]
fn student_filters_compose() {
    let ws = temp_workspace("academicod-students");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let token = login_and_select(&mut stdin, &mut reader, &ws);

    // Substring search matches name or email, case-insensitively.
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "search",
        "students.list",
        json!({ "token": token, "search": "SILVA" }),
    );
    assert_eq!(names(&result, "students"), vec!["João Silva"]);

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "email",
        "students.list",
        json!({ "token": token, "search": "ana@" }),
    );
    assert_eq!(names(&result, "students"), vec!["Ana Oliveira"]);

    // Class and status filters stack on top of search.
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "class-a",
        "students.list",
        json!({ "token": token, "class": "Turma A" }),
    );
    assert_eq!(
        names(&result, "students"),
        vec!["João Silva", "Pedro Costa"]
    );

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "class-a-active",
        "students.list",
        json!({ "token": token, "class": "Turma A", "status": "active" }),
    );
    assert_eq!(names(&result, "students"), vec!["João Silva"]);

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "inactive",
        "students.list",
        json!({ "token": token, "status": "inactive" }),
    );
    assert_eq!(names(&result, "students"), vec!["Pedro Costa"]);

    let _ = child.kill();
}

#[test]
fn student_create_update_delete_roundtrip() {
    let ws = temp_workspace("academicod-students");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let token = login_and_select(&mut stdin, &mut reader, &ws);

    let error = request_err(
        &mut stdin,
        &mut reader,
        "missing-fields",
        "students.create",
        json!({ "token": token, "name": "Carlos Souza" }),
    );
    assert_eq!(error.get("code").and_then(|v| v.as_str()), Some("bad_params"));

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "create",
        "students.create",
        json!({
            "token": token,
            "name": "Carlos Souza",
            "email": "carlos@email.com",
            "class": "Turma B"
        }),
    );
    let id = created
        .pointer("/student/id")
        .and_then(|v| v.as_str())
        .expect("id")
        .to_string();
    assert_eq!(
        created.pointer("/student/status").and_then(|v| v.as_str()),
        Some("active")
    );

    let updated = request_ok(
        &mut stdin,
        &mut reader,
        "update",
        "students.update",
        json!({
            "token": token,
            "studentId": id,
            "name": "Carlos Souza",
            "email": "carlos.souza@email.com",
            "class": "Turma C",
            "active": false
        }),
    );
    assert_eq!(
        updated.pointer("/student/status").and_then(|v| v.as_str()),
        Some("inactive")
    );

    request_ok(
        &mut stdin,
        &mut reader,
        "delete",
        "students.delete",
        json!({ "token": token, "studentId": id }),
    );
    let error = request_err(
        &mut stdin,
        &mut reader,
        "delete-again",
        "students.delete",
        json!({ "token": token, "studentId": id }),
    );
    assert_eq!(error.get("code").and_then(|v| v.as_str()), Some("not_found"));

    let _ = child.kill();
}

#[test]
fn roster_capacity_is_enforced() {
    let ws = temp_workspace("academicod-classes");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let token = login_and_select(&mut stdin, &mut reader, &ws);

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "create",
        "classes.create",
        json!({ "token": token, "name": "Turma D", "maxCapacity": 2 }),
    );
    let class_id = created
        .pointer("/class/id")
        .and_then(|v| v.as_str())
        .expect("class id")
        .to_string();

    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "students",
        "students.list",
        json!({ "token": token }),
    );
    let student_ids: Vec<&str> = listed
        .get("students")
        .and_then(|v| v.as_array())
        .expect("students")
        .iter()
        .take(3)
        .map(|s| s.get("id").and_then(|v| v.as_str()).expect("id"))
        .collect();
    assert_eq!(student_ids.len(), 3);

    let error = request_err(
        &mut stdin,
        &mut reader,
        "over",
        "classes.setMembers",
        json!({ "token": token, "classId": class_id, "studentIds": student_ids }),
    );
    assert_eq!(
        error.get("code").and_then(|v| v.as_str()),
        Some("capacity_exceeded")
    );

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "fits",
        "classes.setMembers",
        json!({ "token": token, "classId": class_id, "studentIds": [student_ids[0], student_ids[1]] }),
    );
    assert_eq!(
        result.pointer("/class/studentCount").and_then(|v| v.as_u64()),
        Some(2)
    );

    // Capacity cannot shrink below current membership.
    let error = request_err(
        &mut stdin,
        &mut reader,
        "shrink",
        "classes.update",
        json!({ "token": token, "classId": class_id, "name": "Turma D", "maxCapacity": 1 }),
    );
    assert_eq!(
        error.get("code").and_then(|v| v.as_str()),
        Some("capacity_exceeded")
    );

    // Unknown student ids never enter a roster.
    let error = request_err(
        &mut stdin,
        &mut reader,
        "ghost-member",
        "classes.setMembers",
        json!({ "token": token, "classId": class_id, "studentIds": ["no-such-student"] }),
    );
    assert_eq!(error.get("code").and_then(|v| v.as_str()), Some("not_found"));

    let _ = child.kill();
}

#[test]
fn duplicate_and_unknown_classes_are_rejected() {
    let ws = temp_workspace("academicod-classes");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let token = login_and_select(&mut stdin, &mut reader, &ws);

    let error = request_err(
        &mut stdin,
        &mut reader,
        "dup",
        "classes.create",
        json!({ "token": token, "name": "Turma A", "maxCapacity": 10 }),
    );
    assert_eq!(
        error.get("code").and_then(|v| v.as_str()),
        Some("duplicate_class")
    );

    let error = request_err(
        &mut stdin,
        &mut reader,
        "ghost",
        "classes.delete",
        json!({ "token": token, "classId": "no-such-id" }),
    );
    assert_eq!(error.get("code").and_then(|v| v.as_str()), Some("not_found"));

    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "list",
        "classes.list",
        json!({ "token": token }),
    );
    assert_eq!(
        names(&listed, "classes"),
        vec!["Turma A", "Turma B", "Turma C"]
    );

    let _ = child.kill();
}
