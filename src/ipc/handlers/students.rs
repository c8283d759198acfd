use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{persist, require_data, require_session, str_param};
use crate::ipc::types::{AppState, Request};
use crate::store::Student;
use serde_json::json;
use uuid::Uuid;

fn student_json(s: &Student) -> serde_json::Value {
    json!({
        "id": s.id,
        "name": s.name,
        "email": s.email,
        "class": s.class_name,
        "status": if s.active { "active" } else { "inactive" },
    })
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match require_data(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    let search = str_param(req, "search").unwrap_or_default().to_lowercase();
    let class = str_param(req, "class");
    let status = str_param(req, "status");

    let students: Vec<serde_json::Value> = data
        .students
        .iter()
        .filter(|s| {
            let match_search = search.is_empty()
                || s.name.to_lowercase().contains(&search)
                || s.email.to_lowercase().contains(&search);
            let match_class = match class.as_deref() {
                None | Some("") => true,
                Some(c) => s.class_name == c,
            };
            let match_status = match status.as_deref() {
                None | Some("") => true,
                Some("active") => s.active,
                Some("inactive") => !s.active,
                Some(_) => false,
            };
            match_search && match_class && match_status
        })
        .map(student_json)
        .collect();

    ok(&req.id, json!({ "students": students }))
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match require_data(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    // All three fields are required on the form.
    let name = str_param(req, "name").map(|v| v.trim().to_string()).unwrap_or_default();
    let email = str_param(req, "email").map(|v| v.trim().to_string()).unwrap_or_default();
    let class_name = str_param(req, "class").map(|v| v.trim().to_string()).unwrap_or_default();
    if name.is_empty() || email.is_empty() || class_name.is_empty() {
        return err(
            &req.id,
            "bad_params",
            "name, email and class are all required",
            None,
        );
    }

    let student = Student {
        id: Uuid::new_v4().to_string(),
        name,
        email,
        class_name,
        active: req
            .params
            .get("active")
            .and_then(|v| v.as_bool())
            .unwrap_or(true),
    };
    data.students.push(student.clone());

    if let Some(resp) = persist(state, req) {
        return resp;
    }
    ok(&req.id, json!({ "student": student_json(&student) }))
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match require_data(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    let Some(student_id) = str_param(req, "studentId") else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };
    let name = str_param(req, "name").map(|v| v.trim().to_string()).unwrap_or_default();
    let email = str_param(req, "email").map(|v| v.trim().to_string()).unwrap_or_default();
    let class_name = str_param(req, "class").map(|v| v.trim().to_string()).unwrap_or_default();
    if name.is_empty() || email.is_empty() || class_name.is_empty() {
        return err(
            &req.id,
            "bad_params",
            "name, email and class are all required",
            None,
        );
    }
    let active = req.params.get("active").and_then(|v| v.as_bool());

    let Some(student) = data.students.iter_mut().find(|s| s.id == student_id) else {
        return err(&req.id, "not_found", "student not found", None);
    };
    student.name = name;
    student.email = email;
    student.class_name = class_name;
    if let Some(active) = active {
        student.active = active;
    }
    let payload = student_json(student);

    if let Some(resp) = persist(state, req) {
        return resp;
    }
    ok(&req.id, json!({ "student": payload }))
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match require_data(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    let Some(student_id) = str_param(req, "studentId") else {
        return err(&req.id, "bad_params", "missing studentId", None);
    };
    if !data.students.iter().any(|s| s.id == student_id) {
        return err(&req.id, "not_found", "student not found", None);
    }

    data.students.retain(|s| s.id != student_id);
    // Drop the student from any roster membership as well.
    for roster in &mut data.rosters {
        roster.student_ids.retain(|id| id != &student_id);
    }

    if let Some(resp) = persist(state, req) {
        return resp;
    }
    ok(&req.id, json!({ "deleted": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let handler = match req.method.as_str() {
        "students.list" => handle_list as fn(&mut AppState, &Request) -> serde_json::Value,
        "students.create" => handle_create,
        "students.update" => handle_update,
        "students.delete" => handle_delete,
        _ => return None,
    };
    if let Some(resp) = require_session(state, req) {
        return Some(resp);
    }
    Some(handler(state, req))
}
