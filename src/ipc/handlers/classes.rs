use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{persist, require_data, require_session, str_param};
use crate::ipc::types::{AppState, Request};
use crate::store::Roster;
use serde_json::json;
use uuid::Uuid;

fn roster_json(r: &Roster) -> serde_json::Value {
    json!({
        "id": r.id,
        "name": r.name,
        "maxCapacity": r.max_capacity,
        "studentIds": r.student_ids,
        "studentCount": r.student_ids.len(),
    })
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match require_data(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let classes: Vec<serde_json::Value> = data.rosters.iter().map(roster_json).collect();
    ok(&req.id, json!({ "classes": classes }))
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match require_data(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    let name = str_param(req, "name").map(|v| v.trim().to_string()).unwrap_or_default();
    if name.is_empty() {
        return err(&req.id, "bad_params", "name must not be empty", None);
    }
    let max_capacity = req
        .params
        .get("maxCapacity")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as usize;
    if max_capacity < 1 {
        return err(&req.id, "bad_params", "maxCapacity must be at least 1", None);
    }
    if data.rosters.iter().any(|r| r.name == name) {
        return err(
            &req.id,
            "duplicate_class",
            format!("a class named \"{name}\" already exists"),
            None,
        );
    }

    let roster = Roster {
        id: Uuid::new_v4().to_string(),
        name,
        max_capacity,
        student_ids: Vec::new(),
    };
    data.rosters.push(roster.clone());

    if let Some(resp) = persist(state, req) {
        return resp;
    }
    ok(&req.id, json!({ "class": roster_json(&roster) }))
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match require_data(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    let Some(class_id) = str_param(req, "classId") else {
        return err(&req.id, "bad_params", "missing classId", None);
    };
    let name = str_param(req, "name").map(|v| v.trim().to_string()).unwrap_or_default();
    if name.is_empty() {
        return err(&req.id, "bad_params", "name must not be empty", None);
    }
    let max_capacity = req
        .params
        .get("maxCapacity")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as usize;
    if max_capacity < 1 {
        return err(&req.id, "bad_params", "maxCapacity must be at least 1", None);
    }
    if data
        .rosters
        .iter()
        .any(|r| r.name == name && r.id != class_id)
    {
        return err(
            &req.id,
            "duplicate_class",
            format!("a class named \"{name}\" already exists"),
            None,
        );
    }

    let Some(roster) = data.rosters.iter_mut().find(|r| r.id == class_id) else {
        return err(&req.id, "not_found", "class not found", None);
    };
    if roster.student_ids.len() > max_capacity {
        return err(
            &req.id,
            "capacity_exceeded",
            format!(
                "{} students are enrolled; capacity cannot drop below that",
                roster.student_ids.len()
            ),
            None,
        );
    }
    roster.name = name;
    roster.max_capacity = max_capacity;
    let payload = roster_json(roster);

    if let Some(resp) = persist(state, req) {
        return resp;
    }
    ok(&req.id, json!({ "class": payload }))
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match require_data(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    let Some(class_id) = str_param(req, "classId") else {
        return err(&req.id, "bad_params", "missing classId", None);
    };
    if !data.rosters.iter().any(|r| r.id == class_id) {
        return err(&req.id, "not_found", "class not found", None);
    }
    data.rosters.retain(|r| r.id != class_id);

    if let Some(resp) = persist(state, req) {
        return resp;
    }
    ok(&req.id, json!({ "deleted": true }))
}

fn handle_set_members(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match require_data(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    let Some(class_id) = str_param(req, "classId") else {
        return err(&req.id, "bad_params", "missing classId", None);
    };
    let Some(ids) = req.params.get("studentIds").and_then(|v| v.as_array()) else {
        return err(&req.id, "bad_params", "missing studentIds", None);
    };
    let mut student_ids: Vec<String> = Vec::with_capacity(ids.len());
    for v in ids {
        match v.as_str() {
            Some(s) => student_ids.push(s.to_string()),
            None => return err(&req.id, "bad_params", "studentIds must be strings", None),
        }
    }
    let mut seen = std::collections::HashSet::new();
    student_ids.retain(|id| seen.insert(id.clone()));

    for id in &student_ids {
        if !data.students.iter().any(|s| &s.id == id) {
            return err(
                &req.id,
                "not_found",
                format!("unknown student id: {id}"),
                None,
            );
        }
    }

    let Some(roster) = data.rosters.iter_mut().find(|r| r.id == class_id) else {
        return err(&req.id, "not_found", "class not found", None);
    };
    if student_ids.len() > roster.max_capacity {
        return err(
            &req.id,
            "capacity_exceeded",
            format!(
                "{} students exceed the class capacity of {}",
                student_ids.len(),
                roster.max_capacity
            ),
            None,
        );
    }
    roster.student_ids = student_ids;
    let payload = roster_json(roster);

    if let Some(resp) = persist(state, req) {
        return resp;
    }
    ok(&req.id, json!({ "class": payload }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let handler = match req.method.as_str() {
        "classes.list" => handle_list as fn(&mut AppState, &Request) -> serde_json::Value,
        "classes.create" => handle_create,
        "classes.update" => handle_update,
        "classes.delete" => handle_delete,
        "classes.setMembers" => handle_set_members,
        _ => return None,
    };
    if let Some(resp) = require_session(state, req) {
        return Some(resp);
    }
    Some(handler(state, req))
}
