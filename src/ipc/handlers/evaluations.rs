use crate::ipc::error::{err, ok, validation};
use crate::ipc::helpers::{f64_param, persist, require_data, require_session, str_param};
use crate::ipc::types::{AppState, Request};
use crate::registry::ClassConfig;
use crate::weights;
use serde_json::json;

// Every read and every committed mutation answers with the full config plus
// the freshly derived summary, so the UI never re-derives or caches state.
fn config_json(config: &ClassConfig) -> serde_json::Value {
    json!({
        "config": config,
        "summary": weights::summarize(&config.criteria),
    })
}

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match require_data(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let classes: Vec<serde_json::Value> = data
        .evaluations
        .configs
        .iter()
        .map(|c| {
            json!({
                "className": c.class_name,
                "criteriaCount": c.criteria.len(),
                "summary": weights::summarize(&c.criteria),
            })
        })
        .collect();
    ok(&req.id, json!({ "classes": classes }))
}

fn handle_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match require_data(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let Some(class) = str_param(req, "class") else {
        return err(&req.id, "bad_params", "missing class", None);
    };
    match data.evaluations.get(&class) {
        Some(config) => ok(&req.id, config_json(config)),
        None => err(&req.id, "not_found", "class configuration not found", None),
    }
}

fn handle_create_class(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match require_data(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let Some(name) = str_param(req, "name") else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    let payload = match data.evaluations.create_class(&name) {
        Ok(config) => config_json(&config),
        Err(e) => return validation(&req.id, &e),
    };
    if let Some(resp) = persist(state, req) {
        return resp;
    }
    ok(&req.id, payload)
}

fn handle_budget(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match require_data(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let Some(class) = str_param(req, "class") else {
        return err(&req.id, "bad_params", "missing class", None);
    };
    let excluding = str_param(req, "excludingCriterionId");
    let Some(config) = data.evaluations.get(&class) else {
        return err(&req.id, "not_found", "class configuration not found", None);
    };
    let remaining = weights::remaining_budget(&config.criteria, excluding.as_deref());
    ok(&req.id, json!({ "remaining": remaining }))
}

fn handle_criteria_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match require_data(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let Some(class) = str_param(req, "class") else {
        return err(&req.id, "bad_params", "missing class", None);
    };
    let Some(name) = str_param(req, "name") else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    let Some(weight) = f64_param(req, "weight") else {
        return err(&req.id, "bad_params", "missing weight", None);
    };

    let payload = match data.evaluations.add_criterion(&class, &name, weight) {
        Ok(criterion) => {
            let config = data.evaluations.get(&class).expect("class exists");
            let mut body = config_json(config);
            body["criterion"] = json!(criterion);
            body
        }
        Err(e) => return validation(&req.id, &e),
    };
    if let Some(resp) = persist(state, req) {
        return resp;
    }
    ok(&req.id, payload)
}

fn handle_criteria_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match require_data(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let Some(class) = str_param(req, "class") else {
        return err(&req.id, "bad_params", "missing class", None);
    };
    let Some(criterion_id) = str_param(req, "criterionId") else {
        return err(&req.id, "bad_params", "missing criterionId", None);
    };
    let Some(name) = str_param(req, "name") else {
        return err(&req.id, "bad_params", "missing name", None);
    };
    let Some(weight) = f64_param(req, "weight") else {
        return err(&req.id, "bad_params", "missing weight", None);
    };

    let payload = match data
        .evaluations
        .edit_criterion(&class, &criterion_id, &name, weight)
    {
        Ok(criterion) => {
            let config = data.evaluations.get(&class).expect("class exists");
            let mut body = config_json(config);
            body["criterion"] = json!(criterion);
            body
        }
        Err(e) => return validation(&req.id, &e),
    };
    if let Some(resp) = persist(state, req) {
        return resp;
    }
    ok(&req.id, payload)
}

fn handle_criteria_set_weight(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match require_data(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let Some(class) = str_param(req, "class") else {
        return err(&req.id, "bad_params", "missing class", None);
    };
    let Some(criterion_id) = str_param(req, "criterionId") else {
        return err(&req.id, "bad_params", "missing criterionId", None);
    };
    let Some(weight) = f64_param(req, "weight") else {
        return err(&req.id, "bad_params", "missing weight", None);
    };

    let payload = match data.evaluations.set_weight(&class, &criterion_id, weight) {
        Ok(criterion) => {
            let config = data.evaluations.get(&class).expect("class exists");
            let mut body = config_json(config);
            body["criterion"] = json!(criterion);
            body
        }
        Err(e) => return validation(&req.id, &e),
    };
    if let Some(resp) = persist(state, req) {
        return resp;
    }
    ok(&req.id, payload)
}

fn handle_criteria_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let data = match require_data(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let Some(class) = str_param(req, "class") else {
        return err(&req.id, "bad_params", "missing class", None);
    };
    let Some(criterion_id) = str_param(req, "criterionId") else {
        return err(&req.id, "bad_params", "missing criterionId", None);
    };

    let payload = match data.evaluations.delete_criterion(&class, &criterion_id) {
        Ok(()) => {
            let config = data.evaluations.get(&class).expect("class exists");
            config_json(config)
        }
        Err(e) => return validation(&req.id, &e),
    };
    if let Some(resp) = persist(state, req) {
        return resp;
    }
    ok(&req.id, payload)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let handler = match req.method.as_str() {
        "evaluations.list" => handle_list as fn(&mut AppState, &Request) -> serde_json::Value,
        "evaluations.open" => handle_open,
        "evaluations.createClass" => handle_create_class,
        "evaluations.budget" => handle_budget,
        "evaluations.criteria.add" => handle_criteria_add,
        "evaluations.criteria.update" => handle_criteria_update,
        "evaluations.criteria.setWeight" => handle_criteria_set_weight,
        "evaluations.criteria.delete" => handle_criteria_delete,
        _ => return None,
    };
    if let Some(resp) = require_session(state, req) {
        return Some(resp);
    }
    Some(handler(state, req))
}
