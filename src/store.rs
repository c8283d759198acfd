use crate::registry::{self, Registry};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const STORE_FILE: &str = "academico.json";
pub const STORE_FORMAT: &str = "academico-workspace-v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub class_name: String,
    pub active: bool,
}

/// A class roster: membership and capacity. Separate from the evaluation
/// registry, which keys configurations by class name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    pub id: String,
    pub name: String,
    pub max_capacity: usize,
    pub student_ids: Vec<String>,
}

/// Everything a session owns. One instance per selected workspace, mutated
/// in memory and written back whole after each committed change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub students: Vec<Student>,
    pub rosters: Vec<Roster>,
    pub evaluations: Registry,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDoc {
    format: String,
    saved_at: String,
    data: AppData,
}

/// Loads the workspace store, seeding the front-end's initial fixtures when
/// the file does not exist yet.
pub fn load_data(workspace: &Path) -> anyhow::Result<AppData> {
    fs::create_dir_all(workspace)
        .with_context(|| format!("failed to create workspace {}", workspace.to_string_lossy()))?;
    let path = store_path(workspace);
    if !path.is_file() {
        return Ok(seed_data());
    }
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.to_string_lossy()))?;
    let doc: StoreDoc = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.to_string_lossy()))?;
    if doc.format != STORE_FORMAT {
        anyhow::bail!("unsupported store format: {}", doc.format);
    }
    Ok(doc.data)
}

/// Writes the whole store atomically: serialize to a sibling temp file, then
/// rename over the target.
pub fn save_data(workspace: &Path, data: &AppData) -> anyhow::Result<()> {
    let path = store_path(workspace);
    let doc = StoreDoc {
        format: STORE_FORMAT.to_string(),
        saved_at: chrono::Utc::now().to_rfc3339(),
        data: data.clone(),
    };
    let body = serde_json::to_string_pretty(&doc).context("failed to serialize store")?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body)
        .with_context(|| format!("failed to write {}", tmp.to_string_lossy()))?;
    fs::rename(&tmp, &path)
        .with_context(|| format!("failed to replace {}", path.to_string_lossy()))?;
    Ok(())
}

fn store_path(workspace: &Path) -> PathBuf {
    workspace.join(STORE_FILE)
}

/// First-run contents, mirroring the front-end's mock arrays.
pub fn seed_data() -> AppData {
    let students = vec![
        seed_student("João Silva", "joao@email.com", "Turma A", true),
        seed_student("Maria Santos", "maria@email.com", "Turma B", true),
        seed_student("Pedro Costa", "pedro@email.com", "Turma A", false),
        seed_student("Ana Oliveira", "ana@email.com", "Turma C", true),
    ];
    let rosters = vec![
        seed_roster("Turma A", 30, &[&students[0], &students[2]]),
        seed_roster("Turma B", 25, &[&students[1]]),
        seed_roster("Turma C", 35, &[&students[3]]),
    ];
    AppData {
        students,
        rosters,
        evaluations: registry::seed_registry(),
    }
}

fn seed_student(name: &str, email: &str, class_name: &str, active: bool) -> Student {
    Student {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: email.to_string(),
        class_name: class_name.to_string(),
        active,
    }
}

fn seed_roster(name: &str, max_capacity: usize, members: &[&Student]) -> Roster {
    Roster {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        max_capacity,
        student_ids: members.iter().map(|s| s.id.clone()).collect(),
    }
}
