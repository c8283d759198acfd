use crate::weights;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// One named, weighted component of a class's grade computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub id: String,
    pub name: String,
    pub weight: f64,
}

/// The full criteria set for one class. Criteria keep insertion order:
/// display order is insertion order, identity is the opaque id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassConfig {
    pub id: String,
    pub class_name: String,
    pub criteria: Vec<Criterion>,
}

impl ClassConfig {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            class_name: class_name.into(),
            criteria: Vec::new(),
        }
    }
}

/// Recoverable, field-level validation failure. Never fatal; the mutation
/// that produced it leaves the registry untouched.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ValidationError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }

    pub fn on_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    pub fn budget_exceeded(resulting_sum: f64) -> Self {
        Self::new(
            "budget_exceeded",
            format!(
                "weights would sum to {}%; the maximum allowed is {}%",
                trim_pct(resulting_sum),
                trim_pct(weights::FULL_WEIGHT)
            ),
        )
        .on_field("weight")
    }

    pub fn details(&self) -> serde_json::Value {
        match &self.field {
            Some(f) => json!({ "field": f }),
            None => serde_json::Value::Null,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

// Render whole percentages without a trailing ".0" so messages read
// "110%" rather than "110.0%".
fn trim_pct(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Keyed collection of class configurations; class names are unique keys and
/// configs keep creation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    pub configs: Vec<ClassConfig>,
}

impl Registry {
    pub fn get(&self, class_name: &str) -> Option<&ClassConfig> {
        self.configs.iter().find(|c| c.class_name == class_name)
    }

    fn get_mut(&mut self, class_name: &str) -> Result<&mut ClassConfig, ValidationError> {
        self.configs
            .iter_mut()
            .find(|c| c.class_name == class_name)
            .ok_or_else(|| ValidationError::new("not_found", "class configuration not found"))
    }

    /// Inserts an empty configuration under a new unique class name.
    pub fn create_class(&mut self, name: &str) -> Result<ClassConfig, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::new("empty_name", "class name must not be empty")
                .on_field("name"));
        }
        if self.get(name).is_some() {
            return Err(ValidationError::new(
                "duplicate_class",
                format!("a configuration for \"{name}\" already exists"),
            )
            .on_field("name"));
        }
        let config = ClassConfig::new(name);
        self.configs.push(config.clone());
        Ok(config)
    }

    /// Appends a criterion with a fresh id, after the name/weight/budget
    /// checks. The criteria list is replaced as a whole; a rejected add
    /// leaves it untouched.
    pub fn add_criterion(
        &mut self,
        class_name: &str,
        name: &str,
        weight: f64,
    ) -> Result<Criterion, ValidationError> {
        let name = validate_criterion_name(name)?;
        validate_form_weight(weight)?;
        let config = self.get_mut(class_name)?;
        weights::check_commit(&config.criteria, weight, None)?;

        let criterion = Criterion {
            id: Uuid::new_v4().to_string(),
            name,
            weight,
        };
        let mut next = config.criteria.clone();
        next.push(criterion.clone());
        config.criteria = next;
        Ok(criterion)
    }

    /// Replaces a criterion in place, preserving order. The criterion's own
    /// prior weight is excluded from the budget check so an edit can reuse it.
    pub fn edit_criterion(
        &mut self,
        class_name: &str,
        criterion_id: &str,
        name: &str,
        weight: f64,
    ) -> Result<Criterion, ValidationError> {
        let name = validate_criterion_name(name)?;
        validate_form_weight(weight)?;
        let config = self.get_mut(class_name)?;
        if !config.criteria.iter().any(|c| c.id == criterion_id) {
            return Err(ValidationError::new("not_found", "criterion not found"));
        }
        weights::check_commit(&config.criteria, weight, Some(criterion_id))?;

        let updated = Criterion {
            id: criterion_id.to_string(),
            name,
            weight,
        };
        let next: Vec<Criterion> = config
            .criteria
            .iter()
            .map(|c| {
                if c.id == criterion_id {
                    updated.clone()
                } else {
                    c.clone()
                }
            })
            .collect();
        config.criteria = next;
        Ok(updated)
    }

    /// Inline numeric edit: no name checks, negatives rejected, same budget
    /// check as a full edit.
    pub fn set_weight(
        &mut self,
        class_name: &str,
        criterion_id: &str,
        weight: f64,
    ) -> Result<Criterion, ValidationError> {
        if weight < 0.0 {
            return Err(ValidationError::new(
                "negative_weight",
                "weight must not be negative",
            )
            .on_field("weight"));
        }
        let config = self.get_mut(class_name)?;
        let Some(current) = config.criteria.iter().find(|c| c.id == criterion_id) else {
            return Err(ValidationError::new("not_found", "criterion not found"));
        };
        let name = current.name.clone();
        weights::check_commit(&config.criteria, weight, Some(criterion_id))?;

        let updated = Criterion {
            id: criterion_id.to_string(),
            name,
            weight,
        };
        let next: Vec<Criterion> = config
            .criteria
            .iter()
            .map(|c| {
                if c.id == criterion_id {
                    updated.clone()
                } else {
                    c.clone()
                }
            })
            .collect();
        config.criteria = next;
        Ok(updated)
    }

    /// Removal only decreases the sum, so no budget re-check is needed.
    pub fn delete_criterion(
        &mut self,
        class_name: &str,
        criterion_id: &str,
    ) -> Result<(), ValidationError> {
        let config = self.get_mut(class_name)?;
        if !config.criteria.iter().any(|c| c.id == criterion_id) {
            return Err(ValidationError::new("not_found", "criterion not found"));
        }
        let next: Vec<Criterion> = config
            .criteria
            .iter()
            .filter(|c| c.id != criterion_id)
            .cloned()
            .collect();
        config.criteria = next;
        Ok(())
    }
}

fn validate_criterion_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(
            ValidationError::new("empty_name", "criterion name must not be empty")
                .on_field("name"),
        );
    }
    Ok(name.to_string())
}

fn validate_form_weight(weight: f64) -> Result<(), ValidationError> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(ValidationError::new(
            "invalid_weight",
            "weight must be greater than zero",
        )
        .on_field("weight"));
    }
    Ok(())
}

/// The Turma A / Turma B fixtures the front-end ships with on first run.
pub fn seed_registry() -> Registry {
    let mut reg = Registry::default();
    for (class, criteria) in [
        (
            "Turma A",
            vec![
                ("Prova 1", 30.0),
                ("Prova 2", 30.0),
                ("Trabalho", 25.0),
                ("Participação", 15.0),
            ],
        ),
        (
            "Turma B",
            vec![
                ("Avaliação 1", 40.0),
                ("Avaliação 2", 40.0),
                ("Atividades", 20.0),
            ],
        ),
    ] {
        reg.create_class(class).expect("seed class names are unique");
        for (name, weight) in criteria {
            reg.add_criterion(class, name, weight)
                .expect("seed criteria fit the budget");
        }
    }
    reg
}
