//! Serialization boundary with the persistence collaborator.
//!
//! The backend stores one contract row with a `clauses` JSONB column (list of
//! `{titulo, texto, source, variables}` records, or a single such object for
//! legacy single-clause rows; records without `source` read as manual) and a
//! `variables_adicionales` bag holding the raw form
//! fields plus payment state. Hydration is a full replace: a loaded payload
//! produces a whole new draft, never a merge into an existing one.

use log::warn;
use serde_json::{json, Map, Value};

use crate::draft::ContractDraft;
use crate::resolver::format_amount;
use crate::types::{ClauseSource, EngineError, Installment, PaymentMode};

fn structural(reason: impl Into<String>) -> EngineError {
    EngineError::Structural {
        reason: reason.into(),
    }
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Backend payload for contract create/update.
pub fn to_payload(draft: &ContractDraft) -> Value {
    let clauses: Vec<Value> = draft
        .clauses
        .iter()
        .map(|clause| {
            json!({
                "titulo": clause.title,
                "texto": clause.content,
                "source": clause.source.code(),
                "variables": clause.variables.iter().collect::<Vec<_>>(),
            })
        })
        .collect();

    let mut extra = Map::new();
    for (name, value) in &draft.form_fields {
        extra.insert(name.clone(), Value::String(value.clone()));
    }
    extra.insert(
        "modalidadPago".to_string(),
        Value::String(draft.payment_mode.code().to_string()),
    );
    let installments: Vec<Value> = if draft.payment_mode == PaymentMode::Installments {
        draft
            .installments
            .iter()
            .map(|i| json!({ "fecha": i.due_date, "monto": i.amount }))
            .collect()
    } else {
        Vec::new()
    };
    extra.insert("installments".to_string(), Value::Array(installments));

    json!({
        "titulo": draft.title,
        "tipo": draft.practice_area,
        "estado": "BORRADOR",
        "cliente_id": draft.client_ref,
        "abogado_id": draft.lawyer_ref,
        "total": draft.total_amount.trim().parse::<f64>().unwrap_or(0.0),
        "clauses": clauses,
        "variables_adicionales": Value::Object(extra),
    })
}

fn clause_source(obj: &Map<String, Value>) -> ClauseSource {
    match str_field(obj, "source").as_deref() {
        Some("template") => ClauseSource::Template,
        Some("library") => ClauseSource::Library,
        _ => ClauseSource::Manual,
    }
}

fn restore_clause(draft: &mut ContractDraft, index: usize, value: &Value) -> Result<(), EngineError> {
    let obj = value
        .as_object()
        .ok_or_else(|| structural(format!("clause {} is not an object", index)))?;
    let title = str_field(obj, "titulo").unwrap_or_else(|| format!("Cláusula {}", index + 1));
    let content = str_field(obj, "texto").unwrap_or_default();
    let stored: Vec<String> = obj
        .get("variables")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    draft.restore_clause(title, content, clause_source(obj), stored);
    Ok(())
}

/// Rebuilds a whole working draft from a persisted contract record.
pub fn from_payload(value: &Value) -> Result<ContractDraft, EngineError> {
    let obj = value
        .as_object()
        .ok_or_else(|| structural("contract payload is not an object"))?;

    let mut draft = ContractDraft::new();
    draft.id = str_field(obj, "id");
    draft.title = str_field(obj, "titulo").unwrap_or_default();
    draft.practice_area = str_field(obj, "tipo").unwrap_or_default();
    draft.client_ref = str_field(obj, "cliente_id");
    draft.lawyer_ref = str_field(obj, "abogado_id");
    match obj.get("total") {
        Some(Value::Number(total)) => draft.total_amount = format_amount(&total.to_string()),
        Some(Value::String(total)) => draft.total_amount = total.clone(),
        _ => {}
    }

    // JSONB column: list for contracts/templates, single object for legacy
    // one-clause library rows
    match obj.get("clauses") {
        None | Some(Value::Null) => {}
        Some(Value::Array(clauses)) => {
            for (index, clause) in clauses.iter().enumerate() {
                restore_clause(&mut draft, index, clause)?;
            }
        }
        Some(single @ Value::Object(_)) => restore_clause(&mut draft, 0, single)?,
        Some(other) => {
            return Err(structural(format!(
                "clauses must be a list or object, got {}",
                other
            )))
        }
    }

    if let Some(extra) = obj.get("variables_adicionales").and_then(Value::as_object) {
        for (name, value) in extra {
            match (name.as_str(), value) {
                ("installments", Value::Array(rows)) => {
                    for (index, row) in rows.iter().enumerate() {
                        let row = row.as_object();
                        draft.installments.push(Installment {
                            sequence: index as u32 + 1,
                            due_date: row
                                .and_then(|r| str_field(r, "fecha"))
                                .unwrap_or_default(),
                            amount: row
                                .and_then(|r| str_field(r, "monto"))
                                .unwrap_or_else(|| "0.00".to_string()),
                        });
                    }
                }
                ("installments", _) => {}
                ("modalidadPago", Value::String(code)) => {
                    match PaymentMode::from_code(code) {
                        Some(mode) => draft.set_payment_mode(mode),
                        None => warn!("unknown modalidadPago code '{}', keeping default", code),
                    }
                }
                (_, Value::String(text)) => draft.set_form_field(name.clone(), text.clone()),
                (_, other) => {
                    warn!("skipping non-string form field '{}': {}", name, other);
                }
            }
        }
    }

    Ok(draft)
}
