//! Canonical variable resolution and missing-variable validation.
//!
//! Resolution merges three value sources per canonical name, highest first:
//! the exact form-field entry, a fixed alias key (the portal's camelCase
//! field names), then a default computed from other draft state. A name that
//! survives none of the three is unresolved.
//!
//! "Renderable" and "complete" are distinct on purpose: a value still at its
//! default sentinel (`""` or `"0.00"`) substitutes as-is but is reported as
//! not yet provided by the validator.

use log::debug;
use std::collections::HashMap;

use crate::catalog;
use crate::draft::ContractDraft;

/// Canonical name that always resolves from the payment-mode toggle and is
/// never reported missing.
pub const MODALIDAD_PAGO: &str = "Modalidad Pago";

/// Alias keys per canonical name, checked only when the canonical form-field
/// entry is absent or empty. These are the raw field names the portal stores
/// in `variables_adicionales`.
static ALIASES: &[(&str, &[&str])] = &[
    ("Nombre Cliente", &["cliente", "nombreCliente"]),
    ("DNI Cliente", &["dniCliente"]),
    ("Representante Legal", &["representanteLegal"]),
    ("Área de Práctica", &["areaPractica"]),
    ("Valor Honorarios", &["valorHonorarios"]),
    ("Valor Penalidad", &["valorPenalidad"]),
    ("Modalidad Pago", &["modalidadPago"]),
    ("Fecha Inicio", &["fechaInicio"]),
    ("Fecha Fin", &["fechaFin"]),
    ("Ciudad Firma", &["ciudadFirma"]),
    ("Ciudad Notificación", &["ciudadNotificacion"]),
];

fn alias_keys(name: &str) -> &'static [&'static str] {
    ALIASES
        .iter()
        .find(|(canonical, _)| *canonical == name)
        .map(|(_, keys)| *keys)
        .unwrap_or(&[])
}

/// Whether a raw value is still the untouched form default.
pub fn is_default_value(value: &str) -> bool {
    value.is_empty() || value == "0.00"
}

/// Formats a decimal string to two decimals (`"1000"` → `"1000.00"`). Values
/// that do not parse are kept verbatim rather than dropped.
pub fn format_amount(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(value) => format!("{:.2}", value),
        Err(_) => raw.to_string(),
    }
}

/// Display fields of a client or lawyer record.
#[derive(Debug, Clone, PartialEq)]
pub struct PartyInfo {
    pub name: String,
    pub id_number: String,
}

/// Entity-reference collaborator resolving client/lawyer references to
/// display fields. A failed lookup surfaces as an unresolved placeholder,
/// never as an engine error.
pub trait PartyDirectory {
    fn client(&self, reference: &str) -> Option<PartyInfo>;
    fn lawyer(&self, reference: &str) -> Option<PartyInfo>;
}

/// Directory that knows nobody. Useful before the persistence collaborator
/// has supplied any records.
#[derive(Debug, Default)]
pub struct NoDirectory;

impl PartyDirectory for NoDirectory {
    fn client(&self, _reference: &str) -> Option<PartyInfo> {
        None
    }
    fn lawyer(&self, _reference: &str) -> Option<PartyInfo> {
        None
    }
}

/// In-memory directory keyed by reference id. Covers tests and sessions that
/// preloaded their records.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    clients: HashMap<String, PartyInfo>,
    lawyers: HashMap<String, PartyInfo>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_client(&mut self, reference: impl Into<String>, info: PartyInfo) {
        self.clients.insert(reference.into(), info);
    }

    pub fn add_lawyer(&mut self, reference: impl Into<String>, info: PartyInfo) {
        self.lawyers.insert(reference.into(), info);
    }
}

impl PartyDirectory for StaticDirectory {
    fn client(&self, reference: &str) -> Option<PartyInfo> {
        self.clients.get(reference).cloned()
    }
    fn lawyer(&self, reference: &str) -> Option<PartyInfo> {
        self.lawyers.get(reference).cloned()
    }
}

/// Resolves canonical variable names against one draft. Pure view over the
/// draft: nothing is cached, every call reads current state.
pub struct VariableResolver<'a> {
    draft: &'a ContractDraft,
    directory: &'a dyn PartyDirectory,
}

impl<'a> VariableResolver<'a> {
    pub fn new(draft: &'a ContractDraft, directory: &'a dyn PartyDirectory) -> Self {
        Self { draft, directory }
    }

    /// The substitution value for `name`, or `None` when unresolved. Default
    /// sentinels like `"0.00"` are returned verbatim; completeness is
    /// [`Self::is_provided`]'s concern.
    pub fn resolve(&self, name: &str) -> Option<String> {
        if let Some(value) = self.non_empty_field(name) {
            return Some(value);
        }
        for key in alias_keys(name) {
            if let Some(value) = self.non_empty_field(key) {
                debug!("resolved '{}' through alias key '{}'", name, key);
                return Some(value);
            }
        }
        self.computed(name)
    }

    fn non_empty_field(&self, key: &str) -> Option<String> {
        self.draft
            .form_fields
            .get(key)
            .filter(|v| !v.is_empty())
            .cloned()
    }

    /// Defaults derived from draft state other than `form_fields`.
    fn computed(&self, name: &str) -> Option<String> {
        match name {
            MODALIDAD_PAGO => Some(self.draft.payment_mode.display().to_string()),
            "Valor Honorarios" => Some(format_amount(&self.draft.total_amount)),
            "Área de Práctica" => {
                Some(&self.draft.practice_area).filter(|v| !v.is_empty()).cloned()
            }
            "Nombre Cliente" => self.client().map(|p| p.name),
            "DNI Cliente" => self.client().map(|p| p.id_number),
            "Representante Legal" => self.lawyer().map(|p| p.name),
            _ => None,
        }
    }

    fn client(&self) -> Option<PartyInfo> {
        self.draft
            .client_ref
            .as_deref()
            .and_then(|r| self.directory.client(r))
    }

    fn lawyer(&self) -> Option<PartyInfo> {
        self.draft
            .lawyer_ref
            .as_deref()
            .and_then(|r| self.directory.lawyer(r))
    }

    /// Completeness test: resolved to something past its default sentinel.
    /// `Modalidad Pago` always computes a display string, so it is always
    /// provided.
    pub fn is_provided(&self, name: &str) -> bool {
        if name == MODALIDAD_PAGO {
            return true;
        }
        match self.resolve(name) {
            Some(value) => !is_default_value(&value),
            None => false,
        }
    }
}

/// Soft finding about one placeholder, for the operator-facing warning
/// panel. Never blocks assembly or persistence.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    /// A known variable whose value is absent or still at its default.
    MissingValue { name: String },
    /// A placeholder that matches neither the catalog nor any form field;
    /// possibly a typo of a catalog name.
    UnknownVariable {
        name: String,
        similar_to: Option<&'static str>,
    },
}

/// Placeholders referenced by the draft's clauses that the resolver cannot
/// satisfy with a non-default value. Sorted, and never contains
/// `Modalidad Pago`.
pub fn missing_variables(draft: &ContractDraft, directory: &dyn PartyDirectory) -> Vec<String> {
    let resolver = VariableResolver::new(draft, directory);
    draft
        .placeholder_names()
        .into_iter()
        .filter(|name| name != MODALIDAD_PAGO && !resolver.is_provided(name))
        .collect()
}

/// Missing variables classified for display, with typo suggestions for names
/// the catalog does not know.
pub fn validate(draft: &ContractDraft, directory: &dyn PartyDirectory) -> Vec<ValidationWarning> {
    missing_variables(draft, directory)
        .into_iter()
        .map(|name| {
            if catalog::is_standard(&name) || draft.form_fields.contains_key(&name) {
                ValidationWarning::MissingValue { name }
            } else {
                let similar_to = catalog::suggest(&name);
                ValidationWarning::UnknownVariable { name, similar_to }
            }
        })
        .collect()
}
