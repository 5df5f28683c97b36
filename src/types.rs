use std::collections::BTreeSet;
use std::fmt;

/// Identity of a clause inside a working draft. Fresh ids are handed out by
/// the draft itself; instantiation never reuses a source id.
pub type ClauseId = u64;

/// Where a working clause came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseSource {
    Manual,
    Library,
    Template,
}

impl ClauseSource {
    /// Badge text shown next to a clause in the portal.
    pub fn label(&self) -> &'static str {
        match self {
            ClauseSource::Manual => "MANUAL",
            ClauseSource::Library => "BIBLIOTECA",
            ClauseSource::Template => "PLANTILLA",
        }
    }

    /// Wire code stored in the persisted clause record.
    pub fn code(&self) -> &'static str {
        match self {
            ClauseSource::Manual => "manual",
            ClauseSource::Library => "library",
            ClauseSource::Template => "template",
        }
    }
}

/// A clause attached to a working draft.
///
/// `variables` is derived state: after any content edit it equals exactly
/// what the scanner finds in `content`. The only extra entries are names
/// that were explicitly inserted (or manual-clause starter suggestions) and
/// have not been rendered into the body yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub id: ClauseId,
    pub title: String,
    pub content: String,
    pub source: ClauseSource,
    pub variables: BTreeSet<String>,
}

/// One clause body inside a reusable template. The `variables` metadata is
/// whatever was stored alongside the template and may be stale; instantiation
/// always rescans `content` instead of trusting it.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateClause {
    pub title: String,
    pub content: String,
    pub variables: Vec<String>,
}

/// A reusable, read-only contract template. Never mutated by draft editing.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub id: String,
    pub title: String,
    pub practice_area: String,
    pub status: String,
    pub clauses: Vec<TemplateClause>,
}

/// A single reusable clause from the clause repository.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryClause {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// How the client pays the agreed fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentMode {
    #[default]
    Single,
    Installments,
}

impl PaymentMode {
    /// Human-facing form used when substituting `[Modalidad Pago]`.
    pub fn display(&self) -> &'static str {
        match self {
            PaymentMode::Single => "Pago Único",
            PaymentMode::Installments => "Abonos",
        }
    }

    /// Wire code stored by the backend in `variables_adicionales`.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMode::Single => "unico",
            PaymentMode::Installments => "abonos",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "unico" | "Pago Único" => Some(PaymentMode::Single),
            "abonos" | "Abonos" => Some(PaymentMode::Installments),
            _ => None,
        }
    }
}

/// One row of the payment schedule. Sequence numbers are 1-based and dense
/// at creation time; removal leaves gaps (rows render in list order).
#[derive(Debug, Clone, PartialEq)]
pub struct Installment {
    pub sequence: u32,
    pub due_date: String,
    pub amount: String,
}

/// Which installment column an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallmentField {
    DueDate,
    Amount,
}

#[derive(Debug, Clone)]
pub enum EngineError {
    /// An instantiation source (template or library clause) does not exist.
    /// Aborts that operation only; nothing was copied.
    NotFound { kind: &'static str, id: String },
    /// Malformed input that indicates a caller bug, not operator data entry.
    /// Retrying with the same input cannot succeed.
    Structural { reason: String },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NotFound { kind, id } => write!(f, "{} '{}' not found", kind, id),
            EngineError::Structural { reason } => write!(f, "structural error: {}", reason),
        }
    }
}

impl std::error::Error for EngineError {}
