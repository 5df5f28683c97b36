//! The working draft of a contract under edition, plus the read-only library
//! of reusable templates and clauses it instantiates from.
//!
//! Instantiation is copy-on-instantiate: working clauses get fresh ids and
//! their own content, so editing a draft can never reach back into a library
//! source.

use log::debug;
use std::collections::{BTreeSet, HashMap};

use crate::scanner;
use crate::types::{
    Clause, ClauseId, ClauseSource, EngineError, Installment, InstallmentField, LibraryClause,
    PaymentMode, Template,
};

/// Names pre-suggested on a brand-new manual clause. Advisory only: the body
/// starts empty, so none of these is actually referenced until inserted.
const STARTER_VARIABLES: [&str; 3] = ["Nombre Cliente", "Área de Práctica", "Fecha Inicio"];

/// Read-only store of instantiation sources, keyed by the backend ids
/// (`PLT-…` for templates, `CLS-…` for library clauses).
#[derive(Debug, Default)]
pub struct ClauseLibrary {
    templates: HashMap<String, Template>,
    clauses: HashMap<String, LibraryClause>,
}

impl ClauseLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_template(&mut self, template: Template) {
        self.templates.insert(template.id.clone(), template);
    }

    pub fn add_clause(&mut self, clause: LibraryClause) {
        self.clauses.insert(clause.id.clone(), clause);
    }

    pub fn template(&self, id: &str) -> Result<&Template, EngineError> {
        self.templates.get(id).ok_or_else(|| EngineError::NotFound {
            kind: "template",
            id: id.to_string(),
        })
    }

    pub fn library_clause(&self, id: &str) -> Result<&LibraryClause, EngineError> {
        self.clauses.get(id).ok_or_else(|| EngineError::NotFound {
            kind: "library clause",
            id: id.to_string(),
        })
    }
}

/// Mutable, session-owned working state of one contract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractDraft {
    pub id: Option<String>,
    pub title: String,
    pub client_ref: Option<String>,
    pub lawyer_ref: Option<String>,
    pub practice_area: String,
    /// Decimal string, as entered by the operator (`"0.00"` until touched).
    pub total_amount: String,
    pub payment_mode: PaymentMode,
    pub installments: Vec<Installment>,
    /// Document order. Ordinal labels are positional, never stored.
    pub clauses: Vec<Clause>,
    /// Raw operator-entered values, keyed by canonical variable name where
    /// possible; backend camelCase keys are accepted through the resolver's
    /// alias table.
    pub form_fields: HashMap<String, String>,
    next_clause_id: ClauseId,
}

impl ContractDraft {
    pub fn new() -> Self {
        Self {
            total_amount: "0.00".to_string(),
            ..Self::default()
        }
    }

    fn next_id(&mut self) -> ClauseId {
        self.next_clause_id += 1;
        self.next_clause_id
    }

    /// Copies every clause of `template` into the working list, in order.
    /// The source is untouched; `variables` are rescanned from the copied
    /// content since template metadata may be stale.
    pub fn instantiate_template(&mut self, template: &Template) -> Vec<ClauseId> {
        let mut ids = Vec::with_capacity(template.clauses.len());
        for source in &template.clauses {
            let id = self.next_id();
            self.clauses.push(Clause {
                id,
                title: source.title.clone(),
                content: source.content.clone(),
                source: ClauseSource::Template,
                variables: scanner::scan(&source.content),
            });
            ids.push(id);
        }
        debug!(
            "instantiated template '{}' into draft: {} clause(s)",
            template.id,
            ids.len()
        );
        ids
    }

    /// Looks the template up first, so a missing id aborts before any clause
    /// is copied (all-or-none).
    pub fn instantiate_template_by_id(
        &mut self,
        library: &ClauseLibrary,
        template_id: &str,
    ) -> Result<Vec<ClauseId>, EngineError> {
        let template = library.template(template_id)?;
        Ok(self.instantiate_template(template))
    }

    pub fn instantiate_library_clause(&mut self, source: &LibraryClause) -> ClauseId {
        let id = self.next_id();
        self.clauses.push(Clause {
            id,
            title: source.title.clone(),
            content: source.content.clone(),
            source: ClauseSource::Library,
            variables: scanner::scan(&source.content),
        });
        debug!("instantiated library clause '{}' into draft", source.id);
        id
    }

    pub fn instantiate_library_clause_by_id(
        &mut self,
        library: &ClauseLibrary,
        clause_id: &str,
    ) -> Result<ClauseId, EngineError> {
        let source = library.library_clause(clause_id)?;
        Ok(self.instantiate_library_clause(source))
    }

    /// New empty clause written by hand, seeded with the starter suggestions.
    pub fn create_manual_clause(&mut self, default_title: &str) -> ClauseId {
        let id = self.next_id();
        self.clauses.push(Clause {
            id,
            title: default_title.to_string(),
            content: String::new(),
            source: ClauseSource::Manual,
            variables: STARTER_VARIABLES.iter().map(|v| v.to_string()).collect(),
        });
        id
    }

    /// Re-attaches a clause loaded from a persisted contract. `extra` carries
    /// stored variable names that may not appear in the body yet (explicitly
    /// inserted, never rendered); scanned names are always included.
    pub(crate) fn restore_clause(
        &mut self,
        title: String,
        content: String,
        source: ClauseSource,
        extra: impl IntoIterator<Item = String>,
    ) -> ClauseId {
        let id = self.next_id();
        let mut variables = scanner::scan(&content);
        variables.extend(extra);
        self.clauses.push(Clause {
            id,
            title,
            content,
            source,
            variables,
        });
        id
    }

    pub fn clause(&self, id: ClauseId) -> Option<&Clause> {
        self.clauses.iter().find(|c| c.id == id)
    }

    fn clause_mut(&mut self, id: ClauseId) -> Option<&mut Clause> {
        self.clauses.iter_mut().find(|c| c.id == id)
    }

    /// Removes a clause from the working list. Downstream state (missing
    /// variables, ordinal labels) is derived on read, so nothing else needs
    /// to be touched.
    pub fn remove_clause(&mut self, id: ClauseId) -> bool {
        let before = self.clauses.len();
        self.clauses.retain(|c| c.id != id);
        self.clauses.len() != before
    }

    /// Replaces the body and rescans it in full, restoring the derived
    /// `variables == scan(content)` invariant exactly.
    pub fn update_clause_content(&mut self, id: ClauseId, content: &str) -> bool {
        match self.clause_mut(id) {
            Some(clause) => {
                clause.content = content.to_string();
                clause.variables = scanner::scan(content);
                true
            }
            None => false,
        }
    }

    pub fn update_clause_title(&mut self, id: ClauseId, title: &str) -> bool {
        match self.clause_mut(id) {
            Some(clause) => {
                clause.title = title.to_string();
                true
            }
            None => false,
        }
    }

    /// Splices `[name]` into a clause body at the given byte offset and
    /// returns the cursor position just after the inserted token. The name is
    /// tracked in `variables` immediately, before any rescan.
    ///
    /// Insertion takes the draft, clause and cursor explicitly; there is no
    /// ambient "active textarea" state in the engine.
    pub fn insert_placeholder(
        &mut self,
        clause_id: ClauseId,
        cursor: usize,
        name: &str,
    ) -> Result<usize, EngineError> {
        let clause = self
            .clause_mut(clause_id)
            .ok_or_else(|| EngineError::NotFound {
                kind: "clause",
                id: clause_id.to_string(),
            })?;
        if cursor > clause.content.len() || !clause.content.is_char_boundary(cursor) {
            return Err(EngineError::Structural {
                reason: format!("insertion cursor {} is not a character boundary", cursor),
            });
        }
        let token = format!("[{}]", name);
        clause.content.insert_str(cursor, &token);
        clause.variables.insert(name.to_string());
        Ok(cursor + token.len())
    }

    /// Union of `variables` across all working clauses.
    pub fn placeholder_names(&self) -> BTreeSet<String> {
        self.clauses
            .iter()
            .flat_map(|c| c.variables.iter().cloned())
            .collect()
    }

    pub fn set_form_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.form_fields.insert(name.into(), value.into());
    }

    pub fn set_payment_mode(&mut self, mode: PaymentMode) {
        self.payment_mode = mode;
    }

    /// Appends a zeroed installment with the next sequence number and
    /// returns it.
    pub fn add_installment(&mut self) -> u32 {
        let sequence = self
            .installments
            .iter()
            .map(|i| i.sequence)
            .max()
            .unwrap_or(0)
            + 1;
        self.installments.push(Installment {
            sequence,
            due_date: String::new(),
            amount: "0.00".to_string(),
        });
        sequence
    }

    /// Drops the row with the given sequence number. Remaining rows keep
    /// their numbers; the assembler renders them in list order.
    pub fn remove_installment(&mut self, sequence: u32) -> bool {
        let before = self.installments.len();
        self.installments.retain(|i| i.sequence != sequence);
        self.installments.len() != before
    }

    /// In-place edit of one installment column. No date or amount validation
    /// happens here; that is the caller's concern.
    pub fn update_installment(
        &mut self,
        sequence: u32,
        field: InstallmentField,
        value: &str,
    ) -> bool {
        match self.installments.iter_mut().find(|i| i.sequence == sequence) {
            Some(installment) => {
                match field {
                    InstallmentField::DueDate => installment.due_date = value.to_string(),
                    InstallmentField::Amount => installment.amount = value.to_string(),
                }
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TemplateClause;

    fn sample_template() -> Template {
        Template {
            id: "PLT-2026-0001".to_string(),
            title: "Insolvencia Base".to_string(),
            practice_area: "Insolvencia Económica".to_string(),
            status: "ACTIVA".to_string(),
            clauses: vec![
                TemplateClause {
                    title: "Objeto".to_string(),
                    content: "El CONTRATISTA asesorará a [Nombre Cliente] en [Área de Práctica]."
                        .to_string(),
                    // stale on purpose: instantiation must rescan instead
                    variables: vec!["Fecha Fin".to_string()],
                },
                TemplateClause {
                    title: "Honorarios".to_string(),
                    content: "El valor asciende a [Valor Honorarios].".to_string(),
                    variables: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_instantiate_template_copies_and_rescans() {
        let template = sample_template();
        let mut draft = ContractDraft::new();
        let ids = draft.instantiate_template(&template);

        assert_eq!(ids.len(), 2);
        let first = draft.clause(ids[0]).unwrap();
        assert_eq!(first.source, ClauseSource::Template);
        assert_eq!(first.content, template.clauses[0].content);
        // stale metadata ignored, content rescanned
        assert!(first.variables.contains("Nombre Cliente"));
        assert!(first.variables.contains("Área de Práctica"));
        assert!(!first.variables.contains("Fecha Fin"));
    }

    #[test]
    fn test_instantiate_template_never_mutates_source() {
        let template = sample_template();
        let snapshot = template.clone();
        let mut draft = ContractDraft::new();
        draft.instantiate_template(&template);

        let clause_id = draft.clauses[0].id;
        draft.update_clause_content(clause_id, "texto reescrito sin variables");
        assert_eq!(template, snapshot);
    }

    #[test]
    fn test_instantiation_ids_are_fresh() {
        let template = sample_template();
        let mut draft = ContractDraft::new();
        let first = draft.instantiate_template(&template);
        let second = draft.instantiate_template(&template);
        assert!(first.iter().all(|id| !second.contains(id)));
    }

    #[test]
    fn test_instantiate_by_id_not_found() {
        let library = ClauseLibrary::new();
        let mut draft = ContractDraft::new();
        let err = draft
            .instantiate_template_by_id(&library, "PLT-0000-0000")
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { kind: "template", .. }));
        assert!(draft.clauses.is_empty());

        let err = draft
            .instantiate_library_clause_by_id(&library, "CLS-0000-0000")
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));
    }

    #[test]
    fn test_instantiate_library_clause() {
        let mut library = ClauseLibrary::new();
        library.add_clause(LibraryClause {
            id: "CLS-2026-0007".to_string(),
            title: "Confidencialidad".to_string(),
            content: "Ambas partes aceptan la jurisdicción de [Ciudad Firma].".to_string(),
        });
        let mut draft = ContractDraft::new();
        let id = draft
            .instantiate_library_clause_by_id(&library, "CLS-2026-0007")
            .unwrap();
        let clause = draft.clause(id).unwrap();
        assert_eq!(clause.source, ClauseSource::Library);
        assert_eq!(clause.variables.len(), 1);
        assert!(clause.variables.contains("Ciudad Firma"));
    }

    #[test]
    fn test_manual_clause_starts_with_suggestions() {
        let mut draft = ContractDraft::new();
        let id = draft.create_manual_clause("CLÁUSULA NUEVA 1");
        let clause = draft.clause(id).unwrap();
        assert_eq!(clause.source, ClauseSource::Manual);
        assert!(clause.content.is_empty());
        // advisory only: suggested, not present in the body
        assert_eq!(clause.variables.len(), 3);
        assert!(clause.variables.contains("Nombre Cliente"));
    }

    #[test]
    fn test_update_content_rederives_variables_exactly() {
        let mut draft = ContractDraft::new();
        let id = draft.create_manual_clause("Penalidad");
        let body = "La penalidad será de [Valor Penalidad] pagadera en [Ciudad Firma].";
        assert!(draft.update_clause_content(id, body));
        let clause = draft.clause(id).unwrap();
        assert_eq!(clause.variables, scanner::scan(body));
        // starter suggestions were replaced, not unioned
        assert!(!clause.variables.contains("Nombre Cliente"));
    }

    #[test]
    fn test_insert_placeholder_at_cursor() {
        let mut draft = ContractDraft::new();
        let id = draft.create_manual_clause("Vigencia");
        draft.update_clause_content(id, "Vigente hasta .");

        let cursor = "Vigente hasta ".len();
        let new_cursor = draft.insert_placeholder(id, cursor, "Fecha Fin").unwrap();
        let clause = draft.clause(id).unwrap();
        assert_eq!(clause.content, "Vigente hasta [Fecha Fin].");
        assert_eq!(new_cursor, cursor + "[Fecha Fin]".len());
        // tracked immediately, before any rescan
        assert!(clause.variables.contains("Fecha Fin"));
    }

    #[test]
    fn test_insert_placeholder_rejects_bad_cursor() {
        let mut draft = ContractDraft::new();
        let id = draft.create_manual_clause("Firma");
        draft.update_clause_content(id, "Firmado en Bogotá");

        let inside_o_acute = "Firmado en Bogot".len() + 1;
        let err = draft
            .insert_placeholder(id, inside_o_acute, "Ciudad Firma")
            .unwrap_err();
        assert!(matches!(err, EngineError::Structural { .. }));

        let err = draft.insert_placeholder(id, 10_000, "Ciudad Firma").unwrap_err();
        assert!(matches!(err, EngineError::Structural { .. }));

        let err = draft.insert_placeholder(999, 0, "Ciudad Firma").unwrap_err();
        assert!(matches!(err, EngineError::NotFound { kind: "clause", .. }));
    }

    #[test]
    fn test_remove_clause() {
        let mut draft = ContractDraft::new();
        let a = draft.create_manual_clause("A");
        let b = draft.create_manual_clause("B");
        assert!(draft.remove_clause(a));
        assert!(!draft.remove_clause(a));
        assert_eq!(draft.clauses.len(), 1);
        assert_eq!(draft.clauses[0].id, b);
    }

    #[test]
    fn test_placeholder_names_union() {
        let mut draft = ContractDraft::new();
        let a = draft.create_manual_clause("A");
        let b = draft.create_manual_clause("B");
        draft.update_clause_content(a, "[Fecha Inicio] y [Fecha Fin]");
        draft.update_clause_content(b, "[Fecha Fin] y [Ciudad Firma]");
        let names = draft.placeholder_names();
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_installment_sequences_are_dense_on_add() {
        let mut draft = ContractDraft::new();
        assert_eq!(draft.add_installment(), 1);
        assert_eq!(draft.add_installment(), 2);
        assert_eq!(draft.add_installment(), 3);
    }

    #[test]
    fn test_installment_removal_keeps_gaps() {
        let mut draft = ContractDraft::new();
        draft.add_installment();
        draft.add_installment();
        draft.add_installment();
        assert!(draft.remove_installment(2));
        let sequences: Vec<u32> = draft.installments.iter().map(|i| i.sequence).collect();
        assert_eq!(sequences, vec![1, 3]);
        // the next add continues past the highest live sequence
        assert_eq!(draft.add_installment(), 4);
    }

    #[test]
    fn test_update_installment_fields() {
        let mut draft = ContractDraft::new();
        let seq = draft.add_installment();
        assert!(draft.update_installment(seq, InstallmentField::DueDate, "2026-01-01"));
        assert!(draft.update_installment(seq, InstallmentField::Amount, "500.00"));
        assert_eq!(draft.installments[0].due_date, "2026-01-01");
        assert_eq!(draft.installments[0].amount, "500.00");
        assert!(!draft.update_installment(99, InstallmentField::Amount, "1.00"));
    }
}
