//! Renders a working draft into the final document text: fixed preamble,
//! ordinal-numbered clauses with substituted placeholders, and the computed
//! payment section. The output feeds the on-screen preview and the PDF
//! rasterizer.

use std::collections::HashSet;

use crate::draft::ContractDraft;
use crate::resolver::{format_amount, PartyDirectory, VariableResolver};
use crate::scanner::{self, Segment};
use crate::types::{EngineError, PaymentMode};

/// Substituted in place of an unresolved placeholder so the rendered
/// document never exposes raw bracket syntax.
pub const BLANK_FILL: &str = "__________";

/// Ordinal words for the first five clauses; later clauses fall back to
/// `"{n}ª."`.
static ORDINALS: [&str; 5] = ["PRIMERA", "SEGUNDA", "TERCERA", "CUARTA", "QUINTA"];

/// Parties/recitals boilerplate. Rendered through the same substitution path
/// as clause bodies.
const PREAMBLE: &str = "Entre los suscritos [Representante Legal], mayor de edad e identificado \
como representante de LEXCONTRACT, quien en adelante se denominará EL CONTRATISTA, y \
[Nombre Cliente], identificado con documento No. [DNI Cliente], quien en adelante se denominará \
EL CONTRATANTE, han convenido celebrar el presente contrato de prestación de servicios \
profesionales en el área de [Área de Práctica], el cual se regulará por las cláusulas que a \
continuación se expresan:";

/// Label for the clause at `index` (0-based document order). Purely
/// positional: deleting or reordering clauses shifts every later label.
pub fn ordinal_label(index: usize) -> String {
    match ORDINALS.get(index) {
        Some(word) => format!("{}.", word),
        None => format!("{}ª.", index + 1),
    }
}

/// Assembled document, in rendering order: preamble, numbered clauses,
/// payment section.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub preamble: String,
    pub clauses_text: Vec<String>,
    pub payment_section: String,
}

impl RenderedDocument {
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.preamble);
        for clause in &self.clauses_text {
            out.push_str("\n\n");
            out.push_str(clause);
        }
        out.push_str("\n\n");
        out.push_str(&self.payment_section);
        out
    }
}

fn substitute(body: &str, resolver: &VariableResolver) -> String {
    scanner::segments(body)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => text,
            Segment::Placeholder(name) => resolver
                .resolve(&name)
                .unwrap_or_else(|| BLANK_FILL.to_string()),
        })
        .collect()
}

fn payment_section(draft: &ContractDraft) -> String {
    let total = format_amount(&draft.total_amount);
    if draft.payment_mode == PaymentMode::Installments && !draft.installments.is_empty() {
        let mut section =
            String::from("FORMA DE PAGO: el valor total se cancelará mediante abonos, según el \
siguiente cronograma:\n");
        for installment in &draft.installments {
            let due_date = if installment.due_date.is_empty() {
                BLANK_FILL
            } else {
                &installment.due_date
            };
            section.push_str(&format!(
                "  {}. {}    {}\n",
                installment.sequence, due_date, installment.amount
            ));
        }
        section.push_str(&format!("TOTAL: {}", total));
        section
    } else {
        format!(
            "FORMA DE PAGO: el CONTRATANTE pagará la suma de {} (COP) en un pago único.",
            total
        )
    }
}

/// Renders the draft. Missing variables never fail assembly (they degrade to
/// [`BLANK_FILL`]); only a structurally inconsistent draft does, and that is
/// a caller bug.
pub fn assemble(
    draft: &ContractDraft,
    directory: &dyn PartyDirectory,
) -> Result<RenderedDocument, EngineError> {
    let mut seen = HashSet::new();
    for clause in &draft.clauses {
        if !seen.insert(clause.id) {
            return Err(EngineError::Structural {
                reason: format!("duplicate clause id {}", clause.id),
            });
        }
    }
    if draft.installments.iter().any(|i| i.sequence == 0) {
        return Err(EngineError::Structural {
            reason: "installment sequence numbers are 1-based".to_string(),
        });
    }

    let resolver = VariableResolver::new(draft, directory);
    let clauses_text = draft
        .clauses
        .iter()
        .enumerate()
        .map(|(index, clause)| {
            format!(
                "{} {}: {}",
                ordinal_label(index),
                clause.title.to_uppercase(),
                substitute(&clause.content, &resolver)
            )
        })
        .collect();

    Ok(RenderedDocument {
        preamble: substitute(PREAMBLE, &resolver),
        clauses_text,
        payment_section: payment_section(draft),
    })
}
