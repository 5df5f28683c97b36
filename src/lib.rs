//! Contract variable resolution and template assembly for the LexContract
//! portal.
//!
//! A working [`ContractDraft`] holds clauses copied from reusable templates
//! or the clause repository (copy-on-instantiate, the sources are never
//! mutated) alongside manually written ones. Clause bodies reference values
//! through `[Nombre Variable]` placeholders; the [`resolver`] merges form
//! fields, fixed alias keys and computed defaults into one value per
//! canonical name, the validator reports which names are still unfilled, and
//! the [`assembler`] renders the final ordinal-numbered document for preview
//! and PDF export.
//!
//! Everything here is synchronous, in-memory computation; persistence and
//! party lookups are collaborators behind [`persist`] and
//! [`resolver::PartyDirectory`].

pub mod assembler;
pub mod catalog;
pub mod draft;
pub mod persist;
pub mod resolver;
pub mod scanner;
pub mod types;

pub use assembler::{assemble, ordinal_label, RenderedDocument, BLANK_FILL};
pub use catalog::VariableCatalogEntry;
pub use draft::{ClauseLibrary, ContractDraft};
pub use resolver::{
    missing_variables, validate, NoDirectory, PartyDirectory, PartyInfo, StaticDirectory,
    ValidationWarning, VariableResolver,
};
pub use scanner::{scan, segments, Segment};
pub use types::{
    Clause, ClauseId, ClauseSource, EngineError, Installment, InstallmentField, LibraryClause,
    PaymentMode, Template, TemplateClause,
};
