//! Extract-variable refactoring for C-family sources.
//!
//! The entry point is [`ExtractVariable`], a [`Tweak`] that is prepared against a
//! [`Selection`] and then applied to produce an [`Effect`]: one insertion of the new
//! declaration and one replacement of the extracted expression.
//!
//! The building blocks are exposed for callers that want to query them directly:
//! [`referenced_decls`], [`binary_operator_range`], [`extraction_target`],
//! [`insertion_point`] and [`ExtractionContext`].

mod binary_range;
mod context;
mod edit;
mod eligibility;
mod insertion;
mod references;
mod tweak;

pub use binary_range::{binary_operator_range, ParsedBinaryOperator};
pub use context::{variable_type, ExtractError, ExtractionContext};
pub use edit::{apply_text_edits, EditError, FileId, TextEdit, TextRange, WorkspaceEdit};
pub use eligibility::{check_eligibility, extraction_target, Ineligible};
pub use insertion::{expr_is_valid_outside, insertion_point};
pub use references::referenced_decls;
pub use tweak::{Effect, ExtractVariable, Selection, Tweak, TweakError, REFACTOR_KIND};
