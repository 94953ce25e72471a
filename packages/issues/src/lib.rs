//! # Quarry Issues
//!
//! Map validation. Generators inspect entities and brushes and report [`Issue`]s;
//! an [`IssueIndex`] keeps them current from document notifications, and quick
//! fixes turn issues back into undoable commands.
//!
//! ```rust,ignore
//! use quarry_issues::{GeneratorRegistry, IssueIndex};
//!
//! let index = IssueIndex::attach(&mut document.borrow_mut(), GeneratorRegistry::new(bounds));
//! for issue in index.issues() {
//!     println!("{}: {}", issue.node, issue.description);
//! }
//! ```

mod generate;
mod generators;
mod issue;
mod issue_index;
mod quick_fix;

pub use generate::{generate_for_node, generate_issues};
pub use generators::{GeneratorRegistry, IssueGenerator, WorldBoundsIssueGenerator};
pub use issue::Issue;
pub use issue_index::IssueIndex;
pub use quick_fix::{DeleteObjectsQuickFix, IssueQuickFix};
