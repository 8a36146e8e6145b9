mod source;
mod specification;

pub use source::{PolicyDocument, PolicyFormat, PolicySourceError};
pub use specification::{CreditTier, PolicyIssue, PolicySpecification};
