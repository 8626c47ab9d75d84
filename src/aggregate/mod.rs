//! Content family aggregates
//!
//! A [`ContentFamily`] is the consistency boundary of the content graph:
//! every structural rule (acyclicity, single parent, root integrity) is
//! enforced here and nowhere else. Families are built from snapshots by the
//! [`FamilyBuilder`] and mutated only through the aggregate's own methods.

pub mod content_family;
pub mod family_builder;

pub use content_family::*;
pub use family_builder::*;

use crate::identifiers::ContentId;
use std::fmt;

/// Structural violations of the family hierarchy
///
/// These are expected, recoverable outcomes of collaborative editing, never
/// silently corrected. Each message explains why the operation was rejected
/// so it can be surfaced to the initiating user as-is.
///
/// `Display` and `Error` are implemented by hand because the
/// `DuplicateRelationship` fields name graph-edge endpoints; a derived
/// `thiserror` impl would treat the `source` field as an error cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// The proposed parent edge would close a loop in the hierarchy
    CycleDetected { parent: ContentId, child: ContentId },

    /// A node may have at most one incoming parent-class edge
    MultipleParents {
        child: ContentId,
        existing_parent: ContentId,
        rejected_parent: ContentId,
    },

    /// The family root is defined by having no parent
    RootHasParent { root: ContentId, parent: ContentId },

    /// The referenced content is not a member of this family
    OrphanContent(ContentId),

    /// Edges between an item and itself are meaningless
    SelfRelationship(ContentId),

    /// An identical edge already connects these two items
    DuplicateRelationship { source: ContentId, target: ContentId },

    /// The snapshot being built does not contain the named item
    MissingContent(ContentId),

    /// Attachment edges must be parental and name the attached item as child
    InvalidAttachment { child: ContentId },
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CycleDetected { parent, child } => write!(
                f,
                "linking {child} under {parent} would create a cycle: {child} is already an ancestor of {parent}"
            ),
            Self::MultipleParents {
                child,
                existing_parent,
                rejected_parent,
            } => write!(
                f,
                "content {child} is already a child of {existing_parent}; it cannot also become a child of {rejected_parent}"
            ),
            Self::RootHasParent { root, parent } => write!(
                f,
                "content {root} is the family root and cannot be made a child of {parent}"
            ),
            Self::OrphanContent(id) => {
                write!(f, "content {id} is not a member of this family")
            }
            Self::SelfRelationship(id) => {
                write!(f, "content {id} cannot have a relationship with itself")
            }
            Self::DuplicateRelationship { source, target } => write!(
                f,
                "a relationship of the same type already links {source} to {target}"
            ),
            Self::MissingContent(id) => {
                write!(f, "content {id} was not found in the provided snapshot")
            }
            Self::InvalidAttachment { child } => write!(
                f,
                "content {child} can only be attached with a parent-class relationship naming it as the child"
            ),
        }
    }
}

impl std::error::Error for StructuralError {}
