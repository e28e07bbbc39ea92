//! RFC 6962 Merkle tree verification
//!
//! CT logs prove that an entry is part of their tree with an audit path from
//! the entry's leaf hash up to a signed root. This crate implements the
//! hashing rules and the audit path check.

pub mod error;
pub mod proof;
pub mod tree;

pub use error::{Error, Result};
pub use proof::verify_inclusion_proof;
pub use tree::{hash_children, hash_leaf, HASH_SIZE, LEAF_HASH_PREFIX, NODE_HASH_PREFIX};
