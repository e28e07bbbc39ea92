//! Merkle proof verification
//!
//! Implements inclusion proof verification as specified in RFC 6962 section 2.1.1.
//! An audit path lists sibling hashes from the leaf up to the root.

use crate::error::{Error, Result};
use crate::tree::hash_children;
use ct_types::Sha256Hash;

/// Verify an inclusion proof for a leaf in a Merkle tree
///
/// # Arguments
/// * `leaf_hash` - The hash of the leaf entry
/// * `leaf_index` - Index of the leaf in the tree (0-based)
/// * `tree_size` - Total number of leaves in the tree
/// * `proof_hashes` - The hashes in the inclusion proof path
/// * `expected_root` - The expected root hash to verify against
pub fn verify_inclusion_proof(
    leaf_hash: &Sha256Hash,
    leaf_index: u64,
    tree_size: u64,
    proof_hashes: &[Sha256Hash],
    expected_root: &Sha256Hash,
) -> Result<()> {
    if tree_size == 0 {
        return Err(Error::InvalidTreeSize(
            "tree size cannot be zero".to_string(),
        ));
    }

    if leaf_index >= tree_size {
        return Err(Error::InvalidLeafIndex(format!(
            "leaf index {} >= tree size {}",
            leaf_index, tree_size
        )));
    }

    let expected_proof_len = expected_inclusion_proof_length(leaf_index, tree_size);
    if proof_hashes.len() != expected_proof_len {
        return Err(Error::InvalidProof(format!(
            "expected {} proof hashes for leaf {} in tree of size {}, got {}",
            expected_proof_len,
            leaf_index,
            tree_size,
            proof_hashes.len()
        )));
    }

    let mut hash = *leaf_hash;
    let mut index = leaf_index;
    let mut last_node = tree_size - 1;

    for proof_hash in proof_hashes {
        // A right child, or the rightmost node of an incomplete level, takes its
        // sibling from the left.
        if index % 2 == 1 || index == last_node {
            hash = hash_children(proof_hash, &hash);
        } else {
            hash = hash_children(&hash, proof_hash);
        }
        index /= 2;
        last_node /= 2;
    }

    if &hash != expected_root {
        return Err(Error::HashMismatch {
            expected: expected_root.to_hex(),
            actual: hash.to_hex(),
        });
    }

    Ok(())
}

/// Number of audit path entries for `leaf_index` in a tree of `tree_size`
///
/// Nodes on the right edge of an incomplete level are promoted without a
/// sibling, so such paths are shorter than `ceil(log2(tree_size))`.
fn expected_inclusion_proof_length(leaf_index: u64, tree_size: u64) -> usize {
    let mut count = 0;
    let mut index = leaf_index;
    let mut size = tree_size;

    while size > 1 {
        if !(size % 2 == 1 && index == size - 1) {
            count += 1;
        }
        index /= 2;
        size = (size + 1) / 2;
    }

    count
}
