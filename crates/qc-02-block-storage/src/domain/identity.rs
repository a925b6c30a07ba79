//! # Genesis Identity
//!
//! A chain is identified by the Keccak256 of its genesis header's RLP
//! encoding. The store only ever sees the encoded block, so the header is
//! sliced back out of it here.

use rlp::Rlp;
use shared_types::{keccak256, Hash};

use super::errors::StorageError;

/// Number of items in an encoded block: `[header, transactions, uncles]`.
const BLOCK_ITEMS: usize = 3;

/// Position of the state root within the header list.
const STATE_ROOT_INDEX: usize = 3;

/// Genesis hash of an RLP-encoded block.
///
/// # Errors
///
/// `InvalidGenesis` if `block` is not a three-item list whose first item is
/// itself a list.
pub fn genesis_identity(block: &[u8]) -> Result<Hash, StorageError> {
    let header = header_of(block)?;
    Ok(keccak256(header.as_raw()))
}

/// State root committed by the header of an RLP-encoded block.
pub fn header_state_root(block: &[u8]) -> Result<Hash, StorageError> {
    let header = header_of(block)?;
    header
        .val_at::<Hash>(STATE_ROOT_INDEX)
        .map_err(|e| StorageError::InvalidGenesis {
            reason: format!("header state root: {}", e),
        })
}

fn header_of(block: &[u8]) -> Result<Rlp<'_>, StorageError> {
    let invalid = |reason: String| StorageError::InvalidGenesis { reason };

    let rlp = Rlp::new(block);
    if !rlp.is_list() {
        return Err(invalid("block is not an RLP list".to_string()));
    }
    let items = rlp.item_count().map_err(|e| invalid(e.to_string()))?;
    if items != BLOCK_ITEMS {
        return Err(invalid(format!(
            "block has {} items, expected {}",
            items, BLOCK_ITEMS
        )));
    }

    let header = rlp.at(0).map_err(|e| invalid(e.to_string()))?;
    if !header.is_list() {
        return Err(invalid("header is not an RLP list".to_string()));
    }
    Ok(header)
}
