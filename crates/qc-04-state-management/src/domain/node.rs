use rlp::RlpStream;
use shared_types::{keccak256, Hash, EMPTY_TRIE_ROOT, RLP_NULL};

use super::nibbles::Nibbles;

// =============================================================================
// NODE REFERENCE: how a parent points at a child
// =============================================================================

/// Reference from a parent node to a child node.
///
/// Children whose encoding is shorter than 32 bytes are embedded in the
/// parent; larger children are referenced by their Keccak256 hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeRef {
    /// RLP encoding of the child, embedded verbatim.
    Inline(Vec<u8>),
    /// Keccak256 of the child's RLP encoding.
    Hash(Hash),
}

impl NodeRef {
    pub fn from_node(node: &TrieNode) -> Self {
        let encoded = node.rlp_encode();
        if encoded.len() < 32 {
            NodeRef::Inline(encoded)
        } else {
            NodeRef::Hash(keccak256(&encoded))
        }
    }

    fn append_to(&self, stream: &mut RlpStream) {
        match self {
            NodeRef::Inline(encoded) => {
                stream.append_raw(encoded, 1);
            }
            NodeRef::Hash(hash) => {
                stream.append(hash);
            }
        }
    }
}

// =============================================================================
// TRIE NODE: The four node types in MPT
// =============================================================================

/// Node types in the Patricia Merkle Trie.
///
/// Per Ethereum Yellow Paper Appendix D, there are four node types:
/// - Empty (null reference)
/// - Leaf (remaining path + value)
/// - Extension (shared prefix + single child)
/// - Branch (16 children + optional value)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrieNode {
    /// Empty node (null reference, hash = EMPTY_TRIE_ROOT).
    Empty,

    /// Leaf node: stores remaining key path and the value.
    /// RLP: [hex_prefix_encode(path, true), value]
    Leaf {
        /// Remaining path from current position to this leaf.
        path: Nibbles,
        /// Raw value bytes (an RLP-encoded account or storage value).
        value: Vec<u8>,
    },

    /// Extension node: shared prefix optimization.
    /// RLP: [hex_prefix_encode(path, false), child]
    Extension {
        /// Shared prefix path.
        path: Nibbles,
        /// Reference to the child node.
        child: NodeRef,
    },

    /// Branch node: 16-way branch for each nibble value.
    /// RLP: \[child\[0\], ..., child\[15\], value\]
    Branch {
        /// 16 child references (None = empty).
        children: Box<[Option<NodeRef>; 16]>,
        /// Optional value if a key terminates at this branch.
        value: Option<Vec<u8>>,
    },
}

impl TrieNode {
    /// RLP-encode this node.
    pub fn rlp_encode(&self) -> Vec<u8> {
        match self {
            TrieNode::Empty => RLP_NULL.to_vec(),

            TrieNode::Leaf { path, value } => {
                let mut stream = RlpStream::new_list(2);
                stream.append(&path.encode_hex_prefix(true));
                stream.append(value);
                stream.out().to_vec()
            }

            TrieNode::Extension { path, child } => {
                let mut stream = RlpStream::new_list(2);
                stream.append(&path.encode_hex_prefix(false));
                child.append_to(&mut stream);
                stream.out().to_vec()
            }

            TrieNode::Branch { children, value } => {
                let mut stream = RlpStream::new_list(17);

                for child in children.iter() {
                    match child {
                        Some(child) => child.append_to(&mut stream),
                        None => {
                            stream.append_empty_data();
                        }
                    }
                }

                match value {
                    Some(v) => {
                        stream.append(v);
                    }
                    None => {
                        stream.append_empty_data();
                    }
                }

                stream.out().to_vec()
            }
        }
    }

    /// Compute Keccak256 hash of RLP-encoded node.
    ///
    /// Root nodes are always hashed, even when their encoding is shorter
    /// than 32 bytes.
    pub fn hash(&self) -> Hash {
        if matches!(self, TrieNode::Empty) {
            return EMPTY_TRIE_ROOT;
        }
        keccak256(&self.rlp_encode())
    }
}
