//! # Trie Root Computation
//!
//! Builds the Patricia Merkle Trie for a complete key/value set in one pass
//! and returns its root hash. Genesis state is known up front, so no
//! incremental insert/delete machinery is needed.

use std::collections::BTreeMap;

use shared_types::{keccak256, Hash};

use super::nibbles::Nibbles;
use super::node::{NodeRef, TrieNode};

/// Root hash of the trie holding `entries`.
///
/// Duplicate keys keep the last value. Entries with empty values are
/// treated as absent.
pub fn trie_root<I, K, V>(entries: I) -> Hash
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<[u8]>,
    V: AsRef<[u8]>,
{
    let sorted: BTreeMap<Vec<u8>, Vec<u8>> = entries
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_vec(), v.as_ref().to_vec()))
        .collect();

    let items: Vec<(Nibbles, Vec<u8>)> = sorted
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (Nibbles::from_bytes(&k), v))
        .collect();

    build_node(&items, 0).hash()
}

/// Root hash of the "secure" trie: every key is replaced by its Keccak256
/// before insertion.
pub fn sec_trie_root<I, K, V>(entries: I) -> Hash
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<[u8]>,
    V: AsRef<[u8]>,
{
    trie_root(
        entries
            .into_iter()
            .map(|(k, v)| (keccak256(k.as_ref()), v)),
    )
}

/// Build the node covering `items`, all of which share their first `depth`
/// nibbles. `items` must be sorted and free of duplicate keys.
fn build_node(items: &[(Nibbles, Vec<u8>)], depth: usize) -> TrieNode {
    match items {
        [] => TrieNode::Empty,

        [(key, value)] => TrieNode::Leaf {
            path: key.slice(depth),
            value: value.clone(),
        },

        [(first, _), .., (last, _)] => {
            // Sorted input: the common prefix of the set is the common
            // prefix of its extremes.
            let shared = first.slice(depth).common_prefix_len(&last.slice(depth));

            if shared > 0 {
                let child = build_node(items, depth + shared);
                return TrieNode::Extension {
                    path: first.slice_range(depth, depth + shared),
                    child: NodeRef::from_node(&child),
                };
            }

            build_branch(items, depth)
        }
    }
}

fn build_branch(items: &[(Nibbles, Vec<u8>)], depth: usize) -> TrieNode {
    let mut children: Box<[Option<NodeRef>; 16]> = Box::default();
    let mut value = None;
    let mut rest = items;

    // A key ending exactly here sorts first.
    if let Some(((key, v), tail)) = rest.split_first() {
        if key.len() == depth {
            value = Some(v.clone());
            rest = tail;
        }
    }

    for (nibble, slot) in children.iter_mut().enumerate() {
        let end = rest
            .iter()
            .position(|(key, _)| key.at(depth) as usize != nibble)
            .unwrap_or(rest.len());
        let (group, tail) = rest.split_at(end);
        if !group.is_empty() {
            *slot = Some(NodeRef::from_node(&build_node(group, depth + 1)));
        }
        rest = tail;
    }

    TrieNode::Branch { children, value }
}
