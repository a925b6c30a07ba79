pub mod account;
pub mod nibbles;
pub mod node;
pub mod trie;

pub use account::*;
pub use nibbles::*;
pub use node::*;
pub use trie::*;
