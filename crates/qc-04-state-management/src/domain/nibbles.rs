// =============================================================================
// NIBBLES: Half-byte path representation
// =============================================================================

/// Nibble path for trie traversal.
///
/// Keys are converted to nibbles (half-bytes, 0-15) before insertion. A
/// 32-byte hashed key becomes 64 nibbles.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Nibbles(pub Vec<u8>);

impl Nibbles {
    /// Create nibbles from arbitrary bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut nibbles = Vec::with_capacity(bytes.len() * 2);
        for byte in bytes {
            nibbles.push(byte >> 4);
            nibbles.push(byte & 0x0F);
        }
        Nibbles(nibbles)
    }

    /// Get a slice of nibbles starting at offset.
    pub fn slice(&self, start: usize) -> Self {
        Nibbles(self.0[start..].to_vec())
    }

    /// Get a range slice of nibbles.
    pub fn slice_range(&self, start: usize, end: usize) -> Self {
        Nibbles(self.0[start..end].to_vec())
    }

    /// Find common prefix length with another nibbles path.
    pub fn common_prefix_len(&self, other: &Nibbles) -> usize {
        self.0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get nibble at index.
    pub fn at(&self, index: usize) -> u8 {
        self.0[index]
    }

    /// Encode nibbles with hex-prefix for RLP encoding.
    ///
    /// Per Ethereum Yellow Paper Appendix C:
    /// - First nibble encodes flags: 0=extension even, 1=extension odd, 2=leaf even, 3=leaf odd
    /// - If odd number of nibbles, first nibble is part of path
    pub fn encode_hex_prefix(&self, is_leaf: bool) -> Vec<u8> {
        let odd = self.len() % 2 == 1;
        let prefix = if is_leaf { 2 } else { 0 } + if odd { 1 } else { 0 };

        let mut result = Vec::with_capacity(self.len() / 2 + 1);

        if odd {
            result.push((prefix << 4) | self.0[0]);
            for chunk in self.0[1..].chunks(2) {
                result.push((chunk[0] << 4) | chunk[1]);
            }
        } else {
            result.push(prefix << 4);
            for chunk in self.0.chunks(2) {
                result.push((chunk[0] << 4) | chunk[1]);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibbles_from_bytes() {
        let nibbles = Nibbles::from_bytes(&[0xAB, 0xCD, 0x0F]);
        assert_eq!(nibbles.len(), 6);
        assert_eq!(nibbles.0, vec![0x0A, 0x0B, 0x0C, 0x0D, 0x00, 0x0F]);
    }

    #[test]
    fn test_hex_prefix_encoding() {
        // Even length leaf
        let encoded = Nibbles(vec![1, 2, 3, 4]).encode_hex_prefix(true);
        assert_eq!(encoded, vec![0x20, 0x12, 0x34]);

        // Odd length leaf
        let encoded = Nibbles(vec![1, 2, 3]).encode_hex_prefix(true);
        assert_eq!(encoded, vec![0x31, 0x23]);

        // Even length extension
        let encoded = Nibbles(vec![1, 2, 3, 4]).encode_hex_prefix(false);
        assert_eq!(encoded, vec![0x00, 0x12, 0x34]);

        // Odd length extension
        let encoded = Nibbles(vec![0x0F, 1, 0x0C, 0x0B, 8]).encode_hex_prefix(false);
        assert_eq!(encoded, vec![0x1F, 0x1C, 0xB8]);
    }

    #[test]
    fn test_empty_leaf_path() {
        assert_eq!(Nibbles(vec![]).encode_hex_prefix(true), vec![0x20]);
    }

    #[test]
    fn test_common_prefix() {
        let a = Nibbles(vec![6, 4, 6, 15]);
        let b = Nibbles(vec![6, 4, 6, 5, 1]);
        assert_eq!(a.common_prefix_len(&b), 3);
        assert_eq!(a.slice(1).common_prefix_len(&b.slice(1)), 2);
        assert_eq!(a.slice_range(1, 3).0, vec![4, 6]);
    }
}
