use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Default, Debug, Clone, PartialEq, Eq)]
/// Binary Huffman tree over the vocabulary used by hierarchical softmax.
///
/// Every word is a leaf. The path from the root to the leaf is stored
/// as a list of inner nodes (`points`) and the branch taken at each
/// of them (`codes`). Inner nodes are numbered from 0 to `words - 2`,
/// the root being the last one.
pub struct HuffmanTree {
    codes: Vec<Vec<u8>>,
    points: Vec<Vec<u32>>
}

impl HuffmanTree {
    /// Build tree from the words counts.
    ///
    /// Ties are broken by node index, so the same counts
    /// always produce the same tree.
    pub fn new(counts: &[u64]) -> Self {
        let n = counts.len();

        if n < 2 {
            return Self {
                codes: vec![Vec::new(); n],
                points: vec![Vec::new(); n]
            };
        }

        let mut heap = counts.iter()
            .enumerate()
            .map(|(i, count)| Reverse((*count, i)))
            .collect::<BinaryHeap<_>>();

        // Leaves are `0..n`, inner nodes are `n..2n - 1`.
        let mut parents = vec![0; 2 * n - 1];
        let mut branches = vec![0; 2 * n - 1];

        let mut next = n;

        while heap.len() > 1 {
            let (Some(Reverse((count_1, node_1))), Some(Reverse((count_2, node_2)))) = (heap.pop(), heap.pop()) else {
                break;
            };

            parents[node_1] = next;
            parents[node_2] = next;

            branches[node_2] = 1;

            heap.push(Reverse((count_1 + count_2, next)));

            next += 1;
        }

        let root = 2 * n - 2;

        let mut codes = Vec::with_capacity(n);
        let mut points = Vec::with_capacity(n);

        for leaf in 0..n {
            let mut word_codes = Vec::new();
            let mut word_points = Vec::new();

            let mut node = leaf;

            while node != root {
                word_codes.push(branches[node]);
                word_points.push((parents[node] - n) as u32);

                node = parents[node];
            }

            word_codes.reverse();
            word_points.reverse();

            codes.push(word_codes);
            points.push(word_points);
        }

        Self {
            codes,
            points
        }
    }

    #[inline]
    /// Amount of inner nodes of the tree.
    pub fn inner_nodes(&self) -> usize {
        self.codes.len().saturating_sub(1)
    }

    #[inline]
    /// Branches taken from the root to the word's leaf.
    pub fn codes(&self, word: u32) -> &[u8] {
        &self.codes[word as usize]
    }

    #[inline]
    /// Inner nodes visited from the root to the word's leaf.
    pub fn points(&self, word: u32) -> &[u32] {
        &self.points[word as usize]
    }
}

#[test]
fn test_huffman_tree() {
    let tree = HuffmanTree::new(&[10, 5, 3, 2]);

    assert_eq!(tree.inner_nodes(), 3);

    // Most frequent word has the shortest path.
    assert_eq!(tree.codes(0).len(), 1);
    assert_eq!(tree.codes(1).len(), 2);
    assert_eq!(tree.codes(2).len(), 3);
    assert_eq!(tree.codes(3).len(), 3);

    // Every path starts at the root.
    for word in 0..4 {
        assert_eq!(tree.points(word)[0], 2);
        assert_eq!(tree.points(word).len(), tree.codes(word).len());
    }

    // Paths are unique.
    let paths = (0..4).map(|word| tree.codes(word).to_vec()).collect::<std::collections::HashSet<_>>();

    assert_eq!(paths.len(), 4);

    assert_eq!(HuffmanTree::new(&[7]).codes(0), &[] as &[u8]);
    assert_eq!(HuffmanTree::new(&[]).inner_nodes(), 0);
}
