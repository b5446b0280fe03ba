use ark_bn254::Fr;
use ark_ff::Zero;

use crate::hash::{fr_from_bytes, fr_to_bytes, hash5, hash_left_right, HashBytes};
use crate::{Error, Result};

/// The immutable arity of every tally tree.
pub const TREE_ARITY: usize = 5;

/// The deepest tree supported, `5^16` leaves.
pub const MAX_TREE_DEPTH: u8 = 16;

/// The four siblings of a node within its group of `TREE_ARITY` children.
pub type Siblings = [Fr; TREE_ARITY - 1];

/// Number of leaf slots in a tree of the given depth.
pub fn tree_capacity(depth: u8) -> u64
{
    (TREE_ARITY as u64)
        .checked_pow(depth as u32)
        .unwrap_or(u64::MAX)
}

/// Roots of empty subtrees, where `zeroes[h]` is the root of an all-zero subtree of height `h`.
pub fn merkle_zeroes(depth: u8) -> Result<Vec<Fr>>
{
    let mut zeroes = Vec::with_capacity(depth as usize + 1);
    zeroes.push(Fr::zero());

    for level in 0..depth as usize
    {
        let zero = zeroes[level];
        zeroes.push(hash5(&[zero; TREE_ARITY])?);
    }

    Ok(zeroes)
}

/// An incremental merkle tree of arity five whose unfilled leaves take on zero values.
///
/// Only the populated prefix of each level is stored; every node to the right of
/// it is the root of an empty subtree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QuinTree
{
    /// The fixed depth of the tree.
    depth: u8,

    /// The populated nodes of each level, leaves first.
    levels: Vec<Vec<Fr>>,

    /// The empty subtree roots for each level.
    zeroes: Vec<Fr>,

    /// The current root.
    root: Fr
}

impl QuinTree
{
    /// Create an empty tree of the given depth.
    pub fn new(depth: u8) -> Result<Self>
    {
        if depth == 0 || depth > MAX_TREE_DEPTH
        {
            return Err(Error::InvalidDepth { depth, leaves: 0 });
        }

        let zeroes = merkle_zeroes(depth)?;
        let root = zeroes[depth as usize];

        Ok(QuinTree {
            depth,
            levels: (0..=depth).map(|_| Vec::new()).collect(),
            zeroes,
            root
        })
    }

    /// Build a tree by inserting `leaves` from left to right.
    ///
    /// - `leaves`: The leaf values in vote option index order.
    /// - `depth`: The depth of the tree, fixing its capacity at `5^depth`.
    pub fn build(leaves: &[Fr], depth: u8) -> Result<Self>
    {
        if depth == 0 || depth > MAX_TREE_DEPTH || leaves.len() as u64 > tree_capacity(depth)
        {
            return Err(Error::InvalidDepth { depth, leaves: leaves.len() });
        }

        let mut tree = Self::new(depth)?;
        for leaf in leaves
        {
            tree.insert(*leaf)?;
        }

        Ok(tree)
    }

    /// Inserts a new right-most leaf, recomputing the path to the root.
    pub fn insert(&mut self, leaf: Fr) -> Result<()>
    {
        let count = self.levels[0].len() as u64;
        if count >= self.capacity()
        {
            return Err(Error::InvalidDepth { depth: self.depth, leaves: count as usize + 1 });
        }

        self.levels[0].push(leaf);

        let mut index = count as usize;
        for level in 0..self.depth as usize
        {
            let parent = index / TREE_ARITY;
            let hash = hash5(&self.children(level, parent))?;

            let above = &mut self.levels[level + 1];
            if parent < above.len() { above[parent] = hash; }
            else { above.push(hash); }

            index = parent;
        }

        self.root = self.levels[self.depth as usize][0];
        Ok(())
    }

    /// Produce the inclusion proof for the leaf at `index`.
    pub fn gen_proof(&self, index: u64) -> Result<Proof>
    {
        let capacity = self.capacity();
        if index >= capacity
        {
            return Err(Error::IndexOutOfBounds { index, capacity });
        }

        let mut path_elements = Vec::with_capacity(self.depth as usize);
        let mut path_indices = Vec::with_capacity(self.depth as usize);

        let mut position = index as usize;
        for level in 0..self.depth as usize
        {
            let offset = position % TREE_ARITY;
            let children = self.children(level, position / TREE_ARITY);

            let mut siblings = [Fr::zero(); TREE_ARITY - 1];
            children
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != offset)
                .zip(siblings.iter_mut())
                .for_each(|((_, child), sibling)| *sibling = *child);

            path_elements.push(siblings);
            path_indices.push(offset as u8);
            position /= TREE_ARITY;
        }

        Ok(Proof { index, path_elements, path_indices })
    }

    /// The leaf at `index`, zero if it was never filled.
    pub fn leaf(&self, index: u64) -> Result<Fr>
    {
        let capacity = self.capacity();
        if index >= capacity
        {
            return Err(Error::IndexOutOfBounds { index, capacity });
        }

        Ok(self.node(0, index as usize))
    }

    /// Salted root, binding the tree contents to a random salt.
    pub fn commitment(&self, salt: Fr) -> Result<Fr>
    {
        hash_left_right(self.root, salt)
    }

    pub fn root(&self) -> Fr
    {
        self.root
    }

    pub fn depth(&self) -> u8
    {
        self.depth
    }

    pub fn capacity(&self) -> u64
    {
        tree_capacity(self.depth)
    }

    /// The number of leaves inserted so far.
    pub fn len(&self) -> usize
    {
        self.levels[0].len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.levels[0].is_empty()
    }

    fn node(&self, level: usize, index: usize) -> Fr
    {
        self.levels[level]
            .get(index)
            .copied()
            .unwrap_or(self.zeroes[level])
    }

    fn children(&self, level: usize, parent: usize) -> [Fr; TREE_ARITY]
    {
        let first = parent * TREE_ARITY;
        core::array::from_fn(|i| self.node(level, first + i))
    }
}

/// An inclusion proof for a single leaf of a [`QuinTree`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Proof
{
    /// The index of the leaf being proven.
    pub index: u64,

    /// The siblings at each level, from the leaf up to the root.
    pub path_elements: Vec<Siblings>,

    /// The position of the path node amongst its siblings at each level.
    pub path_indices: Vec<u8>
}

impl Proof
{
    /// Reconstruct a proof from its encoded siblings; the path positions follow from `index`.
    pub fn from_bytes(index: u64, path: &[[HashBytes; TREE_ARITY - 1]]) -> Result<Self>
    {
        let mut path_elements = Vec::with_capacity(path.len());
        let mut path_indices = Vec::with_capacity(path.len());

        let mut position = index;
        for encoded in path
        {
            let mut siblings = [Fr::zero(); TREE_ARITY - 1];
            for (sibling, bytes) in siblings.iter_mut().zip(encoded.iter())
            {
                *sibling = fr_from_bytes(bytes)?;
            }

            path_elements.push(siblings);
            path_indices.push((position % TREE_ARITY as u64) as u8);
            position /= TREE_ARITY as u64;
        }

        if position != 0
        {
            return Err(Error::IndexOutOfBounds { index, capacity: tree_capacity(path.len() as u8) });
        }

        Ok(Proof { index, path_elements, path_indices })
    }

    /// Encode the siblings as they are passed to the contracts.
    pub fn to_bytes(&self) -> Vec<[HashBytes; TREE_ARITY - 1]>
    {
        self.path_elements
            .iter()
            .map(|siblings| {
                let mut encoded = [[0u8; 32]; TREE_ARITY - 1];
                for (bytes, sibling) in encoded.iter_mut().zip(siblings.iter())
                {
                    *bytes = fr_to_bytes(sibling);
                }
                encoded
            })
            .collect()
    }

    /// Recompute the root from the leaf value this proof is claimed to cover.
    pub fn compute_root(&self, leaf: Fr) -> Result<Fr>
    {
        let mut node = leaf;
        for (siblings, &offset) in self.path_elements.iter().zip(self.path_indices.iter())
        {
            let offset = offset as usize;
            if offset >= TREE_ARITY
            {
                return Err(Error::IndexOutOfBounds {
                    index: self.index,
                    capacity: tree_capacity(self.path_elements.len() as u8)
                });
            }

            let mut children = [Fr::zero(); TREE_ARITY];
            children[..offset].copy_from_slice(&siblings[..offset]);
            children[offset] = node;
            children[offset + 1..].copy_from_slice(&siblings[offset..]);

            node = hash5(&children)?;
        }

        Ok(node)
    }

    pub fn verify(&self, leaf: Fr, root: Fr) -> Result<bool>
    {
        Ok(self.compute_root(leaf)? == root)
    }

    pub fn depth(&self) -> usize
    {
        self.path_elements.len()
    }
}

/// Build the tree over `leaves` and fold `salt` into its root.
pub fn tree_commitment(leaves: &[Fr], salt: Fr, depth: u8) -> Result<Fr>
{
    QuinTree::build(leaves, depth)?.commitment(salt)
}
