//! RNG module - piece selection
//!
//! Pieces are drawn independently and uniformly: there is no bag and no
//! history, so the same kind can come up many times in a row.
//!
//! The session owns its [`PieceSource`], so a seeded source gives a fully
//! reproducible game. [`PieceSequence`] replays a fixed list for tests and
//! scripted drivers.

use crate::types::PieceKind;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Scales by the high bits; the low bits of an LCG cycle quickly.
    pub fn next_range(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }
}

/// Supplies the kind of each newly created piece
pub trait PieceSource {
    fn next_kind(&mut self) -> PieceKind;
}

/// Uniform, independent draw over the seven kinds
#[derive(Debug, Clone)]
pub struct UniformPieces {
    rng: SimpleRng,
}

impl UniformPieces {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }
}

impl Default for UniformPieces {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PieceSource for UniformPieces {
    fn next_kind(&mut self) -> PieceKind {
        PieceKind::ALL[self.rng.next_range(PieceKind::ALL.len() as u32) as usize]
    }
}

/// Cycles through a fixed list of kinds
#[derive(Debug, Clone)]
pub struct PieceSequence {
    kinds: Vec<PieceKind>,
    index: usize,
}

impl PieceSequence {
    /// Falls back to a single `O` when `kinds` is empty
    pub fn new(kinds: impl Into<Vec<PieceKind>>) -> Self {
        let mut kinds = kinds.into();
        if kinds.is_empty() {
            kinds.push(PieceKind::O);
        }
        Self { kinds, index: 0 }
    }

    /// Endless repetition of one kind
    pub fn repeat(kind: PieceKind) -> Self {
        Self::new(vec![kind])
    }
}

impl PieceSource for PieceSequence {
    fn next_kind(&mut self) -> PieceKind {
        let kind = self.kinds[self.index % self.kinds.len()];
        self.index = self.index.wrapping_add(1);
        kind
    }
}
