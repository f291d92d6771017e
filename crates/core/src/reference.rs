//! Booking reference generation.

use std::collections::HashSet;

use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use tracing::trace;

/// Length of every booking reference.
pub const REFERENCE_LEN: usize = 8;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draws unique booking references from an injected random source.
///
/// Every code handed out is remembered for the lifetime of the generator, so
/// a reference is never issued twice even after its booking is released.
pub struct ReferenceGenerator {
    rng: Box<dyn RngCore + Send>,
    issued: HashSet<String>,
}

impl ReferenceGenerator {
    /// Create a generator drawing from the provided random source.
    pub fn new(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Box::new(rng),
            issued: HashSet::new(),
        }
    }

    /// Generator seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Generator with a fixed seed, yielding a reproducible sequence.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Produce a fresh reference and mark it as issued.
    pub fn generate(&mut self) -> String {
        loop {
            let candidate = self.draw();
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
            trace!(%candidate, "reference collision, drawing again");
        }
    }

    /// Whether the code has ever been handed out.
    pub fn is_issued(&self, reference: &str) -> bool {
        self.issued.contains(reference)
    }

    /// Number of codes handed out so far.
    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }

    fn draw(&mut self) -> String {
        (0..REFERENCE_LEN)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

impl Default for ReferenceGenerator {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl std::fmt::Debug for ReferenceGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceGenerator")
            .field("issued", &self.issued.len())
            .finish_non_exhaustive()
    }
}
