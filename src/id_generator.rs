//! Monotonic ULID source for node and edge ids.
//! Ids minted within the same millisecond still sort in creation order,
//! which is what gives "later-created nodes are drawn on top" its meaning.

use std::sync::{Mutex, OnceLock};
use ulid::{Generator, Ulid};

fn generator() -> &'static Mutex<Generator> {
    static GENERATOR: OnceLock<Mutex<Generator>> = OnceLock::new();
    GENERATOR.get_or_init(|| Mutex::new(Generator::new()))
}

/// Generate the next id
pub(crate) fn next_ulid() -> Ulid {
    let mut generator = match generator().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    // Overflow only happens after 2^80 ids in one millisecond
    generator.generate().unwrap_or_else(|_| Ulid::new())
}
