//! The potato collection served by the service.
//!
//! The catalog owns an immutable seed collection and hands every request its
//! own snapshot, so ordering and pagination never observe another request's
//! work.

use spud_tonic_core::proto::Potato;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct Catalog {
    potatoes: Arc<[Potato]>,
}

impl Catalog {
    pub fn new(potatoes: impl Into<Arc<[Potato]>>) -> Self {
        Self {
            potatoes: potatoes.into(),
        }
    }

    /// The built-in demo potatoes.
    pub fn sample() -> Self {
        Self::new([
            potato("1", "Potato 456", 1),
            potato("2", "Potato 123", 42),
            potato("3", "Big Potato", 666),
            potato("4", "Summer Potato", 10),
        ])
    }

    /// A fresh copy of every potato, in catalog order.
    pub fn snapshot(&self) -> Vec<Potato> {
        self.potatoes.to_vec()
    }

    pub fn find(&self, id: &str) -> Option<Potato> {
        self.potatoes.iter().find(|p| p.id == id).cloned()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::sample()
    }
}

pub fn potato(id: &str, name: &str, size: i32) -> Potato {
    Potato {
        id: id.to_string(),
        name: name.to_string(),
        size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshots_are_independent() {
        let catalog = Catalog::sample();
        let mut first = catalog.snapshot();
        first.reverse();
        first[0].name.clear();

        let second = catalog.snapshot();
        assert_eq!(second[0].id, "1");
        assert_eq!(second[3].name, "Summer Potato");
    }

    #[test]
    fn finds_by_id() {
        let catalog = Catalog::sample();
        assert_eq!(catalog.find("3").unwrap().name, "Big Potato");
        assert!(catalog.find("5").is_none());
    }
}
