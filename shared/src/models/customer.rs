//! Customer Profile Model

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A customer's favorited establishments
///
/// The favorites set is a join relation: neither the customer nor the
/// establishment owns it exclusively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_id: String,
    pub favorites: BTreeSet<String>,
}

impl CustomerProfile {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            favorites: BTreeSet::new(),
        }
    }

    pub fn is_favorite(&self, establishment_id: &str) -> bool {
        self.favorites.contains(establishment_id)
    }

    /// Returns `true` if the establishment was not already a favorite
    pub fn add_favorite(&mut self, establishment_id: impl Into<String>) -> bool {
        self.favorites.insert(establishment_id.into())
    }

    pub fn remove_favorite(&mut self, establishment_id: &str) -> bool {
        self.favorites.remove(establishment_id)
    }

    /// Flip favorite state, returning the new state
    pub fn toggle_favorite(&mut self, establishment_id: &str) -> bool {
        if self.remove_favorite(establishment_id) {
            false
        } else {
            self.add_favorite(establishment_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_favorite() {
        let mut profile = CustomerProfile::new("C1");
        assert!(profile.toggle_favorite("E1"));
        assert!(profile.is_favorite("E1"));
        assert!(!profile.toggle_favorite("E1"));
        assert!(profile.favorites.is_empty());
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut profile = CustomerProfile::new("C1");
        assert!(profile.add_favorite("E2"));
        assert!(!profile.add_favorite("E2"));
        assert_eq!(profile.favorites.len(), 1);
    }
}
