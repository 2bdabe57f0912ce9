//! Binding strength for cell/bel, wire/net, and pip/net associations.
//!
//! Every binding the placer or router makes carries a [`Strength`] that
//! governs whether a later stage is allowed to rip it up. Strengths are
//! totally ordered; a rip-up is legal exactly when the existing binding's
//! strength is less than or equal to the threshold the caller supplies
//! (`existing <= NONE..STRONG` for the router's default threshold, for
//! instance), so eligibility is a single comparison rather than a match.

use serde::{Deserialize, Serialize};

/// How strongly a binding resists being ripped up.
///
/// Ordered `None < Weak < Strong < Fixed < Locked < User`, matching the
/// ordering `derive(PartialOrd)` gives the variants in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Strength {
    /// No binding; never observed on an actual bound entity.
    None,
    /// Freely movable by the placer or ripup-able by the router.
    Weak,
    /// Preferred stable; only ripped up when no alternative exists.
    Strong,
    /// Set by the packer (e.g. cluster placement); not ripped up by
    /// ordinary placer/router moves, only by explicit cluster legalisation.
    Fixed,
    /// Set by a constraint layer; never touched by placement or routing.
    Locked,
    /// Set directly by the user (a `BEL`/`LOC` attribute); never touched.
    User,
}

impl Strength {
    /// Returns whether a binding at `self` may be ripped up by an operation
    /// whose maximum allowed victim strength is `threshold`.
    pub fn rippable_at(self, threshold: Strength) -> bool {
        self <= threshold
    }
}

impl Default for Strength {
    fn default() -> Self {
        Strength::Weak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_matches_spec() {
        assert!(Strength::None < Strength::Weak);
        assert!(Strength::Weak < Strength::Strong);
        assert!(Strength::Strong < Strength::Fixed);
        assert!(Strength::Fixed < Strength::Locked);
        assert!(Strength::Locked < Strength::User);
    }

    #[test]
    fn rippable_threshold() {
        assert!(Strength::Weak.rippable_at(Strength::Strong));
        assert!(Strength::Strong.rippable_at(Strength::Strong));
        assert!(!Strength::Fixed.rippable_at(Strength::Strong));
        assert!(!Strength::User.rippable_at(Strength::Locked));
    }

    #[test]
    fn default_is_weak() {
        assert_eq!(Strength::default(), Strength::Weak);
    }

    #[test]
    fn locked_and_user_never_ripped_by_weak_threshold() {
        assert!(!Strength::Locked.rippable_at(Strength::Weak));
        assert!(!Strength::User.rippable_at(Strength::Weak));
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&Strength::Fixed).unwrap();
        let restored: Strength = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, Strength::Fixed);
    }
}
