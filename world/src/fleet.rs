//! Roster bookkeeping and the pre-flight gate.

use taxiway_core::CraftId;

/// Ordered roster plus the pre-flight flag.
///
/// The flag is `true` from construction until the start signal is issued and
/// is never set again for the lifetime of this fleet; a world reset builds a
/// fresh fleet.
#[derive(Clone, Debug)]
pub(crate) struct Fleet {
    roster: Vec<CraftId>,
    pre_flight: bool,
}

impl Fleet {
    pub(crate) fn new() -> Self {
        Self {
            roster: Vec::new(),
            pre_flight: true,
        }
    }

    pub(crate) fn enlist(&mut self, craft: CraftId) {
        if !self.roster.contains(&craft) {
            self.roster.push(craft);
        }
    }

    pub(crate) fn discharge(&mut self, craft: CraftId) {
        self.roster.retain(|member| *member != craft);
    }

    pub(crate) fn roster(&self) -> &[CraftId] {
        &self.roster
    }

    pub(crate) fn is_pre_flight(&self) -> bool {
        self.pre_flight
    }

    /// Clears the pre-flight flag, reporting whether it was still set.
    pub(crate) fn end_pre_flight(&mut self) -> bool {
        let was_pre_flight = self.pre_flight;
        self.pre_flight = false;
        was_pre_flight
    }
}
