use leak_engine::LeakSignal;

use crate::selector::Selector;

/// Ranks signals by estimated loss and keeps the top K.
pub struct TopLeaksSelector {
    pub k: usize,
}

impl Default for TopLeaksSelector {
    fn default() -> Self {
        Self { k: 10 }
    }
}

impl Selector<LeakSignal> for TopLeaksSelector {
    fn score(&self, candidate: &LeakSignal) -> f64 {
        candidate.estimated_loss_usd
    }

    fn size(&self) -> Option<usize> {
        Some(self.k)
    }
}
