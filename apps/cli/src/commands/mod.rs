pub mod catalog;
pub mod dna;
pub mod generator;
pub mod parts;
pub mod protein;

use seqforge_core::SelectionMode;

pub(crate) fn selection_mode(maximize: bool) -> SelectionMode {
    if maximize {
        SelectionMode::Maximum
    } else {
        SelectionMode::Stochastic
    }
}
