//! Level-of-detail bookkeeping: which LOD a source mesh belongs to, and the
//! transition heights of the baked output LOD group.

mod classifier;
mod transition;

pub use classifier::LodClassifier;
pub use transition::output_transition_heights;
