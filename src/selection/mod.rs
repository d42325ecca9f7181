pub mod orchestrator;
pub mod session;
pub mod shuffle;
pub mod variation;

pub use orchestrator::{SelectionOrchestrator, SelectionRequest};
pub use session::SessionSet;
pub use shuffle::{shuffle_keeping_marked, shuffle_options};
pub use variation::{VariationEngine, VariationLevel};
