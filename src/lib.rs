//! Fission chain model
//!
//! Materials (fuel, waste, auxiliary catalysts) are registered in a
//! [`ReactorSimulator`] and linked into a graph of "produces" edges with
//! yield ratios. The simulator checks that every reacting material in a
//! chain has its auxiliary available and unfolds a reaction into energy,
//! disposal cost and residual materials.

pub mod error;
pub mod models;
pub mod reactor;
pub mod report;
pub mod scenario;

pub use error::ReactorError;
pub use models::{Material, MaterialId, MaterialKind, Product};
pub use reactor::ReactorSimulator;
pub use report::ReactionReport;
