//! # Receita
//!
//! Umbrella crate re-exporting the receita core engine and training workflow.

pub use receita_core::*;

pub mod trainer {
    pub use receita_trainer::*;
}
