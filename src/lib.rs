//! Position-specific scoring matrices for motif discovery: MEME/MAST export,
//! consensus calling and JSON loading

pub mod consensus;
pub mod error;
pub mod export;
pub mod frame;
pub mod loader;
pub mod meme;
pub mod plot;
pub mod pssm;
pub mod types;

pub use pssm::Pssm;
