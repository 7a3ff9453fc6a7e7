//! Keyphrase assembly and result cleaning

pub mod assembler;
pub mod candidate;
pub mod cleaner;
