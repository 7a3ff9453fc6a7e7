//! Graph construction and representation

pub mod builder;
pub mod cooccurrence;
pub mod csr;
pub mod expansion;
