//! Pipeline stages, leaf first. Offline stages are plain functions over
//! record slices; network stages work one record at a time and are driven by
//! [`crate::RosterSleuth`].

pub mod assembly;
pub mod dedup;
pub mod emails;
pub mod employment;
pub mod io;
pub mod loader;
pub mod osint;
pub mod quality;
pub mod resolver;
pub mod seniority;
