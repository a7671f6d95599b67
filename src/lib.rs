//! Binary vector file I/O for ANNS datasets.
//!
//! Reads and writes the flat `.ivecs` / `.fvecs` / `.bvecs` container format:
//! each record is a little-endian u32 dimension prefix followed by that many
//! fixed-width elements. Int and float files share the same byte layout, so
//! the element kind is always supplied by the caller.

pub mod codec;
pub mod dataset;
