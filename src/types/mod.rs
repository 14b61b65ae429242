//! Shared IEC 60870-5 data types.
//!
//! - `primitive` - Fixed-point values, bitstrings, step positions, qualifiers
//! - `quality` - Quality descriptor octets
//! - `time` - CP24/CP32/CP56 time tags
//! - `Cause` - Cause of transmission
//! - `Asdu` - Application Service Data Unit and information objects

mod asdu;
mod cot;
pub mod primitive;
mod quality;
mod time;

pub use asdu::*;
pub use cot::*;
pub use primitive::{Bitstring32, CommandQualifier, DoublePointValue, SetpointQualifier, StepPosition};
pub use quality::*;
pub use time::*;
