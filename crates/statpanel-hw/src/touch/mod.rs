//! Touch panel module.
//!
//! CST816D capacitive touch controller over I2C, and the mapping from raw
//! panel coordinates to UI space and navigation zones.

mod device;
pub mod mapper;

pub use device::{Cst816d, TouchConfig, TouchSample};
pub use mapper::{classify_zone, CoordinateMapper, MirrorConvention, Zone};
