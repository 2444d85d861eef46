//! Domain models.

mod appointment;
mod branch;
mod record;
mod staff;

pub use appointment::*;
pub use branch::*;
pub use record::*;
pub use staff::*;
