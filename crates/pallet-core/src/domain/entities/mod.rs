pub mod common;
pub mod descriptor;
pub mod lifecycle;
pub mod manifest;
pub mod recipe;
pub mod staged;

pub use common::*;
pub use descriptor::*;
pub use lifecycle::*;
pub use manifest::*;
pub use recipe::*;
pub use staged::*;
