//! CLI command implementations.

pub mod calibrate;
pub mod common;
pub mod model;
pub mod run;
pub mod unmix;
pub mod version;
