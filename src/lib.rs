//! Management helpers for an e-paper sign showing Hong Kong transport ETAs.
//!
//! - [`ui`]: loading overlay, form serialization and small formatting helpers
//! - [`forms`]: typed management forms built from serialized form data
//! - [`config`]: application and site configuration
//! - [`epd`]: supported e-paper displays and layouts
//! - [`eta`]: transport companies, directions, locales and ETA formats

pub mod config;
pub mod epd;
pub mod eta;
pub mod forms;
pub mod ui;
