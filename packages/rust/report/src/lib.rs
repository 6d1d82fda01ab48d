//! Paginated satisfaction-survey report generation.
//!
//! [`render_survey_report`] turns structured survey data into a themed,
//! multi-page A4 PDF held entirely in memory. Page chrome (wordmarks and
//! footer address) comes from a [`DocTheme`] so alternate layouts are a
//! data change, not a code path.

pub mod generator;
pub mod theme;

pub use generator::render_survey_report;
pub use theme::DocTheme;
