//! Paginated rendering and export of sleep-study reports.
//!
//! A [`record::PatientRecord`] is flattened into [`render::RenderInstruction`]s, laid out onto
//! fixed-size pages by [`render::render`], and written out by one of the
//! [`writer::DocumentWriter`]s. [`report`] ties the pieces to a [`session::Session`] and a
//! [`store::RecordStore`].

pub mod builder;
pub mod chart;
pub mod config;
pub mod error;
pub mod fonts;
pub mod label;
pub mod layout;
pub mod record;
pub mod render;
pub mod report;
pub mod session;
pub mod store;
pub mod table;
pub mod writer;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use error::{LayoutError, ReportError};
pub use layout::PageLayout;
pub use render::{render, Emphasis, PositionedLine, RenderInstruction};
