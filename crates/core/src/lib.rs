//! Core library for foilkit
//!
//! This crate implements the **Functional Core** of the foilkit application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The foilkit project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`foilkit_core`** (this crate): Pure transformation functions with zero I/O
//! - **`foilkit`**: HTTP, filesystem and solver process orchestration (the Imperative Shell)
//!
//! All functions in this crate take text or values and return values. Reading
//! coordinate files, talking to XFOIL and writing archives happens in the
//! shell, which makes everything here testable with plain fixture strings.
//!
//! # Module Organization
//!
//! - [`coords`]: Parsing airfoil coordinate files into points
//! - [`normalize`]: Reordering surfaces into solver winding and rendering canonical files
//! - [`xfoil`]: The solver command script and polar log parsing
//! - [`archive`]: Per-airfoil records combining geometry and coefficients
//! - [`scrape`]: HTML extraction and file name sanitization for the downloaders
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use foilkit_core::normalize::{convert_to_canonical, SplitStrategy};
//!
//! let raw = std::fs::read_to_string("airfoils/origin/naca0012.dat")?;
//! let canonical = convert_to_canonical(&raw, "naca0012", SplitStrategy::Midpoint)?;
//!
//! assert!(canonical.text.starts_with(&canonical.name));
//! ```

pub mod archive;
pub mod coords;
pub mod normalize;
pub mod scrape;
pub mod xfoil;
