//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use atlasic_core::prelude::*;
//! ```

// Core types
pub use crate::error::{AtlasicError, AtlasicResult};
pub use crate::types::{Category, CodebaseGraph, GraphLink, GraphNode};

// Generation
pub use crate::builder::GraphGenerator;
pub use crate::config::{load_config, AtlasicConfig, GeneratorOptions};

// Caching
pub use crate::cache::{load_graph, save_graph};

// Analysis
pub use crate::heat::compute_heat;
pub use crate::impact::{detect_impact, ImpactLevel};

// Viewing
pub use crate::render::{ColorMode, Frame, HeatScores};
pub use crate::viewer::{GraphView, HostSignal, SearchKey};

#[cfg(feature = "dot")]
pub use crate::visualize::generate_dot;

#[cfg(feature = "svg")]
pub use crate::render::frame_to_svg;
