//! atlasic-core: source dependency graphs and an interactive force-directed
//! layout engine.
//!
//! The crate has two halves that meet at [`CodebaseGraph`]:
//!
//! - **Generation**: walk a workspace, lexically scan JS/TS, Python, Java and
//!   Go files for imports, resolve them against the filesystem (with
//!   tsconfig-style path aliases) and emit one node per file and one link
//!   per import.
//! - **Viewing**: resolve the graph into an index arena, run a Barnes-Hut
//!   force simulation sized to the graph, and build viewport-culled,
//!   level-of-detail draw commands for a host to paint.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use atlasic_core::prelude::*;
//!
//! let graph = GraphGenerator::new("/path/to/workspace").generate_graph()?;
//! let mut view = GraphView::new(&graph, 1280.0, 800.0)?;
//! view.settle(2_000);
//! let svg = frame_to_svg(&view.render());
//! ```
//!
//! # Module Organization
//!
//! - [`scan`]: Bounded-depth file discovery with ignore patterns
//! - [`alias`]: tsconfig `paths` parsing with a string-aware JSONC sanitizer
//! - [`extract`]: Per-language import scanners and resolution
//! - [`builder`]: Fluent generator API and the parallel build
//! - [`cache`]: Graph snapshot and named JSON blobs under `.atlasic/`
//! - [`impact`]: Changed-file impact levels
//! - [`heat`]: Git touch counts over a time window
//! - [`layout`]: Index arena, quadtree, Barnes-Hut and the simulation
//! - [`render`]: Camera, color model, frame building
//! - [`viewer`]: Interaction state machine around layout and render
//! - [`error`]: Typed error handling
//!
//! # Cargo Features
//!
//! - `dot` (default): Graphviz DOT export
//! - `svg` (default): SVG serialization of rendered frames
//! - `full`: Enable all optional features

pub mod alias;
pub mod builder;
pub mod cache;
pub mod category;
pub mod config;
pub mod error;
pub mod extract;
pub mod heat;
pub mod impact;
pub mod layout;
pub mod logging;
pub mod paths;
pub mod prelude;
pub mod render;
pub mod scan;
pub mod types;
pub mod viewer;

#[cfg(feature = "dot")]
pub mod visualize;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{AtlasicError, AtlasicResult, IoResultExt};

// Graph model
pub use types::{Category, CodebaseGraph, GraphLink, GraphNode, LinkKind};

// Builder API
pub use builder::GraphGenerator;

// Configuration
pub use config::{load_config, AtlasicConfig, GeneratorOptions};

// Discovery and extraction
pub use alias::{sanitize_jsonc, PathAliases};
pub use category::categorize;
pub use extract::{extract_dependencies, ExtractContext, Language};
pub use scan::{discover_files, FileDiscoverer};

// Cache
pub use cache::{
    clear_cache, graph_cache_path, load_graph, load_json, read_graph, save_graph, save_json,
};

// Analysis
pub use heat::{compute_heat, count_touches, GitHeat};
pub use impact::{detect_impact, ImpactLevel, ImpactedNode};

// Logging
pub use logging::{init_structured_logging, log_error, log_event, log_info, log_warn};

// Layout and rendering
pub use layout::{LayoutGraph, Quadtree, Rect, Simulation, SimulationConfig, SizeTier};
pub use render::{render_frame, Camera, ColorMode, DrawCommand, Frame, HeatScores, RenderPolicy};
pub use viewer::{GraphView, HostSignal};

// Feature-gated re-exports
#[cfg(feature = "dot")]
pub use visualize::generate_dot;

#[cfg(feature = "svg")]
pub use render::frame_to_svg;
