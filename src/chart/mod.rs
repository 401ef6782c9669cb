/// Chart layer: requests, the builder registry and plot-ready artifacts.
///
/// ```text
///   ChartRequest ──► ChartRegistry::validate ──► Bound
///                                                 │
///                      FilteredView (non-empty) ──┤
///                                                 ▼
///                                           builder fn ──► ChartArtifact
/// ```
///
/// Drawing the artifacts is the job of `ui::plot`; nothing here touches egui.

pub mod artifact;
pub mod builders;
pub mod correlation;
pub mod registry;
pub mod request;

pub use artifact::ChartArtifact;
pub use registry::ChartRegistry;
pub use request::{ChartKind, ChartRequest, Slot, DEFAULT_BINS, MAX_BINS};
