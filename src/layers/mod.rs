pub mod active;
pub mod animation;
pub mod marker;
pub mod reconcile;

pub use active::{legend_for, ActiveLayer, LayerState, LayerTransition, LegendPanel};
pub use animation::FlyToAnimation;
pub use marker::{IntensityTier, MarkerStyle, StrikeMarker};
pub use reconcile::{MarkerReconciler, ReconcileOutcome, RenderedMarker};
