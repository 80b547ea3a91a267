//! Per-frame processing stages.
//!
//! The stream controller runs these in a fixed order for every frame:
//! resize -> oracle -> accumulate -> refine -> composite. Each stage is a pure
//! function of its inputs; all state lives with the stream controller.

pub mod accumulate;
pub mod classify;
pub mod morphology;
pub mod overlay;
pub mod resize;

pub use accumulate::{accumulate_masks, MIN_AREA_FRACTION};
pub use classify::{classify_mask, Category};
pub use morphology::{close, closing_kernel_size};
pub use overlay::{composite_overlay, TINT_RGB};
pub use resize::{apply_resize, plan_resize, ResizePlan, MAX_DIM};
