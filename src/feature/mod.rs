//! Per-pixel measurements: Sobel gradient and local intensity descriptor.

pub mod descriptor;
pub mod gradient;

pub use descriptor::descriptor_mean;
pub use gradient::{gradient_at, Gradient};
