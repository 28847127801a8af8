//! Gaussian kernel generation and blur convolution.

pub mod blur;
pub mod gaussian;

pub use blur::gaussian_blur;
pub use gaussian::GaussianKernel;
