/// Kernel builders for the filtering operations.
pub mod kernels;

mod ops;
pub use ops::{gaussian_blur, laplacian, spatial_gradient, GradientKind};

mod separable_filter;
pub use separable_filter::separable_filter;
