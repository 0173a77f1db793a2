pub mod binary;
pub mod constant;
pub mod gaussian;
pub mod sampler;

pub use binary::BinarySampler;
pub use constant::ConstantSampler;
pub use gaussian::GaussianSampler;
pub use sampler::MatrixSampler;
