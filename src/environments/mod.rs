pub mod gaussian_arm;
pub mod k_armed_environment;

pub use gaussian_arm::GaussianArm;
pub use k_armed_environment::KArmedEnvironment;
