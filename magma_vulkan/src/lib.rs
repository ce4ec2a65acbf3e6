mod capability;
mod compatibility;
mod context;
mod debug_utils;
mod device;
mod instance;
mod physical_device;
mod selector;
mod surface;

#[cfg(test)]
mod test_device;

pub use capability::*;
pub use compatibility::*;
pub use context::*;
pub use device::*;
pub use instance::*;
pub use physical_device::*;
pub use selector::*;
pub use surface::*;

pub use ash;
pub use ash::vk;

#[macro_use]
extern crate log;

#[derive(thiserror::Error, Debug)]
pub enum VulkanError {
    #[error("Vk error: {0}")]
    Vk(#[from] vk::Result),

    #[error("Failed to load vulkan: {0}")]
    Loading(#[from] ash::LoadingError),

    #[error("Device selection failed: {0}")]
    Selection(#[from] SelectionError),

    #[error("Error: {0}")]
    StringError(String),
}

pub type Result<T> = std::result::Result<T, VulkanError>;
