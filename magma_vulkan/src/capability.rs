use crate::physical_device::DeviceProperties;
use ash::vk;
use std::collections::HashSet;

/// The read-only queries device selection needs from a physical device.
///
/// Implemented by [`PhysicalDevice`](crate::PhysicalDevice) on top of ash, and by
/// in-memory devices in tests.
pub trait DeviceQuery {
    type Surface: ?Sized;

    fn properties(&self) -> DeviceProperties;
    fn extension_names(&self) -> Vec<String>;
    fn queue_family_properties(&self) -> Vec<vk::QueueFamilyProperties>;
    fn surface_formats(&self, surface: &Self::Surface) -> Vec<vk::SurfaceFormatKHR>;
    fn surface_present_modes(&self, surface: &Self::Surface) -> Vec<vk::PresentModeKHR>;
    fn surface_support(&self, queue_family_index: u32, surface: &Self::Surface) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamily {
    pub index: u32,
    pub flags: vk::QueueFlags,
    pub queue_count: u32,
    pub supports_present: bool,
}

impl QueueFamily {
    pub fn supports_graphics(&self) -> bool {
        self.flags.contains(vk::QueueFlags::GRAPHICS)
    }
}

/// Everything selection needs to know about one device, queried against one surface.
#[derive(Debug, Clone)]
pub struct CapabilitySnapshot {
    pub properties: DeviceProperties,
    pub extensions: HashSet<String>,
    pub surface_formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
    pub queue_families: Vec<QueueFamily>,
}

impl CapabilitySnapshot {
    /// Queries `device` for its capabilities against `surface`. Nothing is cached, each call
    /// goes back to the device.
    pub fn capture<D: DeviceQuery + ?Sized>(device: &D, surface: &D::Surface) -> Self {
        let queue_families = device
            .queue_family_properties()
            .iter()
            .enumerate()
            .map(|(index, properties)| {
                let index = index as u32;
                QueueFamily {
                    index,
                    flags: properties.queue_flags,
                    queue_count: properties.queue_count,
                    supports_present: device.surface_support(index, surface),
                }
            })
            .collect();

        Self {
            properties: device.properties(),
            extensions: device.extension_names().into_iter().collect(),
            surface_formats: device.surface_formats(surface),
            present_modes: device.surface_present_modes(surface),
            queue_families,
        }
    }

    pub fn supports_extension(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }

    /// First queue family, in device order, that can both render and present.
    ///
    /// Families that only do one of the two are skipped rather than disqualifying the device.
    pub fn graphics_present_queue_family(&self) -> Option<u32> {
        self.queue_families
            .iter()
            .find(|queue_family| queue_family.supports_graphics() && queue_family.supports_present)
            .map(|queue_family| queue_family.index)
    }
}
