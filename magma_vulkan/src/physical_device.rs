use crate::capability::DeviceQuery;
use crate::instance::AshInstance;
use crate::surface::Surface;
use ash::vk;
use std::ffi::{c_char, CStr};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

pub(crate) fn c_str_to_string(c_str: &[c_char]) -> String {
    unsafe {
        CStr::from_ptr(c_str.as_ptr())
            .to_string_lossy()
            .into_owned()
    }
}

fn sum_memory_heaps(
    memory_heaps: &[vk::MemoryHeap],
    contains_flags: vk::MemoryHeapFlags,
    exclude_flags: vk::MemoryHeapFlags,
) -> u64 {
    memory_heaps
        .iter()
        .filter(|&memory_heap| {
            memory_heap.flags.contains(contains_flags)
                && !memory_heap.flags.intersects(exclude_flags)
        })
        .map(|&memory_heap| memory_heap.size)
        .sum()
}

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq)]
pub enum PhysicalDeviceVendor {
    Amd,
    Arm,
    ImgTec,
    Intel,
    Nvidia,
    Qualcomm,
    Broadcom,
    Unknown { vendor_id: u32 },
}

impl PhysicalDeviceVendor {
    pub fn from_vulkan(vendor_id: u32) -> Self {
        match vendor_id {
            0x1002 => Self::Amd,
            0x10DE => Self::Nvidia,
            0x8086 => Self::Intel,
            0x1010 => Self::ImgTec,
            0x13B5 => Self::Arm,
            0x5143 => Self::Qualcomm,
            0x14E4 => Self::Broadcom,
            vendor_id => Self::Unknown { vendor_id },
        }
    }
}

#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq)]
pub enum PhysicalDeviceType {
    Discrete,
    Integrated,
    Virtual,
    Cpu,
    Other,
}

impl PhysicalDeviceType {
    pub fn from_vulkan(device_type: vk::PhysicalDeviceType) -> Self {
        match device_type {
            vk::PhysicalDeviceType::DISCRETE_GPU => Self::Discrete,
            vk::PhysicalDeviceType::INTEGRATED_GPU => Self::Integrated,
            vk::PhysicalDeviceType::VIRTUAL_GPU => Self::Virtual,
            vk::PhysicalDeviceType::CPU => Self::Cpu,
            _ => Self::Other,
        }
    }
}

fn get_driver_version(driver_version: u32, vendor: PhysicalDeviceVendor) -> String {
    match vendor {
        #[cfg(target_os = "windows")]
        PhysicalDeviceVendor::Intel => {
            format!("{}.{}", (driver_version >> 14), driver_version & 0x3fff)
        }
        PhysicalDeviceVendor::Nvidia => {
            format!(
                "{}.{}.{}.{}",
                (driver_version >> 22) & 0x3ff,
                (driver_version >> 14) & 0x0ff,
                (driver_version >> 6) & 0x0ff,
                driver_version & 0x003f
            )
        }
        _ => {
            format!(
                "{}.{}.{}",
                driver_version >> 22,
                (driver_version >> 12) & 0x3ff,
                driver_version & 0xfff,
            )
        }
    }
}

/// Identity and size of a physical device, used for diagnostics and scoring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceProperties {
    pub name: String,
    pub device_id: u32,
    pub vendor: PhysicalDeviceVendor,
    pub device_type: PhysicalDeviceType,
    pub api_version: [u32; 4],
    pub driver_version: String,
    pub device_local_bytes: u64,
}

/// A Vulkan physical device enumerated from an [`Instance`](crate::Instance).
///
/// Holds a reference to the parent instance so the handle stays valid as long as this
/// value is alive.
#[derive(Clone)]
pub struct PhysicalDevice {
    pub(crate) instance: Arc<AshInstance>,
    pub(crate) handle: vk::PhysicalDevice,
    properties: DeviceProperties,
}

impl PhysicalDevice {
    pub(crate) fn new(instance: Arc<AshInstance>, physical_device: vk::PhysicalDevice) -> Self {
        let device_properties = unsafe {
            instance
                .core
                .get_physical_device_properties(physical_device)
        };

        let device_memory = unsafe {
            instance
                .core
                .get_physical_device_memory_properties(physical_device)
        };
        let memory_heaps = &device_memory.memory_heaps[0..device_memory.memory_heap_count as usize];

        let vendor = PhysicalDeviceVendor::from_vulkan(device_properties.vendor_id);
        let properties = DeviceProperties {
            name: c_str_to_string(&device_properties.device_name),
            device_id: device_properties.device_id,
            vendor,
            device_type: PhysicalDeviceType::from_vulkan(device_properties.device_type),
            api_version: [
                vk::api_version_variant(device_properties.api_version),
                vk::api_version_major(device_properties.api_version),
                vk::api_version_minor(device_properties.api_version),
                vk::api_version_patch(device_properties.api_version),
            ],
            driver_version: get_driver_version(device_properties.driver_version, vendor),
            device_local_bytes: sum_memory_heaps(
                memory_heaps,
                vk::MemoryHeapFlags::DEVICE_LOCAL,
                vk::MemoryHeapFlags::empty(),
            ),
        };

        Self {
            instance,
            handle: physical_device,
            properties,
        }
    }

    pub fn name(&self) -> &str {
        &self.properties.name
    }
}

impl DeviceQuery for PhysicalDevice {
    type Surface = Surface;

    fn properties(&self) -> DeviceProperties {
        self.properties.clone()
    }

    fn extension_names(&self) -> Vec<String> {
        match unsafe {
            self.instance
                .core
                .enumerate_device_extension_properties(self.handle)
        } {
            Ok(extensions) => extensions
                .iter()
                .map(|extension| c_str_to_string(&extension.extension_name))
                .collect(),
            Err(err) => {
                error!("vkEnumerateDeviceExtensionProperties failed: {}", err);
                Vec::new()
            }
        }
    }

    fn queue_family_properties(&self) -> Vec<vk::QueueFamilyProperties> {
        unsafe {
            self.instance
                .core
                .get_physical_device_queue_family_properties(self.handle)
        }
    }

    fn surface_formats(&self, surface: &Surface) -> Vec<vk::SurfaceFormatKHR> {
        unsafe {
            self.instance
                .surface
                .get_physical_device_surface_formats(self.handle, surface.handle())
        }
        .unwrap_or_else(|err| {
            error!("vkGetPhysicalDeviceSurfaceFormatsKHR failed: {}", err);
            Vec::new()
        })
    }

    fn surface_present_modes(&self, surface: &Surface) -> Vec<vk::PresentModeKHR> {
        unsafe {
            self.instance
                .surface
                .get_physical_device_surface_present_modes(self.handle, surface.handle())
        }
        .unwrap_or_else(|err| {
            error!("vkGetPhysicalDeviceSurfacePresentModesKHR failed: {}", err);
            Vec::new()
        })
    }

    fn surface_support(&self, queue_family_index: u32, surface: &Surface) -> bool {
        match unsafe {
            self.instance.surface.get_physical_device_surface_support(
                self.handle,
                queue_family_index,
                surface.handle(),
            )
        } {
            Ok(supported) => supported,
            Err(err) => {
                error!("vkGetPhysicalDeviceSurfaceSupportKHR failed: {}", err);
                false
            }
        }
    }
}

impl Debug for PhysicalDevice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicalDevice")
            .field("handle", &self.handle)
            .field("properties", &self.properties)
            .finish()
    }
}
