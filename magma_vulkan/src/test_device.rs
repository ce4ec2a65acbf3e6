//! In-memory devices for exercising selection without a Vulkan driver. Surfaces are plain ids.

use crate::capability::DeviceQuery;
use crate::physical_device::{DeviceProperties, PhysicalDeviceType, PhysicalDeviceVendor};
use ash::vk;
use std::cell::RefCell;

#[derive(Clone, Debug)]
enum PresentSupport {
    Never,
    Always,
    Surfaces(Vec<u32>),
}

#[derive(Clone, Debug)]
pub struct TestQueueFamily {
    flags: vk::QueueFlags,
    present: PresentSupport,
}

impl TestQueueFamily {
    pub fn graphics_present() -> Self {
        Self {
            flags: vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER,
            present: PresentSupport::Always,
        }
    }

    pub fn graphics() -> Self {
        Self {
            flags: vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER,
            present: PresentSupport::Never,
        }
    }

    pub fn present_only() -> Self {
        Self {
            flags: vk::QueueFlags::COMPUTE,
            present: PresentSupport::Always,
        }
    }

    pub fn transfer() -> Self {
        Self {
            flags: vk::QueueFlags::TRANSFER,
            present: PresentSupport::Never,
        }
    }

    pub fn presenting_to(mut self, surfaces: &[u32]) -> Self {
        self.present = PresentSupport::Surfaces(surfaces.to_vec());
        self
    }
}

#[derive(Clone, Debug)]
pub struct TestDevice {
    properties: DeviceProperties,
    extensions: Vec<String>,
    surface_formats: Vec<vk::SurfaceFormatKHR>,
    present_modes: Vec<vk::PresentModeKHR>,
    queue_families: Vec<TestQueueFamily>,
}

impl TestDevice {
    /// A discrete GPU exposing `VK_KHR_swapchain`, one surface format and FIFO present mode,
    /// with no queue families.
    pub fn new(name: &str) -> Self {
        Self {
            properties: DeviceProperties {
                name: name.to_string(),
                device_id: 0,
                vendor: PhysicalDeviceVendor::Unknown { vendor_id: 0 },
                device_type: PhysicalDeviceType::Discrete,
                api_version: [0, 1, 3, 0],
                driver_version: String::from("1.0.0"),
                device_local_bytes: 0,
            },
            extensions: vec![String::from("VK_KHR_swapchain")],
            surface_formats: vec![vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            }],
            present_modes: vec![vk::PresentModeKHR::FIFO],
            queue_families: Vec::new(),
        }
    }

    /// Shorthand for a device that passes the standard requirements, with its only qualifying
    /// queue family at index 0.
    pub fn suitable(name: &str) -> Self {
        Self::new(name).with_queue_family(TestQueueFamily::graphics_present())
    }

    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|name| name.to_string()).collect();
        self
    }

    pub fn with_surface_formats(mut self, surface_formats: Vec<vk::SurfaceFormatKHR>) -> Self {
        self.surface_formats = surface_formats;
        self
    }

    pub fn with_present_modes(mut self, present_modes: Vec<vk::PresentModeKHR>) -> Self {
        self.present_modes = present_modes;
        self
    }

    pub fn with_queue_family(mut self, queue_family: TestQueueFamily) -> Self {
        self.queue_families.push(queue_family);
        self
    }

    pub fn with_device_type(mut self, device_type: PhysicalDeviceType) -> Self {
        self.properties.device_type = device_type;
        self
    }

    pub fn with_device_local_bytes(mut self, bytes: u64) -> Self {
        self.properties.device_local_bytes = bytes;
        self
    }

    pub fn name(&self) -> &str {
        &self.properties.name
    }
}

impl DeviceQuery for TestDevice {
    type Surface = u32;

    fn properties(&self) -> DeviceProperties {
        self.properties.clone()
    }

    fn extension_names(&self) -> Vec<String> {
        self.extensions.clone()
    }

    fn queue_family_properties(&self) -> Vec<vk::QueueFamilyProperties> {
        self.queue_families
            .iter()
            .map(|queue_family| vk::QueueFamilyProperties {
                queue_flags: queue_family.flags,
                queue_count: 1,
                ..Default::default()
            })
            .collect()
    }

    fn surface_formats(&self, _surface: &u32) -> Vec<vk::SurfaceFormatKHR> {
        self.surface_formats.clone()
    }

    fn surface_present_modes(&self, _surface: &u32) -> Vec<vk::PresentModeKHR> {
        self.present_modes.clone()
    }

    fn surface_support(&self, queue_family_index: u32, surface: &u32) -> bool {
        match &self.queue_families[queue_family_index as usize].present {
            PresentSupport::Never => false,
            PresentSupport::Always => true,
            PresentSupport::Surfaces(surfaces) => surfaces.contains(surface),
        }
    }
}

thread_local! {
    static CAPTURED_LINES: RefCell<Vec<String>> = RefCell::new(Vec::new());
}

/// Records log lines per thread, so tests running in parallel only see their own output.
struct CapturingLogger;

impl log::Log for CapturingLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        CAPTURED_LINES.with(|lines| lines.borrow_mut().push(record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger;

/// Runs `f` and returns its result with every log line it emitted on this thread.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    // Only the first call installs the logger, later ones find it already set
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log::LevelFilter::Trace);

    CAPTURED_LINES.with(|lines| lines.borrow_mut().clear());
    let result = f();
    let lines = CAPTURED_LINES.with(|lines| lines.borrow_mut().drain(..).collect());
    (result, lines)
}
