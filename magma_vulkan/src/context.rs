use crate::capability::DeviceQuery;
use crate::device::Device;
use crate::instance::{AppInfo, DebugSettings, Instance};
use crate::physical_device::PhysicalDevice;
use crate::selector::{DeviceSelector, Selection, SelectionError};
use crate::surface::Surface;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};

pub struct ContextSettings {
    pub engine: AppInfo,
    pub app: AppInfo,
    pub debug: DebugSettings,
}

/// An instance, a surface for one window and the physical devices that could present to it.
///
/// Fields drop in declaration order, so the surface goes before the instance.
pub struct WindowTarget {
    physical_devices: Vec<PhysicalDevice>,
    surface: Surface,
    instance: Instance,
}

impl WindowTarget {
    pub fn new<W: HasRawWindowHandle + HasRawDisplayHandle>(
        window: &W,
        settings: &ContextSettings,
    ) -> crate::Result<Self> {
        let instance = Instance::new(
            &settings.engine,
            &settings.app,
            Some(window.raw_display_handle()),
            &settings.debug,
        )?;

        let surface =
            instance.create_surface(window.raw_display_handle(), window.raw_window_handle())?;

        let physical_devices = instance.physical_devices()?;
        for physical_device in physical_devices.iter() {
            let properties = physical_device.properties();
            info!(
                "Found {:?} device {} (driver {})",
                properties.device_type, properties.name, properties.driver_version
            );
        }

        Ok(Self {
            physical_devices,
            surface,
            instance,
        })
    }

    pub fn physical_devices(&self) -> &[PhysicalDevice] {
        &self.physical_devices
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn select(
        &self,
        selector: &DeviceSelector,
    ) -> Result<Selection<'_, PhysicalDevice>, SelectionError> {
        selector.select(&self.physical_devices, &self.surface)
    }
}

/// A window target plus the logical device created on the selected physical device.
///
/// The device is declared first so it is destroyed before the surface and instance.
pub struct GraphicsContext {
    device: Device,
    physical_device: PhysicalDevice,
    // Owns the surface and instance the device was created against
    #[allow(dead_code)]
    target: WindowTarget,
}

impl GraphicsContext {
    /// Creates the logical device with exactly the extensions the selector's checker requires.
    pub fn new<W: HasRawWindowHandle + HasRawDisplayHandle>(
        window: &W,
        settings: &ContextSettings,
        selector: &DeviceSelector,
    ) -> crate::Result<Self> {
        let target = WindowTarget::new(window, settings)?;

        let (physical_device, queue_family_index) = {
            let selection = target.select(selector)?;
            (selection.device.clone(), selection.queue_family_index)
        };

        let device = Device::new(
            &physical_device,
            queue_family_index,
            selector.checker().required_extensions(),
        )?;

        Ok(Self {
            device,
            physical_device,
            target,
        })
    }

    pub fn physical_device(&self) -> &PhysicalDevice {
        &self.physical_device
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}
