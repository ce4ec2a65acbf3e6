use crate::instance::AshInstance;
use crate::physical_device::PhysicalDevice;
use crate::VulkanError;
use ash::vk;
use std::ffi::CString;
use std::sync::Arc;

#[derive(Copy, Clone, Debug)]
pub struct AshQueue {
    pub family_index: u32,
    pub handle: vk::Queue,
}

/// A logical device with a single queue from the selected graphics and present family.
pub struct Device {
    // Keeps the instance alive until the device is destroyed
    #[allow(dead_code)]
    instance: Arc<AshInstance>,
    core: ash::Device,
    queue: AshQueue,
}

impl Device {
    pub fn new(
        physical_device: &PhysicalDevice,
        queue_family_index: u32,
        extensions: &[String],
    ) -> crate::Result<Self> {
        let instance = physical_device.instance.clone();

        let extension_names = extensions
            .iter()
            .map(|extension| CString::new(extension.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| VulkanError::StringError(err.to_string()))?;
        let extension_names_raw: Vec<_> = extension_names
            .iter()
            .map(|extension| extension.as_ptr())
            .collect();

        let queue_create_infos = [vk::DeviceQueueCreateInfo::builder()
            .queue_family_index(queue_family_index)
            .queue_priorities(&[1.0])
            .build()];

        let device_features = vk::PhysicalDeviceFeatures::default();

        let core = unsafe {
            instance.core.create_device(
                physical_device.handle,
                &vk::DeviceCreateInfo::builder()
                    .queue_create_infos(&queue_create_infos)
                    .enabled_extension_names(&extension_names_raw)
                    .enabled_features(&device_features),
                None,
            )
        }?;

        let queue = AshQueue {
            family_index: queue_family_index,
            handle: unsafe { core.get_device_queue(queue_family_index, 0) },
        };

        info!(
            "Created device on {} with queue family {}",
            physical_device.name(),
            queue_family_index
        );

        Ok(Self {
            instance,
            core,
            queue,
        })
    }

    pub fn queue(&self) -> AshQueue {
        self.queue
    }

    pub fn wait_idle(&self) -> crate::Result<()> {
        Ok(unsafe { self.core.device_wait_idle() }?)
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        unsafe {
            self.core.destroy_device(None);
        }
        trace!("Drop Device");
    }
}
