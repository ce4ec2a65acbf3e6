use crate::instance::AshInstance;
use ash::vk;
use std::sync::Arc;

/// A presentation surface created from a window. Destroyed on drop, before its instance.
pub struct Surface {
    instance: Arc<AshInstance>,
    handle: vk::SurfaceKHR,
}

impl Surface {
    pub(crate) fn new(
        instance: Arc<AshInstance>,
        display_handle: raw_window_handle::RawDisplayHandle,
        window_handle: raw_window_handle::RawWindowHandle,
    ) -> crate::Result<Self> {
        let handle = unsafe {
            ash_window::create_surface(
                &instance.entry,
                &instance.core,
                display_handle,
                window_handle,
                None,
            )
        }?;

        Ok(Self { instance, handle })
    }

    pub fn handle(&self) -> vk::SurfaceKHR {
        self.handle
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        unsafe {
            self.instance.surface.destroy_surface(self.handle, None);
        }
        trace!("Drop Surface");
    }
}
