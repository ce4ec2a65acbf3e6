use crate::debug_utils::DebugUtils;
use crate::physical_device::{c_str_to_string, PhysicalDevice};
use crate::surface::Surface;
use crate::VulkanError;
use ash::vk;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::Arc;

const VALIDATION_LAYER_NAME: &str = "VK_LAYER_KHRONOS_validation";

#[derive(Debug, Clone)]
pub struct AppInfo {
    pub name: String,
    pub version: [u32; 4],
}

impl AppInfo {
    pub fn new(name: &str, version: [u32; 4]) -> Self {
        Self {
            name: name.to_string(),
            version,
        }
    }

    fn packed_version(&self) -> u32 {
        vk::make_api_version(
            self.version[0],
            self.version[1],
            self.version[2],
            self.version[3],
        )
    }
}

/// Instance level debugging switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugSettings {
    pub validation_layer: bool,
    pub debug_utils: bool,
    /// Also forward info and verbose validation messages.
    pub verbose: bool,
}

pub(crate) struct AshInstance {
    pub(crate) entry: ash::Entry,
    pub(crate) core: ash::Instance,
    pub(crate) surface: ash::extensions::khr::Surface,
    debug_utils: Option<DebugUtils>,
}

impl Drop for AshInstance {
    fn drop(&mut self) {
        self.debug_utils = None;
        unsafe {
            self.core.destroy_instance(None);
        }
        trace!("Drop Instance");
    }
}

fn is_layer_available(entry: &ash::Entry, layer_name: &str) -> crate::Result<bool> {
    Ok(entry
        .enumerate_instance_layer_properties()?
        .iter()
        .any(|layer| c_str_to_string(&layer.layer_name) == layer_name))
}

fn to_c_string(string: &str) -> crate::Result<CString> {
    CString::new(string).map_err(|err| VulkanError::StringError(err.to_string()))
}

pub struct Instance {
    instance: Arc<AshInstance>,
}

impl Instance {
    pub fn new(
        engine_info: &AppInfo,
        app_info: &AppInfo,
        display_handle: Option<raw_window_handle::RawDisplayHandle>,
        debug_settings: &DebugSettings,
    ) -> crate::Result<Self> {
        let app_name = to_c_string(&app_info.name)?;
        let engine_name = to_c_string(&engine_info.name)?;

        let entry = unsafe { ash::Entry::load() }?;

        let validation_layer_name = to_c_string(VALIDATION_LAYER_NAME)?;
        let mut layer_names_raw: Vec<*const c_char> = Vec::new();
        if debug_settings.validation_layer {
            if is_layer_available(&entry, VALIDATION_LAYER_NAME)? {
                layer_names_raw.push(validation_layer_name.as_ptr());
            } else {
                warn!(
                    "{} requested but not installed, continuing without it",
                    VALIDATION_LAYER_NAME
                );
            }
        }

        let mut extension_names_raw: Vec<*const c_char> = match display_handle {
            Some(display_handle) => {
                ash_window::enumerate_required_extensions(display_handle)?.to_vec()
            }
            None => vec![ash::extensions::khr::Surface::name().as_ptr()],
        };
        if debug_settings.debug_utils {
            extension_names_raw.push(ash::extensions::ext::DebugUtils::name().as_ptr());
        }

        for &extension_name in extension_names_raw.iter() {
            debug!("Instance extension: {:?}", unsafe {
                CStr::from_ptr(extension_name)
            });
        }

        let vk_app_info = vk::ApplicationInfo::builder()
            .application_name(app_name.as_c_str())
            .application_version(app_info.packed_version())
            .engine_name(engine_name.as_c_str())
            .engine_version(engine_info.packed_version())
            .api_version(vk::API_VERSION_1_3);

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&vk_app_info)
            .enabled_layer_names(&layer_names_raw)
            .enabled_extension_names(&extension_names_raw);

        let core = unsafe { entry.create_instance(&create_info, None) }?;
        let surface = ash::extensions::khr::Surface::new(&entry, &core);

        let mut instance = AshInstance {
            entry,
            core,
            surface,
            debug_utils: None,
        };

        if debug_settings.debug_utils {
            instance.debug_utils = Some(DebugUtils::new(
                &instance.entry,
                &instance.core,
                debug_settings.verbose,
            )?);
        }

        Ok(Self {
            instance: Arc::new(instance),
        })
    }

    pub fn create_surface(
        &self,
        display_handle: raw_window_handle::RawDisplayHandle,
        window_handle: raw_window_handle::RawWindowHandle,
    ) -> crate::Result<Surface> {
        Surface::new(self.instance.clone(), display_handle, window_handle)
    }

    /// Physical devices in the order the driver reports them.
    pub fn physical_devices(&self) -> crate::Result<Vec<PhysicalDevice>> {
        Ok(unsafe { self.instance.core.enumerate_physical_devices() }?
            .into_iter()
            .map(|physical_device| PhysicalDevice::new(self.instance.clone(), physical_device))
            .collect())
    }
}
