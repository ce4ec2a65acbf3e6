use ash::vk;
use std::ffi::CStr;

pub(crate) struct DebugUtils {
    debug_utils: ash::extensions::ext::DebugUtils,
    debug_call_back: vk::DebugUtilsMessengerEXT,
}

impl DebugUtils {
    pub(crate) fn new(
        entry: &ash::Entry,
        instance: &ash::Instance,
        verbose: bool,
    ) -> ash::prelude::VkResult<Self> {
        let mut message_severity = vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
            | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR;
        if verbose {
            message_severity |= vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE;
        }

        let debug_utils_loader = ash::extensions::ext::DebugUtils::new(entry, instance);
        let debug_call_back = unsafe {
            debug_utils_loader.create_debug_utils_messenger(
                &vk::DebugUtilsMessengerCreateInfoEXT::builder()
                    .message_severity(message_severity)
                    .message_type(
                        vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                            | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                            | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
                    )
                    .pfn_user_callback(Some(vulkan_debug_callback)),
                None,
            )?
        };

        Ok(Self {
            debug_utils: debug_utils_loader,
            debug_call_back,
        })
    }
}

impl Drop for DebugUtils {
    fn drop(&mut self) {
        unsafe {
            self.debug_utils
                .destroy_debug_utils_messenger(self.debug_call_back, None);
        }
    }
}

unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::os::raw::c_void,
) -> vk::Bool32 {
    use std::borrow::Cow;
    let callback_data = *p_callback_data;
    let message = if callback_data.p_message.is_null() {
        Cow::from("")
    } else {
        CStr::from_ptr(callback_data.p_message).to_string_lossy()
    };

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE => trace!("{:?} {}", message_type, message),
        vk::DebugUtilsMessageSeverityFlagsEXT::INFO => info!("{:?} {}", message_type, message),
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => warn!("{:?} {}", message_type, message),
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => error!("{:?} {}", message_type, message),
        _ => info!("Unknown Severity {:?}: {}", message_severity, message),
    }

    vk::FALSE
}
