use crate::capability::CapabilitySnapshot;

/// Outcome of one requirement against one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(Vec<String>),
}

impl Verdict {
    pub fn fail(reason: impl Into<String>) -> Self {
        Self::Fail(vec![reason.into()])
    }
}

const UNSPECIFIED_FAILURE: &str = "requirement failed";

pub type RequirementTest = Box<dyn Fn(&CapabilitySnapshot) -> Verdict>;

pub struct Requirement {
    name: String,
    test: RequirementTest,
}

impl Requirement {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evaluate(&self, snapshot: &CapabilitySnapshot) -> Verdict {
        (self.test)(snapshot)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementFailure {
    pub requirement: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatibilityReport {
    pub failures: Vec<RequirementFailure>,
}

impl CompatibilityReport {
    pub fn is_compatible(&self) -> bool {
        self.failures.is_empty()
    }
}

/// An ordered set of independent requirements a device has to meet.
///
/// A device is compatible when every registered requirement passes. Requirements are all
/// evaluated so the report lists every reason a device was turned down.
#[derive(Default)]
pub struct CompatibilityChecker {
    requirements: Vec<Requirement>,
    required_extensions: Vec<String>,
}

impl CompatibilityChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requirements for presenting to a surface: the given extensions, at least one surface
    /// format and present mode, and a queue family that can both render and present.
    pub fn standard<S: AsRef<str>>(extensions: &[S]) -> Self {
        let mut checker = Self::new();
        checker
            .require_extensions(extensions)
            .add_requirement("surface formats", has_surface_formats)
            .add_requirement("present modes", has_present_modes)
            .add_requirement("graphics present queue", has_graphics_present_queue);
        checker
    }

    pub fn add_requirement(
        &mut self,
        name: impl Into<String>,
        test: impl Fn(&CapabilitySnapshot) -> Verdict + 'static,
    ) -> &mut Self {
        self.requirements.push(Requirement {
            name: name.into(),
            test: Box::new(test),
        });
        self
    }

    /// Registers an extension requirement and records the names, so the logical device can
    /// enable exactly what was checked.
    pub fn require_extensions<S: AsRef<str>>(&mut self, extensions: &[S]) -> &mut Self {
        self.required_extensions.extend(
            extensions
                .iter()
                .map(|extension| extension.as_ref().to_string()),
        );
        self.add_requirement("extensions", extensions_available(extensions))
    }

    /// Every extension registered through [`require_extensions`](Self::require_extensions).
    pub fn required_extensions(&self) -> &[String] {
        &self.required_extensions
    }

    pub fn with_requirement(
        mut self,
        name: impl Into<String>,
        test: impl Fn(&CapabilitySnapshot) -> Verdict + 'static,
    ) -> Self {
        self.add_requirement(name, test);
        self
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn check(&self, snapshot: &CapabilitySnapshot) -> CompatibilityReport {
        let failures = self
            .requirements
            .iter()
            .flat_map(|requirement| match requirement.evaluate(snapshot) {
                Verdict::Pass => Vec::new(),
                Verdict::Fail(reasons) if reasons.is_empty() => vec![RequirementFailure {
                    requirement: requirement.name.clone(),
                    reason: String::from(UNSPECIFIED_FAILURE),
                }],
                Verdict::Fail(reasons) => reasons
                    .into_iter()
                    .map(|reason| RequirementFailure {
                        requirement: requirement.name.clone(),
                        reason,
                    })
                    .collect(),
            })
            .collect();
        CompatibilityReport { failures }
    }

    pub fn is_compatible(&self, snapshot: &CapabilitySnapshot) -> bool {
        self.check(snapshot).is_compatible()
    }
}

pub fn extensions_available<S: AsRef<str>>(
    extensions: &[S],
) -> impl Fn(&CapabilitySnapshot) -> Verdict + 'static {
    let extensions: Vec<String> = extensions
        .iter()
        .map(|extension| extension.as_ref().to_string())
        .collect();
    move |snapshot| {
        let missing: Vec<String> = extensions
            .iter()
            .filter(|extension| !snapshot.supports_extension(extension))
            .map(|extension| {
                debug!(
                    "Device {} does not support extension {}",
                    snapshot.properties.name, extension
                );
                format!("missing extension {}", extension)
            })
            .collect();

        if missing.is_empty() {
            Verdict::Pass
        } else {
            Verdict::Fail(missing)
        }
    }
}

pub fn has_surface_formats(snapshot: &CapabilitySnapshot) -> Verdict {
    if snapshot.surface_formats.is_empty() {
        Verdict::fail("no surface formats")
    } else {
        Verdict::Pass
    }
}

pub fn has_present_modes(snapshot: &CapabilitySnapshot) -> Verdict {
    if snapshot.present_modes.is_empty() {
        Verdict::fail("no present modes")
    } else {
        Verdict::Pass
    }
}

pub fn has_graphics_present_queue(snapshot: &CapabilitySnapshot) -> Verdict {
    match snapshot.graphics_present_queue_family() {
        Some(_) => Verdict::Pass,
        None => Verdict::fail("no queue family supports both graphics and present"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_device::{capture_logs, TestDevice, TestQueueFamily};
    use crate::PhysicalDeviceType;

    fn snapshot_of(device: &TestDevice) -> CapabilitySnapshot {
        CapabilitySnapshot::capture(device, &0)
    }

    #[test]
    fn empty_checker_accepts_anything() {
        let checker = CompatibilityChecker::new();
        assert!(checker.is_compatible(&snapshot_of(&TestDevice::new("Bare"))));
    }

    #[test]
    fn missing_extensions_are_each_reported() {
        let checker = CompatibilityChecker::standard(&["VK_KHR_swapchain", "VK_EXT_mesh_shader"]);
        let device = TestDevice::suitable("Old").with_extensions(&["VK_KHR_maintenance1"]);

        let report = checker.check(&snapshot_of(&device));
        assert!(!report.is_compatible());
        let reasons: Vec<&str> = report.failures.iter().map(|f| f.reason.as_str()).collect();
        assert_eq!(
            reasons,
            vec![
                "missing extension VK_KHR_swapchain",
                "missing extension VK_EXT_mesh_shader"
            ]
        );
        assert!(report
            .failures
            .iter()
            .all(|failure| failure.requirement == "extensions"));
    }

    #[test]
    fn standard_requirements_reject_empty_surface_support() {
        let checker = CompatibilityChecker::standard(&["VK_KHR_swapchain"]);
        let device = TestDevice::suitable("No formats")
            .with_surface_formats(Vec::new())
            .with_present_modes(Vec::new());

        let report = checker.check(&snapshot_of(&device));
        let requirements: Vec<&str> = report
            .failures
            .iter()
            .map(|f| f.requirement.as_str())
            .collect();
        assert_eq!(requirements, vec!["surface formats", "present modes"]);
    }

    #[test]
    fn standard_requirements_need_a_shared_graphics_present_family() {
        let checker = CompatibilityChecker::standard(&["VK_KHR_swapchain"]);
        let split = TestDevice::new("Split")
            .with_queue_family(TestQueueFamily::graphics())
            .with_queue_family(TestQueueFamily::present_only());
        assert!(!checker.is_compatible(&snapshot_of(&split)));

        let late = TestDevice::new("Late")
            .with_queue_family(TestQueueFamily::graphics())
            .with_queue_family(TestQueueFamily::graphics_present());
        assert!(checker.is_compatible(&snapshot_of(&late)));
    }

    #[test]
    fn registered_requirements_run_in_order() {
        let checker = CompatibilityChecker::new()
            .with_requirement("discrete", |snapshot: &CapabilitySnapshot| {
                if snapshot.properties.device_type == PhysicalDeviceType::Discrete {
                    Verdict::Pass
                } else {
                    Verdict::fail("not a discrete gpu")
                }
            })
            .with_requirement("always", |_: &CapabilitySnapshot| Verdict::fail("nope"));

        let names: Vec<&str> = checker.requirements().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["discrete", "always"]);

        let device = TestDevice::new("Igpu").with_device_type(PhysicalDeviceType::Integrated);
        let report = checker.check(&snapshot_of(&device));
        assert_eq!(
            report.failures,
            vec![
                RequirementFailure {
                    requirement: String::from("discrete"),
                    reason: String::from("not a discrete gpu"),
                },
                RequirementFailure {
                    requirement: String::from("always"),
                    reason: String::from("nope"),
                },
            ]
        );
    }

    #[test]
    fn failure_without_reason_still_rejects() {
        let checker = CompatibilityChecker::standard(&["VK_KHR_swapchain"])
            .with_requirement("silent", |_: &CapabilitySnapshot| Verdict::Fail(Vec::new()));

        let report = checker.check(&snapshot_of(&TestDevice::suitable("Only")));
        assert!(!report.is_compatible());
        assert_eq!(
            report.failures,
            vec![RequirementFailure {
                requirement: String::from("silent"),
                reason: String::from(UNSPECIFIED_FAILURE),
            }]
        );
    }

    #[test]
    fn missing_extensions_log_one_line_each() {
        let checker = CompatibilityChecker::standard(&[
            "VK_KHR_swapchain",
            "VK_EXT_mesh_shader",
            "VK_KHR_maintenance1",
        ]);
        let device = TestDevice::suitable("Old").with_extensions(&["VK_KHR_maintenance1"]);

        let (report, lines) = capture_logs(|| checker.check(&snapshot_of(&device)));
        assert_eq!(report.failures.len(), 2);

        let extension_lines: Vec<&str> = lines
            .iter()
            .map(String::as_str)
            .filter(|line| line.contains("does not support extension"))
            .collect();
        assert_eq!(
            extension_lines,
            vec![
                "Device Old does not support extension VK_KHR_swapchain",
                "Device Old does not support extension VK_EXT_mesh_shader",
            ]
        );
    }

    #[test]
    fn supported_extensions_log_nothing() {
        let checker = CompatibilityChecker::standard(&["VK_KHR_swapchain"]);
        let device = TestDevice::suitable("Current");

        let (report, lines) = capture_logs(|| checker.check(&snapshot_of(&device)));
        assert!(report.is_compatible());
        assert!(lines.is_empty());
    }

    #[test]
    fn required_extensions_accumulate() {
        let mut checker = CompatibilityChecker::standard(&["VK_KHR_swapchain"]);
        checker.require_extensions(&["VK_EXT_mesh_shader"]);

        assert_eq!(
            checker.required_extensions(),
            ["VK_KHR_swapchain", "VK_EXT_mesh_shader"]
        );
        let extension_requirements = checker
            .requirements()
            .iter()
            .filter(|requirement| requirement.name() == "extensions")
            .count();
        assert_eq!(extension_requirements, 2);
    }
}
