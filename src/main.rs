mod config;

use clap::Parser;
use config::MagmaConfig;
use log::info;
use magma_vulkan::{
    AppInfo, CapabilitySnapshot, ContextSettings, DeviceQuery, DeviceSelector, GraphicsContext,
    WindowTarget,
};
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use std::path::PathBuf;
use winit::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

const APPLICATION_NAME: &str = "Vulkan test";

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Debug configuration file
    #[arg(short, long, default_value = "config/MagmaDebugConfig.yaml")]
    config: PathBuf,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Print how each device fares against the requirements and exit
    #[arg(long)]
    list_devices: bool,
}

fn setup_logger(level: log::LevelFilter) {
    pretty_env_logger::formatted_builder()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn list_devices<W: HasRawWindowHandle + HasRawDisplayHandle>(
    window: &W,
    settings: &ContextSettings,
    selector: &DeviceSelector,
) -> anyhow::Result<()> {
    let target = WindowTarget::new(window, settings)?;

    for (index, physical_device) in target.physical_devices().iter().enumerate() {
        let snapshot = CapabilitySnapshot::capture(physical_device, target.surface());
        let properties = physical_device.properties();
        println!(
            "[{}] {} ({:?}, {} MiB device local)",
            index,
            properties.name,
            properties.device_type,
            properties.device_local_bytes >> 20
        );
        println!(
            "    {} extensions, {} surface formats, {} present modes, {} queue families",
            snapshot.extensions.len(),
            snapshot.surface_formats.len(),
            snapshot.present_modes.len(),
            snapshot.queue_families.len()
        );

        let report = selector.checker().check(&snapshot);
        if report.is_compatible() {
            println!(
                "    compatible, graphics/present queue family {:?}",
                snapshot.graphics_present_queue_family()
            );
        } else {
            for failure in report.failures.iter() {
                println!("    {}: {}", failure.requirement, failure.reason);
            }
        }
    }

    match target.select(selector) {
        Ok(selection) => println!(
            "Selected [{}] {} with queue family {}",
            selection.index, selection.snapshot.properties.name, selection.queue_family_index
        ),
        Err(err) => println!("{}", err),
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = MagmaConfig::load(&args.config)?;
    setup_logger(config.log_level());

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(APPLICATION_NAME)
        .with_inner_size(LogicalSize::new(args.width, args.height))
        .with_resizable(false)
        .build(&event_loop)?;

    let settings = ContextSettings {
        engine: AppInfo::new("Magma", [0, 0, 1, 0]),
        app: AppInfo::new(APPLICATION_NAME, [0, 1, 0, 0]),
        debug: config.debug_settings(),
    };
    let selector = config.device_selector();

    if args.list_devices {
        return list_devices(&window, &settings, &selector);
    }

    let context = GraphicsContext::new(&window, &settings, &selector)?;
    info!(
        "Rendering with {} on queue family {}",
        context.physical_device().name(),
        context.device().queue().family_index
    );

    event_loop.run(|event, elwt| {
        elwt.set_control_flow(ControlFlow::Wait);
        if let Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            window_id,
        } = event
        {
            if window_id == window.id() {
                elwt.exit();
            }
        }
    })?;

    context.device().wait_idle()?;
    info!("Exiting Main Loop!");
    Ok(())
}
