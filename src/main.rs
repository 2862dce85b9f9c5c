use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use gfxmode::config;
use gfxmode::graphics::software::standard_modes;
use gfxmode::graphics::{
    DeviceQuery, DriverRegistry, GfxDriverFactory, GraphicsModeContext, Size,
    SoftwareDevice, SoftwareDriverFactory, SOFTWARE_DRIVER_ID,
};
use gfxmode::logging::{self, LogLevel};
use gfxmode::Cli;

/// Desktop assumed when no display can be queried.
const FALLBACK_DESKTOP: Size = Size::new(1920, 1080);

fn register_software(registry: &mut DriverRegistry, desktop: Size) {
    let modes = standard_modes(desktop, &[32, 24, 16]);
    registry.register(SOFTWARE_DRIVER_ID, move || {
        Box::new(SoftwareDriverFactory::new(modes.clone())) as Box<dyn GfxDriverFactory>
    });
}

/// Desktop query plus every available backend, SDL first when built in.
fn create_backends() -> (Box<dyn DeviceQuery>, DriverRegistry) {
    let mut registry = DriverRegistry::new();

    #[cfg(feature = "sdl")]
    {
        use gfxmode::graphics::sdl::{SdlDevice, SdlDriverFactory, SDL_DRIVER_ID};

        match SdlDevice::new() {
            Ok(device) => {
                let video = device.video().clone();
                registry.register(SDL_DRIVER_ID, move || {
                    Box::new(SdlDriverFactory::new(video.clone())) as Box<dyn GfxDriverFactory>
                });
                let desktop = device.desktop_size().unwrap_or(FALLBACK_DESKTOP);
                register_software(&mut registry, desktop);
                return (Box::new(device), registry);
            }
            Err(err) => log::warn!("{}; assuming a {} desktop", err, FALLBACK_DESKTOP),
        }
    }

    register_software(&mut registry, FALLBACK_DESKTOP);
    (Box::new(SoftwareDevice::new(FALLBACK_DESKTOP)), registry)
}

fn run() -> Result<ExitCode> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load the setup file, then let the command line override it
    let options = config::load_config(&cli.configdir)?;
    let options = cli.merge_into_options(options)?;

    let level = LogLevel::from_i32(options.log_level.unwrap_or(LogLevel::Info.as_i32()));
    logging::log_init(level, options.log_file.as_deref())?;
    log::info!("gfxmode {} starting", env!("CARGO_PKG_VERSION"));

    let (device, registry) = create_backends();

    if cli.list_drivers {
        for id in registry.ids() {
            println!("{}", id);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let setup = options.to_screen_setup();
    log::info!("Configuration:");
    log::info!("  Driver: {}", setup.driver_id);
    log::info!("  Game size: {}", options.game_size);
    log::info!("  Filter: {}", setup.filter.id);
    if let Some(config_dir) = &options.config_dir {
        log::info!("  Config dir: {}", config_dir);
    }

    let mut context =
        GraphicsModeContext::new(registry, device).with_debugger_attached(options.debugger);
    let result = context.init_any(options.game_size, &setup, options.color_depths());
    let code = match result {
        Ok(mode) => {
            println!("driver: {}", context.factory_id().unwrap_or("none"));
            println!("mode: {}", mode);
            if let Some(driver) = context.driver() {
                println!("render frame: {}", driver.render_destination());
            }
            if let Some(filter) = context.filter() {
                println!("filter: {}", filter.info.id);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    };
    context.shutdown();
    log::logger().flush();
    Ok(code)
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
