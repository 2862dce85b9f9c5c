//! Display mode activation.
//!
//! [`GraphicsModeContext`] owns the active backend and walks the fallback
//! ladder that turns a [`ScreenSetup`] into a running display mode:
//!
//! 1. create the backend (requested id first, then the others in registry
//!    order);
//! 2. plan the wanted mode from the setup;
//! 3. find a compatible mode for the prime color depth, then the alternate
//!    one;
//! 4. set the native size and the centered render frame;
//! 5. apply the requested filter, or the backend default.
//!
//! If the user's policy fails on a backend, the default policy of the
//! opposite windowed/fullscreen category is tried once on the same backend
//! before moving to the next backend. Every loop runs over a fixed list, so
//! the whole ladder always terminates.

use std::fmt;

use crate::graphics::catalog::{log_driver_modes, ModeCatalog};
use crate::graphics::driver::{DeviceQuery, DriverError, DriverRegistry, GfxDriverFactory, GfxFilter, GraphicsDriver};
use crate::graphics::error::GraphicsModeError;
use crate::graphics::filter;
use crate::graphics::geometry::{PlaneScaling, Rect, Size};
use crate::graphics::matcher::find_nearest_mode;
use crate::graphics::mode::{
    convert_frame_setup, default_setup, make_scaling_option, ColorDepthOption, DisplayMode,
    DisplayModeSetup, GameFrameSetup, GfxFilterSetup, ScreenSetup, ScreenSizeDef,
};
use crate::graphics::planner::{max_display_size, plan_frame_size, plan_screen_size};

/// Result type for mode negotiation.
pub type ModeResult<T> = Result<T, GraphicsModeError>;

/// Where the last activation attempt got to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActivationStage {
    #[default]
    NoDriver,
    DriverCreated,
    ModeRequested,
    ModeCompatible,
    FrameSet,
    /// Terminal success.
    FilterSet,
    Failed,
}

impl ActivationStage {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::FilterSet)
    }
}

/// Display mode negotiation state.
///
/// Methods must not be called re-entrantly; the caller serializes mode
/// changes.
pub struct GraphicsModeContext {
    registry: DriverRegistry,
    device: Box<dyn DeviceQuery>,
    /// Skip the opposite-category retry, so a debugging session sees the
    /// failure of the mode it asked for.
    debugger_attached: bool,

    factory: Option<Box<dyn GfxDriverFactory>>,
    driver: Option<Box<dyn GraphicsDriver>>,
    stage: ActivationStage,

    saved_windowed: Option<DisplayMode>,
    saved_fullscreen: Option<DisplayMode>,
    frame_setup: GameFrameSetup,
    game_scaling: PlaneScaling,
    last_error: Option<String>,
}

impl GraphicsModeContext {
    pub fn new(registry: DriverRegistry, device: Box<dyn DeviceQuery>) -> Self {
        Self {
            registry,
            device,
            debugger_attached: false,
            factory: None,
            driver: None,
            stage: ActivationStage::NoDriver,
            saved_windowed: None,
            saved_fullscreen: None,
            frame_setup: GameFrameSetup::default(),
            game_scaling: PlaneScaling::default(),
            last_error: None,
        }
    }

    #[must_use]
    pub fn with_debugger_attached(mut self, attached: bool) -> Self {
        self.debugger_attached = attached;
        self
    }

    pub fn registry(&self) -> &DriverRegistry {
        &self.registry
    }

    pub fn stage(&self) -> ActivationStage {
        self.stage
    }

    pub fn driver(&self) -> Option<&dyn GraphicsDriver> {
        self.driver.as_deref()
    }

    pub fn factory_id(&self) -> Option<&str> {
        self.factory.as_deref().map(|factory| factory.id())
    }

    /// Active display mode as reported by the driver.
    pub fn display_mode(&self) -> Option<DisplayMode> {
        self.driver.as_deref().and_then(|driver| driver.display_mode())
    }

    /// Last mode successfully activated in the given category.
    pub fn last_mode(&self, windowed: bool) -> Option<DisplayMode> {
        if windowed {
            self.saved_windowed
        } else {
            self.saved_fullscreen
        }
    }

    pub fn render_frame_setup(&self) -> GameFrameSetup {
        self.frame_setup
    }

    /// Current game-to-screen transform.
    pub fn game_scaling(&self) -> &PlaneScaling {
        &self.game_scaling
    }

    pub fn filter(&self) -> Option<&GfxFilter> {
        self.driver.as_deref().and_then(|driver| driver.graphics_filter())
    }

    /// Text of the most recent failure, for diagnostics.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn max_display_size(&self, windowed: bool) -> Size {
        max_display_size(self.device.as_ref(), windowed)
    }

    fn fail(&mut self, err: GraphicsModeError) -> GraphicsModeError {
        self.last_error = Some(match err.driver_error() {
            Some(source) => source.to_string(),
            None => err.to_string(),
        });
        err
    }

    // ==========================================================================
    // Backend lifecycle
    // ==========================================================================

    /// Create the backend registered as `id` and its driver. A backend that
    /// is still active is shut down first.
    pub fn create_renderer(&mut self, id: &str) -> ModeResult<()> {
        if self.factory.is_some() {
            self.shutdown();
        }
        let Some(mut factory) = self.registry.create_factory(id) else {
            log::error!("Failed to initialize {} graphics factory", id);
            return Err(self.fail(GraphicsModeError::FactoryNotFound(id.to_string())));
        };
        log::info!("Using graphics factory: {}", id);

        let driver = match factory.create_driver() {
            Ok(driver) => driver,
            Err(source) => {
                log::error!("Failed to create graphics driver. {}", source);
                factory.shutdown();
                return Err(self.fail(GraphicsModeError::DriverCreation {
                    id: id.to_string(),
                    source,
                }));
            }
        };
        log::info!("Created graphics driver: {}", driver.name());

        self.factory = Some(factory);
        self.driver = Some(driver);
        self.stage = ActivationStage::DriverCreated;
        Ok(())
    }

    /// Release the backend. Saved modes are kept for later switches.
    pub fn shutdown(&mut self) {
        if let Some(factory) = self.factory.as_mut() {
            factory.shutdown();
        }
        if self.factory.is_some() {
            log::debug!("Graphics backend shut down");
        }
        self.factory = None;
        self.driver = None;
        self.stage = ActivationStage::NoDriver;
        self.game_scaling = PlaneScaling::default();
    }

    // ==========================================================================
    // Mode search and activation
    // ==========================================================================

    /// Nearest mode the current driver supports, see [`find_nearest_mode`].
    pub fn find_nearest_supported_mode(
        &self,
        wanted: Size,
        color_depth: i32,
        ratio_reference: Option<Size>,
        upper_bound: Option<Size>,
    ) -> Option<DisplayMode> {
        let driver = self.driver.as_deref()?;
        let catalog = match ModeCatalog::query(driver, color_depth) {
            Ok(catalog) => catalog,
            Err(err) => {
                log::error!("Couldn't get a list of supported resolutions: {}", err);
                return None;
            }
        };
        find_nearest_mode(
            catalog.modes(),
            wanted,
            color_depth,
            ratio_reference,
            upper_bound,
        )
        .map(|nearest| nearest.mode)
    }

    /// Switch the current driver to `mode` and remember the resolved mode in
    /// the cache of its own category.
    pub fn set_display_mode(&mut self, mode: &DisplayMode) -> ModeResult<DisplayMode> {
        log::info!("Attempt to switch gfx mode to {}", mode);
        let Some(driver) = self.driver.as_mut() else {
            return Err(self.fail(GraphicsModeError::NoDriver));
        };

        if let Err(source) = driver.set_display_mode(mode) {
            log::error!("Failed to init gfx mode. {}", source);
            return Err(self.fail(GraphicsModeError::ModeActivation {
                mode: *mode,
                source,
            }));
        }

        let resolved = driver.display_mode().unwrap_or(*mode);
        if resolved.windowed {
            self.saved_windowed = Some(resolved);
        } else {
            self.saved_fullscreen = Some(resolved);
        }
        log::info!("Succeeded. Using gfx mode {}", resolved);
        Ok(resolved)
    }

    /// Find the closest mode to `wanted` that the driver accepts at
    /// `wanted.color_depth` and activate it.
    fn try_compatible_mode(
        &mut self,
        wanted: &DisplayMode,
        match_device_ratio: bool,
    ) -> ModeResult<DisplayMode> {
        log::info!(
            "Attempting to find nearest supported resolution for screen size {}",
            wanted
        );
        let screen_size = wanted.size();
        let device_size = self.max_display_size(wanted.windowed);
        let mut compatible = *wanted;

        if wanted.windowed {
            // Windows may have any size within the display limits.
            if screen_size.exceeds_by_any(device_size) {
                compatible.width = device_size.width;
                compatible.height = device_size.height;
            }
        } else {
            let mut found = None;
            if match_device_ratio {
                found = self.find_nearest_supported_mode(
                    screen_size,
                    wanted.color_depth,
                    Some(device_size),
                    None,
                );
            }
            if found.is_none() {
                found =
                    self.find_nearest_supported_mode(screen_size, wanted.color_depth, None, None);
            }
            let Some(mode) = found else {
                log::info!("Could not find compatible fullscreen mode");
                return Err(self.fail(GraphicsModeError::NoCompatibleMode { mode: *wanted }));
            };
            compatible = mode;
            compatible.vsync = wanted.vsync;
            compatible.windowed = false;
        }

        let result = self.set_display_mode(&compatible);
        if result.is_ok() || !wanted.windowed {
            return result;
        }

        // An arbitrary window size was refused; retry with a listed mode
        // that fits on the display.
        let Some(mode) = self.find_nearest_supported_mode(
            screen_size,
            wanted.color_depth,
            None,
            Some(device_size),
        ) else {
            return result;
        };
        compatible = mode;
        compatible.vsync = wanted.vsync;
        compatible.windowed = true;
        self.set_display_mode(&compatible)
    }

    /// [`Self::try_compatible_mode`] for the depth in `wanted`, then for
    /// `alternate_depth` if that is different.
    fn try_compatible_mode_any(
        &mut self,
        wanted: &DisplayMode,
        alternate_depth: i32,
        match_device_ratio: bool,
    ) -> ModeResult<DisplayMode> {
        let depths = ColorDepthOption::new(wanted.color_depth, alternate_depth);
        let mut last_err = None;
        for depth in depths.attempts() {
            let attempt = DisplayMode {
                color_depth: depth,
                ..*wanted
            };
            match self.try_compatible_mode(&attempt, match_device_ratio) {
                Ok(mode) => return Ok(mode),
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or(GraphicsModeError::NoCompatibleMode { mode: *wanted }))
    }

    /// Mode the setup asks for before any backend support is considered.
    pub fn wanted_mode(
        &self,
        game_size: Size,
        mode_setup: &DisplayModeSetup,
        color_depths: ColorDepthOption,
        frame_setup: &GameFrameSetup,
    ) -> DisplayMode {
        let max_display = self.max_display_size(mode_setup.windowed);
        let screen = plan_screen_size(game_size, mode_setup, frame_setup, max_display);
        DisplayMode::new(screen, color_depths.prime, mode_setup.windowed)
            .with_refresh(mode_setup.refresh_rate, mode_setup.vsync)
    }

    /// Plan the wanted mode and activate the nearest compatible one on the
    /// current driver. Used both by initialization and by runtime mode
    /// changes.
    pub fn set_display_mode_any(
        &mut self,
        game_size: Size,
        mode_setup: &DisplayModeSetup,
        color_depths: ColorDepthOption,
        frame_setup: &GameFrameSetup,
    ) -> ModeResult<DisplayMode> {
        let wanted = self.wanted_mode(game_size, mode_setup, color_depths, frame_setup);
        self.stage = ActivationStage::ModeRequested;
        let mode = self.try_compatible_mode_any(
            &wanted,
            color_depths.alternate,
            mode_setup.match_device_ratio,
        )?;
        self.stage = ActivationStage::ModeCompatible;
        Ok(mode)
    }

    // ==========================================================================
    // Render frame
    // ==========================================================================

    /// Tell the driver the native game size and refresh the render frame if
    /// a mode is already set.
    pub fn set_native_size(&mut self, size: Size) -> ModeResult<()> {
        let Some(driver) = self.driver.as_mut() else {
            return Err(self.fail(GraphicsModeError::NoDriver));
        };
        let applied = if size.is_null() {
            Err(DriverError::InvalidOperation("native size is not set".to_string()))
        } else {
            driver.set_native_size(size)
        };
        if let Err(source) = applied {
            return Err(self.fail(GraphicsModeError::NativeSize { size, source }));
        }
        if driver.is_mode_set() {
            self.update_render_frame()?;
        }
        Ok(())
    }

    /// Change the frame scaling policy and refresh the render frame.
    pub fn set_render_frame(&mut self, setup: &GameFrameSetup) -> ModeResult<()> {
        if !setup.is_valid() {
            return Err(self.fail(GraphicsModeError::InvalidFrameSetup {
                scale_factor: setup.scale_factor,
            }));
        }
        self.frame_setup = *setup;
        self.update_render_frame().map(|_| ())
    }

    /// Recompute the render frame for the active mode and native size and
    /// hand it to the driver. Returns the driver's render destination.
    pub fn update_render_frame(&mut self) -> ModeResult<Rect> {
        let Some(driver) = self.driver.as_mut() else {
            return Err(self.fail(GraphicsModeError::NoDriver));
        };
        let (Some(mode), Some(native_size)) = (driver.display_mode(), driver.native_size()) else {
            return Err(self.fail(GraphicsModeError::RenderFrame {
                frame: Rect::default(),
                source: DriverError::NotInitialized,
            }));
        };

        let screen_size = mode.size();
        let frame_size = plan_frame_size(native_size, screen_size, &self.frame_setup);
        let render_frame = Rect::center_in(Rect::from_size(screen_size), Rect::from_size(frame_size));
        if let Err(source) = driver.set_render_frame(render_frame) {
            log::error!("Failed to set render frame {}. Error: {}", render_frame, source);
            return Err(self.fail(GraphicsModeError::RenderFrame {
                frame: render_frame,
                source,
            }));
        }

        let destination = driver.render_destination();
        log::info!("Render frame set, render dest {}", destination);
        self.game_scaling = PlaneScaling::new(native_size, destination);
        Ok(destination)
    }

    fn apply_frame(&mut self, game_size: Size, frame_setup: &GameFrameSetup) -> ModeResult<()> {
        if !frame_setup.is_valid() {
            return Err(self.fail(GraphicsModeError::InvalidFrameSetup {
                scale_factor: frame_setup.scale_factor,
            }));
        }
        self.frame_setup = *frame_setup;
        self.set_native_size(game_size)?;
        self.stage = ActivationStage::FrameSet;
        Ok(())
    }

    // ==========================================================================
    // Filters
    // ==========================================================================

    /// Apply filter `id` to the current driver.
    pub fn set_filter(&mut self, id: &str) -> ModeResult<GfxFilter> {
        let (Some(factory), Some(driver)) = (self.factory.as_deref_mut(), self.driver.as_deref_mut())
        else {
            return Err(self.fail(GraphicsModeError::NoDriver));
        };
        filter::set_filter(factory, driver, id).map_err(|err| self.fail(err))
    }

    /// Apply the requested filter or fall back to the backend default.
    pub fn set_filter_any(&mut self, setup: &GfxFilterSetup) -> ModeResult<GfxFilter> {
        let (Some(factory), Some(driver)) = (self.factory.as_deref_mut(), self.driver.as_deref_mut())
        else {
            return Err(self.fail(GraphicsModeError::NoDriver));
        };
        let filter = filter::set_filter_any(factory, driver, setup).map_err(|err| self.fail(err))?;
        self.stage = ActivationStage::FilterSet;
        Ok(filter)
    }

    // ==========================================================================
    // Initialization ladder
    // ==========================================================================

    /// Full activation of one policy on the current driver.
    fn try_init_mode_using_setup(
        &mut self,
        game_size: Size,
        mode_setup: &DisplayModeSetup,
        color_depths: ColorDepthOption,
        frame_setup: &GameFrameSetup,
        filter_setup: &GfxFilterSetup,
    ) -> ModeResult<DisplayMode> {
        let result = self
            .set_display_mode_any(game_size, mode_setup, color_depths, frame_setup)
            .and_then(|mode| {
                self.apply_frame(game_size, frame_setup)?;
                self.set_filter_any(filter_setup)?;
                Ok(mode)
            });
        if result.is_err() {
            self.stage = ActivationStage::Failed;
        }
        result
    }

    /// Create backend `id` and activate the user's policy on it, or the
    /// opposite category's defaults if that fails.
    fn create_driver_and_init_mode_any(
        &mut self,
        id: &str,
        game_size: Size,
        setup: &ScreenSetup,
        color_depths: ColorDepthOption,
    ) -> ModeResult<DisplayMode> {
        self.create_renderer(id)?;

        if let Some(driver) = self.driver.as_deref() {
            for depth in color_depths.attempts() {
                log_driver_modes(driver, depth);
            }
        }

        let result = self.try_init_mode_using_setup(
            game_size,
            &setup.display_mode,
            color_depths,
            &setup.game_frame,
            &setup.filter,
        );
        match result {
            Ok(mode) => Ok(mode),
            Err(err) if self.debugger_attached => Err(err),
            Err(err) => {
                let windowed = !setup.display_mode.windowed;
                log::warn!(
                    "{}; trying default {} setup instead",
                    err,
                    if windowed { "windowed" } else { "fullscreen" }
                );
                let (mode_setup, frame_setup) = default_setup(windowed);
                self.try_init_mode_using_setup(
                    game_size,
                    &mode_setup,
                    color_depths,
                    &frame_setup,
                    &setup.filter,
                )
            }
        }
    }

    /// Bring up graphics for a game of `game_size` using `setup`, trying
    /// every registered backend. Returns the activated mode, or one
    /// consolidated [`GraphicsModeError::InitFailed`] when nothing works.
    pub fn init_any(
        &mut self,
        game_size: Size,
        setup: &ScreenSetup,
        color_depths: ColorDepthOption,
    ) -> ModeResult<DisplayMode> {
        match self.device.desktop_size() {
            Ok(size) => log::info!("Device display resolution: {}", size),
            Err(err) => log::error!("{}", err),
        }

        if !setup.game_frame.is_valid() {
            return Err(self.fail(GraphicsModeError::InvalidFrameSetup {
                scale_factor: setup.game_frame.scale_factor,
            }));
        }

        let dm = &setup.display_mode;
        let ignore_device_ratio = dm.windowed || dm.size_def == ScreenSizeDef::Explicit;
        log::info!(
            "Game settings: windowed = {}, screen def: {}, screen size: {}, match device ratio: {}, game scale: {}",
            if dm.windowed { "yes" } else { "no" },
            dm.size_def.as_str(),
            dm.size,
            if ignore_device_ratio {
                "ignore"
            } else if dm.match_device_ratio {
                "yes"
            } else {
                "no"
            },
            make_scaling_option(&setup.game_frame)
        );

        let (ids, found) = self.registry.ordered_ids(&setup.driver_id);
        if found.is_none() {
            log::error!(
                "Requested graphics driver '{}' not found, will try existing drivers instead",
                setup.driver_id
            );
        }

        for id in &ids {
            match self.create_driver_and_init_mode_any(id, game_size, setup, color_depths) {
                Ok(mode) => return Ok(mode),
                Err(err) => {
                    log::warn!("Graphics driver '{}' failed: {}", id, err);
                    self.shutdown();
                }
            }
        }

        self.stage = ActivationStage::Failed;
        let message = self.init_failure_message(game_size, setup, color_depths.prime);
        log::error!("{}", message);
        Err(GraphicsModeError::InitFailed { message })
    }

    fn init_failure_message(&self, game_size: Size, setup: &ScreenSetup, color_depth: i32) -> String {
        let filter = if setup.filter.user_request.is_empty() {
            "Undefined"
        } else {
            setup.filter.user_request.as_str()
        };
        let main_error = if setup.display_mode.size_def == ScreenSizeDef::Explicit {
            format!(
                "There was a problem initializing graphics mode {} ({}-bit), or finding nearest compatible mode, with game size {} and filter '{}'.",
                setup.display_mode.size, color_depth, game_size, filter
            )
        } else {
            format!(
                "There was a problem finding and/or creating valid graphics mode for game size {} ({}-bit) and requested filter '{}'.",
                game_size, color_depth, filter
            )
        };
        format!(
            "{}\n(Problem: '{}')\nTry to correct the problem, or change the graphics settings in the setup file.",
            main_error,
            self.last_error.as_deref().unwrap_or("unknown")
        )
    }

    // ==========================================================================
    // Runtime switching
    // ==========================================================================

    /// Switch between windowed and fullscreen.
    ///
    /// The last mode used in the target category is reused when there is
    /// one; otherwise the category's default setup is negotiated. If the
    /// switch fails the previous mode is restored and the error returned.
    pub fn toggle_windowed(&mut self, color_depths: ColorDepthOption) -> ModeResult<DisplayMode> {
        let Some(driver) = self.driver.as_deref() else {
            return Err(self.fail(GraphicsModeError::NoDriver));
        };
        let Some(current) = driver.display_mode() else {
            return Err(self.fail(GraphicsModeError::NoDriver));
        };
        let native_size = driver.native_size().unwrap_or_default();
        let stage = self.stage;
        let windowed = !current.windowed;
        let frame_setup = convert_frame_setup(&self.frame_setup, windowed);

        let switched = match self.last_mode(windowed) {
            Some(saved) => self.set_display_mode(&saved),
            None => {
                let (mode_setup, _) = default_setup(windowed);
                self.set_display_mode_any(native_size, &mode_setup, color_depths, &frame_setup)
            }
        };

        match switched {
            Ok(mode) => {
                self.frame_setup = frame_setup;
                self.update_render_frame()?;
                self.stage = stage;
                Ok(mode)
            }
            Err(err) => {
                log::warn!(
                    "Failed to switch to {} mode, restoring {}",
                    if windowed { "windowed" } else { "fullscreen" },
                    current
                );
                self.set_display_mode(&current)?;
                self.update_render_frame()?;
                self.stage = stage;
                Err(err)
            }
        }
    }
}

impl fmt::Debug for GraphicsModeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicsModeContext")
            .field("registry", &self.registry)
            .field("factory", &self.factory_id())
            .field("stage", &self.stage)
            .field("mode", &self.display_mode())
            .field("saved_windowed", &self.saved_windowed)
            .field("saved_fullscreen", &self.saved_fullscreen)
            .field("frame_setup", &self.frame_setup)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::geometry::SCALE_UNIT;
    use crate::graphics::mode::FrameScaleDef;
    use crate::graphics::software::{
        standard_modes, SoftwareDevice, SoftwareDriverFactory, FILTER_STD_SCALE, SOFTWARE_DRIVER_ID,
    };

    const GAME: Size = Size::new(320, 200);
    const DESKTOP: Size = Size::new(1920, 1080);

    fn context_with_modes(modes: Vec<DisplayMode>) -> GraphicsModeContext {
        let mut registry = DriverRegistry::new();
        registry.register(SOFTWARE_DRIVER_ID, move || {
            Box::new(SoftwareDriverFactory::new(modes.clone())) as Box<dyn GfxDriverFactory>
        });
        GraphicsModeContext::new(registry, Box::new(SoftwareDevice::new(DESKTOP)))
    }

    fn context() -> GraphicsModeContext {
        context_with_modes(standard_modes(DESKTOP, &[32, 16]))
    }

    fn fullscreen_setup() -> ScreenSetup {
        let (display_mode, game_frame) = default_setup(false);
        ScreenSetup {
            driver_id: SOFTWARE_DRIVER_ID.to_string(),
            display_mode,
            game_frame,
            filter: GfxFilterSetup::new(FILTER_STD_SCALE),
            render_at_screen_res: false,
        }
    }

    #[test]
    fn test_init_fullscreen_desktop() {
        let mut ctx = context();
        let mode = ctx
            .init_any(GAME, &fullscreen_setup(), ColorDepthOption::new(32, 16))
            .unwrap();
        assert_eq!(mode.size(), DESKTOP);
        assert!(!mode.windowed);
        assert_eq!(ctx.stage(), ActivationStage::FilterSet);
        assert_eq!(ctx.last_mode(false), Some(mode));
        assert_eq!(ctx.last_mode(true), None);
        assert_eq!(
            ctx.driver().unwrap().render_destination(),
            Rect::new(160, 40, 1760, 1040)
        );
        assert_eq!(ctx.game_scaling().scale_pt(0, 0), (160, 40));
        assert_eq!(ctx.filter().unwrap().info.id, FILTER_STD_SCALE);
    }

    #[test]
    fn test_invalid_frame_setup_rejected_first() {
        let mut ctx = context();
        let mut setup = fullscreen_setup();
        setup.game_frame = GameFrameSetup::new(FrameScaleDef::IntScale, 0);
        let err = ctx
            .init_any(GAME, &setup, ColorDepthOption::new(32, 32))
            .unwrap_err();
        assert_eq!(err, GraphicsModeError::InvalidFrameSetup { scale_factor: 0 });
        assert_eq!(ctx.stage(), ActivationStage::NoDriver);
        assert!(ctx.driver().is_none());
    }

    #[test]
    fn test_windowed_clamped_to_display() {
        let mut ctx = context();
        let mut setup = fullscreen_setup();
        setup.display_mode = DisplayModeSetup {
            size: Size::new(2560, 1440),
            windowed: true,
            ..DisplayModeSetup::default()
        };
        let mode = ctx.init_any(GAME, &setup, ColorDepthOption::new(32, 32)).unwrap();
        assert_eq!(mode.size(), DESKTOP);
        assert!(mode.windowed);
    }

    #[test]
    fn test_set_render_frame_changes_destination() {
        let mut ctx = context();
        ctx.init_any(GAME, &fullscreen_setup(), ColorDepthOption::new(32, 32))
            .unwrap();
        ctx.set_render_frame(&GameFrameSetup::new(FrameScaleDef::IntScale, 2 * SCALE_UNIT))
            .unwrap();
        assert_eq!(
            ctx.driver().unwrap().render_destination(),
            Rect::new(640, 340, 1280, 740)
        );
        assert!(ctx
            .set_render_frame(&GameFrameSetup::new(FrameScaleDef::IntScale, -1))
            .is_err());
        assert_eq!(ctx.render_frame_setup().scale_factor, 2 * SCALE_UNIT);
    }

    #[test]
    fn test_shutdown_keeps_saved_modes() {
        let mut ctx = context();
        let mode = ctx
            .init_any(GAME, &fullscreen_setup(), ColorDepthOption::new(32, 32))
            .unwrap();
        ctx.shutdown();
        assert!(ctx.driver().is_none());
        assert_eq!(ctx.stage(), ActivationStage::NoDriver);
        assert_eq!(ctx.last_mode(false), Some(mode));
    }

    #[test]
    fn test_operations_without_driver() {
        let mut ctx = context();
        assert_eq!(ctx.set_filter("StdScale"), Err(GraphicsModeError::NoDriver));
        assert_eq!(ctx.update_render_frame(), Err(GraphicsModeError::NoDriver));
        assert_eq!(
            ctx.toggle_windowed(ColorDepthOption::default()),
            Err(GraphicsModeError::NoDriver)
        );
        assert_eq!(ctx.last_error(), Some("No graphics driver is active"));
    }
}
