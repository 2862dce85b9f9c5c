//! Post-process filter selection with fallback to the backend default.

use crate::graphics::driver::{GfxDriverFactory, GfxFilter, GraphicsDriver};
use crate::graphics::error::GraphicsModeError;
use crate::graphics::mode::GfxFilterSetup;

/// Apply filter `id` through `factory`.
pub fn set_filter(
    factory: &mut dyn GfxDriverFactory,
    driver: &mut dyn GraphicsDriver,
    id: &str,
) -> Result<GfxFilter, GraphicsModeError> {
    match factory.set_filter(driver, id) {
        Ok(filter) => {
            log::info!("Graphics filter set: {}", filter);
            Ok(filter)
        }
        Err(source) => {
            log::error!("Unable to set graphics filter '{}'. Error: {}", id, source);
            Err(GraphicsModeError::Filter {
                id: id.to_string(),
                source,
            })
        }
    }
}

/// Apply the requested filter, or the factory's default filter if the
/// requested one cannot be used. Fails when the default fails too, or when
/// the request already was the default.
pub fn set_filter_any(
    factory: &mut dyn GfxDriverFactory,
    driver: &mut dyn GraphicsDriver,
    setup: &GfxFilterSetup,
) -> Result<GfxFilter, GraphicsModeError> {
    log::info!("Requested gfx filter: {}", setup.user_request);
    let filter = match set_filter(factory, driver, &setup.id) {
        Ok(filter) => filter,
        Err(err) => {
            let default_id = factory.default_filter_id().to_string();
            if default_id.eq_ignore_ascii_case(&setup.id) {
                return Err(err);
            }
            log::error!(
                "Failed to apply gfx filter: {}; will try to use factory default filter '{}' instead",
                setup.user_request,
                default_id
            );
            set_filter(factory, driver, &default_id)?
        }
    };
    log::info!("Using gfx filter: {}", filter.info.id);
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::driver::DriverError;
    use crate::graphics::geometry::{Rect, Size};
    use crate::graphics::mode::DisplayMode;
    use crate::graphics::software::{standard_modes, SoftwareDriverFactory, FILTER_LINEAR, FILTER_STD_SCALE};

    fn setup() -> (SoftwareDriverFactory, Box<dyn GraphicsDriver>) {
        let mut factory = SoftwareDriverFactory::new(standard_modes(Size::new(1280, 720), &[32]));
        let mut driver = factory.create_driver().unwrap();
        driver
            .set_display_mode(&DisplayMode::new(Size::new(1280, 720), 32, false))
            .unwrap();
        driver.set_native_size(Size::new(320, 200)).unwrap();
        driver.set_render_frame(Rect::new(64, 0, 1216, 720)).unwrap();
        (factory, driver)
    }

    #[test]
    fn test_set_filter_same_id_twice() {
        let (mut factory, mut driver) = setup();
        let first = set_filter(&mut factory, driver.as_mut(), FILTER_LINEAR).unwrap();
        let first_dest = driver.render_destination();
        let second = set_filter(&mut factory, driver.as_mut(), FILTER_LINEAR).unwrap();
        assert_eq!(first, second);
        assert_eq!(first_dest, driver.render_destination());
        assert_eq!(first.destination, Rect::new(64, 0, 1216, 720));
    }

    #[test]
    fn test_set_filter_any_falls_back_to_default() {
        let (mut factory, mut driver) = setup();
        let filter = set_filter_any(&mut factory, driver.as_mut(), &GfxFilterSetup::new("hq3x")).unwrap();
        assert_eq!(filter.info.id, FILTER_STD_SCALE);
        assert_eq!(driver.graphics_filter().map(|f| f.info.id.as_str()), Some(FILTER_STD_SCALE));
    }

    #[test]
    fn test_set_filter_any_keeps_valid_request() {
        let (mut factory, mut driver) = setup();
        let filter = set_filter_any(&mut factory, driver.as_mut(), &GfxFilterSetup::new("linear")).unwrap();
        assert_eq!(filter.info.id, FILTER_LINEAR);
    }

    #[test]
    fn test_set_filter_fails_without_mode() {
        let mut factory = SoftwareDriverFactory::new(Vec::new());
        let mut driver = factory.create_driver().unwrap();
        let err = set_filter_any(&mut factory, driver.as_mut(), &GfxFilterSetup::new("stdscale")).unwrap_err();
        assert_eq!(
            err,
            GraphicsModeError::Filter {
                id: "stdscale".to_string(),
                source: DriverError::NotInitialized,
            }
        );
    }
}
