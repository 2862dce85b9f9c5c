//! Nearest supported display mode search.

use crate::graphics::geometry::Size;
use crate::graphics::mode::DisplayMode;

/// A mode picked by [`find_nearest_mode`], with its position in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearestMode {
    pub index: usize,
    pub mode: DisplayMode,
}

/// Find the supported mode closest to `wanted`.
///
/// Only candidates at `color_depth` are considered. A non-null
/// `ratio_reference` restricts the search to modes with exactly the same
/// fixed-point height/width ratio, and `upper_bound` drops modes larger than
/// it on either axis. An exact size match is returned immediately.
///
/// Otherwise a candidate replaces the current best when it gets closer on one
/// axis without getting further on the other. On an equal distance along an
/// axis, the candidate also wins if the current best falls short of the
/// wanted value on that axis, which favours modes at or above the request.
pub fn find_nearest_mode(
    modes: &[DisplayMode],
    wanted: Size,
    color_depth: i32,
    ratio_reference: Option<Size>,
    upper_bound: Option<Size>,
) -> Option<NearestMode> {
    let wanted_ratio = ratio_reference
        .filter(|reference| !reference.is_null())
        .and_then(|reference| reference.fixed_ratio());

    let mut nearest: Option<NearestMode> = None;
    let mut nearest_diff_w = 0;
    let mut nearest_diff_h = 0;

    for (index, mode) in modes.iter().enumerate() {
        if mode.color_depth != color_depth {
            continue;
        }
        if let Some(wanted_ratio) = wanted_ratio {
            if mode.size().fixed_ratio() != Some(wanted_ratio) {
                continue;
            }
        }
        if let Some(bound) = upper_bound {
            if mode.size().exceeds_by_any(bound) {
                continue;
            }
        }

        let candidate = NearestMode { index, mode: *mode };
        if mode.width == wanted.width && mode.height == wanted.height {
            return Some(candidate);
        }

        let diff_w = (wanted.width - mode.width).abs();
        let diff_h = (wanted.height - mode.height).abs();
        let replace = match nearest {
            None => true,
            Some(best) => {
                let same_diff_w_higher = diff_w == nearest_diff_w && best.mode.width < wanted.width;
                let same_diff_h_higher =
                    diff_h == nearest_diff_h && best.mode.height < wanted.height;
                ((diff_w < nearest_diff_w || same_diff_w_higher) && diff_h <= nearest_diff_h)
                    || ((diff_h < nearest_diff_h || same_diff_h_higher)
                        && diff_w <= nearest_diff_w)
            }
        };
        if replace {
            nearest = Some(candidate);
            nearest_diff_w = diff_w;
            nearest_diff_h = diff_h;
        }
    }
    nearest
}
