use crate::Feature;

use palette::Srgb;
#[cfg(feature = "colorspaces")]
use palette::{IntoColor, Lab, LinSrgb, Oklab};

/// The set of supported color spaces to cluster in.
///
/// Distances are Euclidean in the chosen space, so perceptually uniform spaces like
/// [`ColorSpace::Oklab`] or [`ColorSpace::Lab`] tend to give more natural looking regions.
/// [`ColorSpace::Srgb`] clusters the raw `0.0..=255.0` channel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSpace {
    /// The sRGB color space, with channels scaled to `0.0..=255.0`.
    #[default]
    Srgb,
    /// The CIELAB color space (D65 white point).
    #[cfg(feature = "colorspaces")]
    Lab,
    /// The Oklab color space.
    #[cfg(feature = "colorspaces")]
    Oklab,
}

impl ColorSpace {
    /// Converts an sRGB pixel to a feature in this color space.
    #[must_use]
    pub fn feature_from_srgb(self, color: Srgb<u8>) -> Feature {
        match self {
            ColorSpace::Srgb => {
                let Srgb { red, green, blue, .. } = color;
                [red.into(), green.into(), blue.into()]
            }
            #[cfg(feature = "colorspaces")]
            ColorSpace::Lab => {
                let linear: LinSrgb = color.into_linear();
                let lab: Lab = linear.into_color();
                let Lab { l, a, b, .. } = lab;
                [l, a, b].map(f64::from)
            }
            #[cfg(feature = "colorspaces")]
            ColorSpace::Oklab => {
                let linear: LinSrgb = color.into_linear();
                let oklab: Oklab = linear.into_color();
                let Oklab { l, a, b } = oklab;
                [l, a, b].map(f64::from)
            }
        }
    }

    /// Converts a feature in this color space back to sRGB channels in `0.0..=255.0`.
    ///
    /// Colors outside of the sRGB gamut produce channels outside of that range;
    /// the renderer clamps them.
    #[must_use]
    pub fn srgb_from_feature(self, feature: Feature) -> Feature {
        #[cfg(feature = "colorspaces")]
        #[allow(clippy::cast_possible_truncation)]
        let [x, y, z] = feature.map(|c| c as f32);

        match self {
            ColorSpace::Srgb => feature,
            #[cfg(feature = "colorspaces")]
            ColorSpace::Lab => {
                let lab: Lab = Lab::new(x, y, z);
                encode(lab.into_color())
            }
            #[cfg(feature = "colorspaces")]
            ColorSpace::Oklab => {
                let oklab: Oklab = Oklab::new(x, y, z);
                encode(oklab.into_color())
            }
        }
    }
}

/// Applies the sRGB transfer function and scales to `0.0..=255.0`.
#[cfg(feature = "colorspaces")]
fn encode(linear: LinSrgb) -> Feature {
    let srgb: Srgb = Srgb::from_linear(linear);
    let Srgb { red, green, blue, .. } = srgb;
    [red, green, blue].map(|c| f64::from(c) * 255.0)
}
