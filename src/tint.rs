//! Colour grading applied to overlay frames before they are drawn.
//!
//! The filter recolours a frame towards a target hue while keeping its
//! luminance structure: dark areas fall towards a lifted shadow colour, bright
//! areas towards the full target colour.

/// Parameters of the tint filter. All values are in shader units (`0.0..=1.0`
/// unless noted).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TintParams {
    /// Target hue.
    pub hue: f32,
    /// Target saturation.
    pub saturation: f32,
    /// Target brightness; may exceed 1.0.
    pub value: f32,
    /// Brightness of the darkest tones relative to the target colour.
    pub shadow: f32,
    /// Midtone curve exponent.
    pub gamma: f32,
    /// Luma below which pixels take the shadow colour.
    pub in_low: f32,
    /// Share of the original colour mixed back in.
    pub mix_origin: f32,
}

impl Default for TintParams {
    fn default() -> Self {
        TintParams {
            hue: 0.78,
            saturation: 1.0,
            value: 1.1,
            shadow: 0.15,
            gamma: 0.8,
            in_low: 0.0,
            mix_origin: 0.0,
        }
    }
}

impl TintParams {
    /// Tint with the default grading towards `hue`.
    pub fn with_hue(hue: f32) -> Self {
        TintParams {
            hue,
            ..Default::default()
        }
    }

    /// Grade one straight-alpha colour. Channels are in `0.0..=1.0`.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let luma = rgb[0] * 0.299 + rgb[1] * 0.587 + rgb[2] * 0.114;
        let target = hsv_to_rgb(self.hue, self.saturation, self.value);
        let t = smoothstep(self.in_low, 1.0, luma).powf(self.gamma);

        let mut out = [0.0; 3];
        for i in 0..3 {
            let graded = mix(target[i] * self.shadow, target[i], t);
            out[i] = mix(graded, rgb[i], self.mix_origin).clamp(0.0, 1.0);
        }
        out
    }

    /// Grade an 8-bit RGBA pixel, leaving alpha untouched.
    pub fn apply_rgba8(&self, px: [u8; 4]) -> [u8; 4] {
        let rgb = [px[0], px[1], px[2]].map(|c| c as f32 / 255.0);
        let [r, g, b] = self.apply(rgb).map(|c| (c * 255.0).round() as u8);
        [r, g, b, px[3]]
    }
}

pub(crate) fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [f32; 3] {
    const K: [f32; 4] = [1.0, 2.0 / 3.0, 1.0 / 3.0, 3.0];
    let channel = |k: f32| {
        let x = h + k;
        let p = ((x - x.floor()) * 6.0 - K[3]).abs();
        v * mix(K[0], (p - K[0]).clamp(0.0, 1.0), s)
    };
    [channel(K[0]), channel(K[1]), channel(K[2])]
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}
