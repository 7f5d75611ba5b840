//! RGBA color value type with an eagerly computed HSV decomposition.
//!
//! Tolerance matching in the keying engine compares colors in both HSV and
//! RGB space, so every `Color` carries its hue/saturation/value triple from
//! the moment it is built. The type is immutable and `Copy`; there is no
//! lazily cached state to guard.

/// Hue assigned to colors where hue is undefined (black, or r == g == b).
const HUE_UNDEFINED: f64 = 0.0;

/// An (alpha, red, green, blue) color with derived HSV components.
///
/// Equality and hashing consider only the RGB components — alpha is
/// deliberately ignored, which is what flood-fill "same color" tests rely on.
#[derive(Debug, Clone, Copy)]
pub struct Color {
    a: u8,
    r: u8,
    g: u8,
    b: u8,
    hue: f64,
    saturation: f64,
    value: f64,
}

impl Color {
    /// Create a color from alpha, red, green and blue components.
    #[must_use]
    pub fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        let (hue, saturation, value) = hsv_from_rgb(r, g, b);
        Self {
            a,
            r,
            g,
            b,
            hue,
            saturation,
            value,
        }
    }

    /// Create a fully opaque color from red, green and blue components.
    #[must_use]
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(255, r, g, b)
    }

    /// Unpack a 32-bit ARGB value (alpha in the high byte).
    #[must_use]
    pub fn from_argb(argb: u32) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let (a, r, g, b) = (
            (argb >> 24) as u8,
            (argb >> 16) as u8,
            (argb >> 8) as u8,
            argb as u8,
        );
        Self::new(a, r, g, b)
    }

    /// Pack into a 32-bit ARGB value (alpha in the high byte).
    #[must_use]
    pub fn argb(self) -> u32 {
        u32::from(self.a) << 24 | u32::from(self.r) << 16 | u32::from(self.g) << 8 | u32::from(self.b)
    }

    /// Alpha component.
    #[must_use]
    pub fn a(self) -> u8 {
        self.a
    }

    /// Red component.
    #[must_use]
    pub fn r(self) -> u8 {
        self.r
    }

    /// Green component.
    #[must_use]
    pub fn g(self) -> u8 {
        self.g
    }

    /// Blue component.
    #[must_use]
    pub fn b(self) -> u8 {
        self.b
    }

    /// Hue on the circular 0..1 wheel; 0.0 when undefined.
    #[must_use]
    pub fn hue(self) -> f64 {
        self.hue
    }

    /// Saturation in `[0, 1]`.
    #[must_use]
    pub fn saturation(self) -> f64 {
        self.saturation
    }

    /// Value (brightness) in `[0, 1]`.
    #[must_use]
    pub fn value(self) -> f64 {
        self.value
    }

    /// Squared Euclidean distance between two colors in RGB space.
    ///
    /// The unnormalized sum of squared component differences, in
    /// `0..=3 * 255 * 255`. Alpha does not participate.
    #[must_use]
    pub fn square_distance(self, other: Self) -> i64 {
        let dr = i64::from(self.r) - i64::from(other.r);
        let dg = i64::from(self.g) - i64::from(other.g);
        let db = i64::from(self.b) - i64::from(other.b);
        dr * dr + dg * dg + db * db
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b
    }
}

impl Eq for Color {}

impl std::hash::Hash for Color {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.r.hash(state);
        self.g.hash(state);
        self.b.hash(state);
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Convert RGB bytes to an (hue, saturation, value) triple, each in `[0, 1]`.
fn hsv_from_rgb(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let dr = f64::from(r) / 255.0;
    let dg = f64::from(g) / 255.0;
    let db = f64::from(b) / 255.0;

    let max_rgb = r.max(g).max(b);
    let min_rgb = r.min(g).min(b);
    let dmax = f64::from(max_rgb) / 255.0;
    let dmin = f64::from(min_rgb) / 255.0;
    let delta = dmax - dmin;

    let value = dmax;

    // Black: both saturation and hue are undefined
    if max_rgb == 0 {
        return (HUE_UNDEFINED, 0.0, value);
    }

    let saturation = delta / dmax;

    // Gray: hue is undefined
    if max_rgb == min_rgb {
        return (HUE_UNDEFINED, saturation, value);
    }

    let mut hue = if r == max_rgb {
        (dg - db) / delta
    } else if g == max_rgb {
        2.0 + (db - dr) / delta
    } else {
        4.0 + (dr - dg) / delta
    };

    hue /= 6.0;

    // Wrap into [0, 1)
    while hue >= 1.0 {
        hue -= 1.0;
    }
    while hue < 0.0 {
        hue += 1.0;
    }

    (hue, saturation, value)
}
