use glam::{Vec2, Vec3, Vec4};

pub use glam::{Vec2Swizzles, Vec3Swizzles, Vec4Swizzles};

/// Replaces single coordinates of a vector, returning the changed copy.
///
/// ```
/// use gamecore::{Vector3Ext, VectorExt};
/// use glam::Vec3;
///
/// let v = Vec3::new(1.0, 2.0, 3.0);
/// assert_eq!(v.with_y(5.0), Vec3::new(1.0, 5.0, 3.0));
/// assert_eq!(v.map_z(|z| z * 2.0), Vec3::new(1.0, 2.0, 6.0));
/// ```
pub trait VectorExt: Sized {
    /// The same vector with its x coordinate set to `x`.
    fn with_x(self, x: f32) -> Self;
    /// The same vector with its y coordinate set to `y`.
    fn with_y(self, y: f32) -> Self;
    /// The same vector with its x coordinate set to `f(x)`.
    fn map_x(self, f: impl FnOnce(f32) -> f32) -> Self;
    /// The same vector with its y coordinate set to `f(y)`.
    fn map_y(self, f: impl FnOnce(f32) -> f32) -> Self;
}

/// [`VectorExt`] for vectors with a z coordinate.
pub trait Vector3Ext: VectorExt {
    /// The same vector with its z coordinate set to `z`.
    fn with_z(self, z: f32) -> Self;
    /// The same vector with its z coordinate set to `f(z)`.
    fn map_z(self, f: impl FnOnce(f32) -> f32) -> Self;
}

/// [`VectorExt`] for vectors with a w coordinate.
pub trait Vector4Ext: Vector3Ext {
    /// The same vector with its w coordinate set to `w`.
    fn with_w(self, w: f32) -> Self;
    /// The same vector with its w coordinate set to `f(w)`.
    fn map_w(self, f: impl FnOnce(f32) -> f32) -> Self;
}

macro_rules! impl_coordinate {
    ($trait:ident for $($ty:ty),+ => $with:ident, $map:ident, $field:ident) => {
        $(
            impl $trait for $ty {
                fn $with(mut self, value: f32) -> Self {
                    self.$field = value;
                    self
                }

                fn $map(mut self, f: impl FnOnce(f32) -> f32) -> Self {
                    self.$field = f(self.$field);
                    self
                }
            }
        )+
    };
}

macro_rules! impl_vector_ext {
    ($($ty:ty),+) => {
        $(
            impl VectorExt for $ty {
                fn with_x(mut self, x: f32) -> Self {
                    self.x = x;
                    self
                }

                fn with_y(mut self, y: f32) -> Self {
                    self.y = y;
                    self
                }

                fn map_x(mut self, f: impl FnOnce(f32) -> f32) -> Self {
                    self.x = f(self.x);
                    self
                }

                fn map_y(mut self, f: impl FnOnce(f32) -> f32) -> Self {
                    self.y = f(self.y);
                    self
                }
            }
        )+
    };
}

impl_vector_ext!(Vec2, Vec3, Vec4);
impl_coordinate!(Vector3Ext for Vec3, Vec4 => with_z, map_z, z);
impl_coordinate!(Vector4Ext for Vec4 => with_w, map_w, w);

/// One channel of a [`Color`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Red.
    R,
    /// Green.
    G,
    /// Blue.
    B,
    /// Alpha.
    A,
}

/// A linear RGBA color with `f32` channels, nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Fully transparent black.
    pub const CLEAR: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Opaque red.
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);

    /// Creates a color from all four channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }

    /// Creates an opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color::new(r, g, b, 1.0)
    }

    /// The same color with every given channel replaced.
    ///
    /// ```
    /// use gamecore::Color;
    ///
    /// let faded = Color::RED.with(None, Some(0.5), None, Some(0.1));
    /// assert_eq!(faded, Color::new(1.0, 0.5, 0.0, 0.1));
    /// ```
    pub fn with(mut self, r: Option<f32>, g: Option<f32>, b: Option<f32>, a: Option<f32>) -> Self {
        if let Some(r) = r {
            self.r = r;
        }
        if let Some(g) = g {
            self.g = g;
        }
        if let Some(b) = b {
            self.b = b;
        }
        if let Some(a) = a {
            self.a = a;
        }
        self
    }

    /// The same color with the red channel set to `r`.
    pub fn with_r(self, r: f32) -> Self {
        Color { r, ..self }
    }

    /// The same color with the green channel set to `g`.
    pub fn with_g(self, g: f32) -> Self {
        Color { g, ..self }
    }

    /// The same color with the blue channel set to `b`.
    pub fn with_b(self, b: f32) -> Self {
        Color { b, ..self }
    }

    /// The same color with the alpha channel set to `a`.
    pub fn with_a(self, a: f32) -> Self {
        Color { a, ..self }
    }

    /// The same color with the red channel set to `f(r)`.
    pub fn map_r(self, f: impl FnOnce(f32) -> f32) -> Self {
        self.with_r(f(self.r))
    }

    /// The same color with the green channel set to `f(g)`.
    pub fn map_g(self, f: impl FnOnce(f32) -> f32) -> Self {
        self.with_g(f(self.g))
    }

    /// The same color with the blue channel set to `f(b)`.
    pub fn map_b(self, f: impl FnOnce(f32) -> f32) -> Self {
        self.with_b(f(self.b))
    }

    /// The same color with the alpha channel set to `f(a)`.
    pub fn map_a(self, f: impl FnOnce(f32) -> f32) -> Self {
        self.with_a(f(self.a))
    }

    /// Value of a single channel.
    pub fn channel(self, channel: Channel) -> f32 {
        match channel {
            Channel::R => self.r,
            Channel::G => self.g,
            Channel::B => self.b,
            Channel::A => self.a,
        }
    }

    /// A new color built from the given channels of this one, in order.
    ///
    /// ```
    /// use gamecore::{Channel::*, Color};
    ///
    /// let c = Color::new(0.1, 0.2, 0.3, 0.4);
    /// assert_eq!(c.swizzle([A, B, G, R]), Color::new(0.4, 0.3, 0.2, 0.1));
    /// ```
    pub fn swizzle(self, channels: [Channel; 4]) -> Self {
        let [r, g, b, a] = channels.map(|channel| self.channel(channel));
        Color { r, g, b, a }
    }

    /// The color as an `(r, g, b, a)` vector.
    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.r, self.g, self.b, self.a)
    }

    /// The red, green and blue channels as a vector.
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}

impl From<Vec4> for Color {
    fn from(v: Vec4) -> Self {
        Color::new(v.x, v.y, v.z, v.w)
    }
}

impl From<Vec3> for Color {
    fn from(v: Vec3) -> Self {
        Color::rgb(v.x, v.y, v.z)
    }
}

impl From<Color> for Vec4 {
    fn from(color: Color) -> Self {
        color.to_vec4()
    }
}
