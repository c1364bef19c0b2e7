use log::trace;

use crate::context::{update, Profile};
use crate::gl;
use crate::state::GlStates;
use crate::{Error, PreconditionError, ToGlEnum};

/// Blend effect that the GPU will use for blending.
///
/// Blending happens at the end of the rendering process, when the GPU wants to write the
/// pixels over pixels that already exist in the framebuffer. The blending function allows
/// you to choose how it should merge the two.
///
/// If you want to add transparent objects one over another, use
/// `Blend::alpha_blending()`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Blend {
    /// The blending function for color channels.
    pub color: BlendingFunction,
    /// The blending function for alpha channels.
    pub alpha: BlendingFunction,
    /// A constant color that can be used in the blending functions.
    pub constant_value: (f32, f32, f32, f32),
}

impl Blend {
    /// Returns a blend effect to add transparent objects over others.
    pub fn alpha_blending() -> Blend {
        Blend {
            color: BlendingFunction::Addition {
                source: LinearBlendingFactor::SourceAlpha,
                destination: LinearBlendingFactor::OneMinusSourceAlpha,
            },
            alpha: BlendingFunction::Addition {
                source: LinearBlendingFactor::SourceAlpha,
                destination: LinearBlendingFactor::OneMinusSourceAlpha,
            },
            constant_value: (0.0, 0.0, 0.0, 0.0),
        }
    }

    fn uses_constant(&self) -> bool {
        [self.color, self.alpha].iter()
            .filter_map(|f| f.factors())
            .any(|(s, d)| s.is_constant() || d.is_constant())
    }
}

impl Default for Blend {
    fn default() -> Blend {
        Blend {
            color: BlendingFunction::AlwaysReplace,
            alpha: BlendingFunction::AlwaysReplace,
            constant_value: (1.0, 1.0, 1.0, 1.0),
        }
    }
}

/// Function that the GPU will use for blending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendingFunction {
    /// Simply overwrite the destination pixel with the source pixel.
    AlwaysReplace,

    /// For each component, the minimum of the source and the destination.
    ///
    /// Requires OpenGL 3 or OpenGL ES 3.
    Min,

    /// For each component, the maximum of the source and the destination.
    ///
    /// Requires OpenGL 3 or OpenGL ES 3.
    Max,

    /// `source_component * source_factor + dest_component * dest_factor`
    Addition {
        /// The factor to apply to the source pixel.
        source: LinearBlendingFactor,
        /// The factor to apply to the destination pixel.
        destination: LinearBlendingFactor,
    },

    /// `source_component * source_factor - dest_component * dest_factor`
    Subtraction {
        /// The factor to apply to the source pixel.
        source: LinearBlendingFactor,
        /// The factor to apply to the destination pixel.
        destination: LinearBlendingFactor,
    },

    /// `dest_component * dest_factor - source_component * source_factor`
    ReverseSubtraction {
        /// The factor to apply to the source pixel.
        source: LinearBlendingFactor,
        /// The factor to apply to the destination pixel.
        destination: LinearBlendingFactor,
    },
}

impl BlendingFunction {
    fn equation(&self, profile: Profile) -> Result<gl::types::GLenum, PreconditionError> {
        match *self {
            BlendingFunction::AlwaysReplace |
            BlendingFunction::Addition { .. } => Ok(gl::FUNC_ADD),
            BlendingFunction::Subtraction { .. } => Ok(gl::FUNC_SUBTRACT),
            BlendingFunction::ReverseSubtraction { .. } => Ok(gl::FUNC_REVERSE_SUBTRACT),
            BlendingFunction::Min | BlendingFunction::Max
                if matches!(profile, Profile::Gl21 | Profile::Gles2) =>
                Err(PreconditionError::NotSupported("minimum and maximum blending")),
            BlendingFunction::Min => Ok(gl::MIN),
            BlendingFunction::Max => Ok(gl::MAX),
        }
    }

    fn factors(&self) -> Option<(LinearBlendingFactor, LinearBlendingFactor)> {
        match *self {
            BlendingFunction::AlwaysReplace |
            BlendingFunction::Min |
            BlendingFunction::Max => None,
            BlendingFunction::Addition { source, destination } |
            BlendingFunction::Subtraction { source, destination } |
            BlendingFunction::ReverseSubtraction { source, destination } =>
                Some((source, destination)),
        }
    }
}

/// Indicates which value to multiply each component with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinearBlendingFactor {
    /// Always `0.0`.
    Zero,
    /// Always `1.0`.
    One,
    /// The corresponding component of the source.
    SourceColor,
    /// `1 - SourceColor`.
    OneMinusSourceColor,
    /// The corresponding component of the destination.
    DestinationColor,
    /// `1 - DestinationColor`.
    OneMinusDestinationColor,
    /// The alpha value of the source.
    SourceAlpha,
    /// The smallest of `SourceAlpha` and `1 - DestinationAlpha`.
    SourceAlphaSaturate,
    /// `1 - SourceAlpha`.
    OneMinusSourceAlpha,
    /// The alpha value of the destination.
    DestinationAlpha,
    /// `1 - DestinationAlpha`.
    OneMinusDestinationAlpha,
    /// The corresponding component of `Blend::constant_value`.
    ConstantColor,
    /// `1 - ConstantColor`.
    OneMinusConstantColor,
    /// The alpha value of `Blend::constant_value`.
    ConstantAlpha,
    /// `1 - ConstantAlpha`.
    OneMinusConstantAlpha,
}

impl LinearBlendingFactor {
    fn is_constant(&self) -> bool {
        matches!(*self, LinearBlendingFactor::ConstantColor |
                        LinearBlendingFactor::OneMinusConstantColor |
                        LinearBlendingFactor::ConstantAlpha |
                        LinearBlendingFactor::OneMinusConstantAlpha)
    }
}

impl ToGlEnum for LinearBlendingFactor {
    fn to_glenum(&self) -> gl::types::GLenum {
        match *self {
            LinearBlendingFactor::Zero => gl::ZERO,
            LinearBlendingFactor::One => gl::ONE,
            LinearBlendingFactor::SourceColor => gl::SRC_COLOR,
            LinearBlendingFactor::OneMinusSourceColor => gl::ONE_MINUS_SRC_COLOR,
            LinearBlendingFactor::DestinationColor => gl::DST_COLOR,
            LinearBlendingFactor::OneMinusDestinationColor => gl::ONE_MINUS_DST_COLOR,
            LinearBlendingFactor::SourceAlpha => gl::SRC_ALPHA,
            LinearBlendingFactor::OneMinusSourceAlpha => gl::ONE_MINUS_SRC_ALPHA,
            LinearBlendingFactor::DestinationAlpha => gl::DST_ALPHA,
            LinearBlendingFactor::OneMinusDestinationAlpha => gl::ONE_MINUS_DST_ALPHA,
            LinearBlendingFactor::SourceAlphaSaturate => gl::SRC_ALPHA_SATURATE,
            LinearBlendingFactor::ConstantColor => gl::CONSTANT_COLOR,
            LinearBlendingFactor::OneMinusConstantColor => gl::ONE_MINUS_CONSTANT_COLOR,
            LinearBlendingFactor::ConstantAlpha => gl::CONSTANT_ALPHA,
            LinearBlendingFactor::OneMinusConstantAlpha => gl::ONE_MINUS_CONSTANT_ALPHA,
        }
    }
}

/// Blending of the fragments with the contents of the framebuffer.
pub trait Blending {
    /// Enables blending with the given parameters.
    ///
    /// `BlendingFunction::Min` and `BlendingFunction::Max` fail with OpenGL 2.1 and
    /// OpenGL ES 2.
    fn blending_enable(&self, blend: &Blend) -> Result<(), Error>;

    /// Disables blending.
    fn blending_disable(&self) -> Result<(), Error>;

    /// Returns true if blending is enabled.
    fn blending_is_enabled(&self) -> bool;

    /// Returns the parameters given to the latest `blending_enable`, if blending is enabled.
    fn blending_current(&self) -> Option<Blend>;
}

impl Blending for GlStates {
    fn blending_enable(&self, blend: &Blend) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        let equations = (blend.color.equation(ctxt.profile)?,
                         blend.alpha.equation(ctxt.profile)?);

        // equations that ignore the factors get the factors of `AlwaysReplace`
        let replace = (LinearBlendingFactor::One, LinearBlendingFactor::Zero);
        let (color_src, color_dst) = blend.color.factors().unwrap_or(replace);
        let (alpha_src, alpha_dst) = blend.alpha.factors().unwrap_or(replace);
        let factors = (color_src.to_glenum(), color_dst.to_glenum(),
                       alpha_src.to_glenum(), alpha_dst.to_glenum());

        trace!("Enabling blending {:?}", blend);
        ctxt.set_enabled(gl::BLEND, true)?;

        ctxt.cached(|caching, state| update(caching, &mut state.blend_equation, equations),
                    format_args!("glBlendEquationSeparate(0x{:x}, 0x{:x})", equations.0,
                                 equations.1),
                    |gl| gl.blend_equation_separate(equations.0, equations.1))?;

        ctxt.cached(|caching, state| update(caching, &mut state.blend_func, factors),
                    format_args!("glBlendFuncSeparate(0x{:x}, 0x{:x}, 0x{:x}, 0x{:x})",
                                 factors.0, factors.1, factors.2, factors.3),
                    |gl| gl.blend_func_separate(factors.0, factors.1, factors.2, factors.3))?;

        if blend.uses_constant() {
            let (r, g, b, a) = blend.constant_value;
            let color = [r, g, b, a];
            ctxt.cached(|caching, state| update(caching, &mut state.blend_color, color),
                        format_args!("glBlendColor({}, {}, {}, {})", r, g, b, a),
                        |gl| gl.blend_color(color))?;
        }

        ctxt.render.blend = Some(*blend);
        Ok(())
    }

    fn blending_disable(&self) -> Result<(), Error> {
        let mut ctxt = self.context.make_current();
        trace!("Disabling blending");
        ctxt.set_enabled(gl::BLEND, false)?;
        ctxt.render.blend = None;
        Ok(())
    }

    fn blending_is_enabled(&self) -> bool {
        self.context.make_current().render.blend.is_some()
    }

    fn blending_current(&self) -> Option<Blend> {
        self.context.make_current().render.blend
    }
}
