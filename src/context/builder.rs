use std::fmt;
use std::io::Write;
use std::rc::Rc;

use crate::backend::Backend;
use crate::context::{Context, SoftRestrictions};
use crate::driver::{Driver, GlDriver};
use crate::interface::Interface;
use crate::CreationError;

/// Builds an `Interface`.
///
/// ```no_run
/// use glguard::{ContextBuilder, FakeConfig, FakeDriver, SoftRestrictions};
///
/// let interface = ContextBuilder::new()
///     .with_debug(true)
///     .with_state_caching(false)
///     .with_trace(std::io::stderr())
///     .with_soft_restrictions(SoftRestrictions { texture_units: Some(2), ..Default::default() })
///     .build(FakeDriver::new(FakeConfig::gles3()))
///     .unwrap();
/// ```
pub struct ContextBuilder {
    pub(super) debug: bool,
    pub(super) state_caching: bool,
    pub(super) trace: Option<Box<dyn Write>>,
    pub(super) soft_restrictions: SoftRestrictions,
}

impl Default for ContextBuilder {
    fn default() -> ContextBuilder {
        ContextBuilder {
            debug: false,
            state_caching: true,
            trace: None,
            soft_restrictions: SoftRestrictions::default(),
        }
    }
}

impl fmt::Debug for ContextBuilder {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("ContextBuilder")
            .field("debug", &self.debug)
            .field("state_caching", &self.state_caching)
            .field("trace", &self.trace.is_some())
            .field("soft_restrictions", &self.soft_restrictions)
            .finish()
    }
}

impl ContextBuilder {
    /// Default settings: no error checking, state caching enabled, no trace.
    #[inline]
    pub fn new() -> ContextBuilder {
        ContextBuilder::default()
    }

    /// Calls `glGetError` after every driver call, and turns errors into `Error::Driver`.
    ///
    /// This is slow, but pinpoints the exact call that failed.
    #[inline]
    pub fn with_debug(mut self, debug: bool) -> ContextBuilder {
        self.debug = debug;
        self
    }

    /// Skips state-setting and binding calls whose value is already set in the driver.
    #[inline]
    pub fn with_state_caching(mut self, caching: bool) -> ContextBuilder {
        self.state_caching = caching;
        self
    }

    /// Writes every driver call as one line to `output`.
    pub fn with_trace<W: Write + 'static>(mut self, output: W) -> ContextBuilder {
        self.trace = Some(Box::new(output));
        self
    }

    /// Hides part of the driver's capabilities.
    #[inline]
    pub fn with_soft_restrictions(mut self, restrictions: SoftRestrictions) -> ContextBuilder {
        self.soft_restrictions = restrictions;
        self
    }

    /// Builds the interface over an existing driver.
    pub fn build<D: Driver + 'static>(self, driver: D) -> Result<Interface, CreationError> {
        let context = Context::new(Box::new(driver), None, self)?;
        Ok(Interface::new(Rc::new(context)))
    }

    /// Builds the interface over the context of a backend, through the real driver.
    ///
    /// # Safety
    ///
    /// The backend must implement `Backend` correctly, and the context must stay alive for as
    /// long as the interface is used.
    pub unsafe fn build_with_backend<B: Backend + 'static>(self, backend: B)
                                                          -> Result<Interface, CreationError>
    {
        let driver = GlDriver::new(&backend);
        let context = Context::new(Box::new(driver), Some(Box::new(backend)), self)?;
        Ok(Interface::new(Rc::new(context)))
    }
}
