/*!

The `backend` module allows one to link between glguard and the OpenGL context that the
caller owns.

Glguard never creates windows or contexts. If you already have a context, implement the
`Backend` trait for it and pass it to `ContextBuilder::build_with_backend`. The
`GlDriver` loads every OpenGL function through `get_proc_address`.

*/
use std::ffi::c_void;
use std::ops::Deref;
use std::rc::Rc;

/// Trait for types that can be used as a backend for a glguard context.
///
/// This trait is unsafe, as you can get undefined behaviors or crashes if you don't implement
/// the methods correctly.
pub unsafe trait Backend {
    /// Returns the address of an OpenGL function.
    ///
    /// Supposes that the context has been made current before this function is called.
    unsafe fn get_proc_address(&self, symbol: &str) -> *const c_void;

    /// Returns true if the OpenGL context is the current one in the thread.
    fn is_current(&self) -> bool;

    /// Makes the OpenGL context the current context in the current thread.
    unsafe fn make_current(&self);
}

unsafe impl<T> Backend for Rc<T> where T: Backend {
    unsafe fn get_proc_address(&self, symbol: &str) -> *const c_void {
        self.deref().get_proc_address(symbol)
    }

    fn is_current(&self) -> bool {
        self.deref().is_current()
    }

    unsafe fn make_current(&self) {
        self.deref().make_current();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::ffi::c_void;
    use std::ptr;
    use std::rc::Rc;

    use super::Backend;

    /// A context that only knows whether it is current.
    struct Headless {
        current: Cell<bool>,
    }

    unsafe impl Backend for Headless {
        unsafe fn get_proc_address(&self, _: &str) -> *const c_void {
            ptr::null()
        }

        fn is_current(&self) -> bool {
            self.current.get()
        }

        unsafe fn make_current(&self) {
            self.current.set(true);
        }
    }

    #[test]
    fn shared_backends_forward() {
        let backend = Rc::new(Headless { current: Cell::new(false) });
        let shared: &dyn Backend = &backend;
        assert!(!shared.is_current());
        unsafe {
            shared.make_current();
            assert!(shared.get_proc_address("glClear").is_null());
        }
        assert!(backend.is_current());
    }
}
