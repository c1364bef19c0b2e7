//! Storage for the objects that a context owns.
//!
//! Each kind of object lives in its own `Arena`. A slot keeps a generation counter that is
//! incremented every time the object inside is removed, so a handle that points to a removed
//! object can never reach whatever is stored in the slot afterwards.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::array_object::ArrayObject;
use crate::buffer::ArrayBuffer;
use crate::context::UnitBinding;
use crate::framebuffer::Framebuffer;
use crate::gl;
use crate::index::IndexBuffer;
use crate::program::Program;
use crate::PreconditionError;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Returns an identifier that no other context of this process uses.
pub(crate) fn new_context_id() -> u64 {
    NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// The kinds of objects that a context manages.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// An array buffer.
    ArrayBuffer,
    /// An index buffer.
    IndexBuffer,
    /// A vertex array object.
    ArrayObject,
    /// A two-dimensional texture.
    Texture2D,
    /// A cube map texture.
    TextureCube,
    /// A renderbuffer.
    Renderbuffer,
    /// A framebuffer.
    Framebuffer,
    /// A vertex shader.
    VertexShader,
    /// A geometry shader.
    GeometryShader,
    /// A fragment shader.
    FragmentShader,
    /// A linked program.
    Program,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            ResourceKind::ArrayBuffer => "array buffer",
            ResourceKind::IndexBuffer => "index buffer",
            ResourceKind::ArrayObject => "array object",
            ResourceKind::Texture2D => "2D texture",
            ResourceKind::TextureCube => "cube texture",
            ResourceKind::Renderbuffer => "renderbuffer",
            ResourceKind::Framebuffer => "framebuffer",
            ResourceKind::VertexShader => "vertex shader",
            ResourceKind::GeometryShader => "geometry shader",
            ResourceKind::FragmentShader => "fragment shader",
            ResourceKind::Program => "program",
        };

        fmt.write_str(name)
    }
}

/// Points to a slot of an `Arena`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) struct RawHandle {
    index: u32,
    generation: u32,
    context: u64,
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Generation-checked storage for the objects of one kind.
pub(crate) struct Arena<T> {
    kind: ResourceKind,
    context: u64,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Arena<T> {
    pub fn new(kind: ResourceKind, context: u64) -> Arena<T> {
        Arena {
            kind,
            context,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Stores a new object and returns a handle to it.
    pub fn insert(&mut self, value: T) -> RawHandle {
        self.insert_with(|_| value)
    }

    /// Stores the object built by `f`, which receives the handle of the new slot.
    pub fn insert_with<F>(&mut self, f: F) -> RawHandle where F: FnOnce(RawHandle) -> T {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.value.is_none());
            let handle = RawHandle { index, generation: slot.generation, context: self.context };
            slot.value = Some(f(handle));
            return handle;
        }

        let index = self.slots.len() as u32;
        let handle = RawHandle { index, generation: 0, context: self.context };
        self.slots.push(Slot { generation: 0, value: Some(f(handle)) });
        handle
    }

    fn check(&self, handle: RawHandle) -> Result<usize, PreconditionError> {
        if handle.context != self.context {
            return Err(PreconditionError::WrongContext(self.kind));
        }

        match self.slots.get(handle.index as usize) {
            Some(slot) if slot.generation == handle.generation && slot.value.is_some() =>
                Ok(handle.index as usize),
            _ => Err(PreconditionError::Deleted(self.kind)),
        }
    }

    pub fn get(&self, handle: RawHandle) -> Result<&T, PreconditionError> {
        let index = self.check(handle)?;
        Ok(self.slots[index].value.as_ref().unwrap())
    }

    pub fn get_mut(&mut self, handle: RawHandle) -> Result<&mut T, PreconditionError> {
        let index = self.check(handle)?;
        Ok(self.slots[index].value.as_mut().unwrap())
    }

    /// Returns true if the handle points to a live object of this arena.
    pub fn contains(&self, handle: RawHandle) -> bool {
        self.check(handle).is_ok()
    }

    /// Removes the object. Every handle to it becomes stale.
    pub fn remove(&mut self, handle: RawHandle) -> Result<T, PreconditionError> {
        let index = self.check(handle)?;
        let slot = &mut self.slots[index];
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index as u32);
        Ok(slot.value.take().unwrap())
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.slots.iter_mut().filter_map(|slot| slot.value.as_mut())
    }

    pub fn iter(&self) -> impl Iterator<Item = (RawHandle, &T)> + '_ {
        let context = self.context;
        self.slots.iter().enumerate().filter_map(move |(index, slot)| {
            slot.value.as_ref().map(|value| {
                (RawHandle { index: index as u32, generation: slot.generation, context }, value)
            })
        })
    }
}

/// What the context knows about an object.
#[derive(Debug, Clone)]
pub(crate) struct Record {
    /// The name returned by the driver.
    pub id: gl::types::GLuint,
    /// Shown in log messages.
    pub label: String,
}

impl Record {
    pub fn new(id: gl::types::GLuint, label: String) -> Record {
        Record { id, label }
    }
}

/// All the objects of a context.
pub(crate) struct Resources {
    pub array_buffers: Arena<ArrayBuffer>,
    pub index_buffers: Arena<IndexBuffer>,
    pub array_objects: Arena<ArrayObject>,
    pub textures_2d: Arena<Record>,
    pub textures_cube: Arena<Record>,
    pub renderbuffers: Arena<Record>,
    pub framebuffers: Arena<Framebuffer>,
    pub vertex_shaders: Arena<Record>,
    pub geometry_shaders: Arena<Record>,
    pub fragment_shaders: Arena<Record>,
    pub programs: Arena<Program>,
}

impl Resources {
    pub fn new(context: u64) -> Resources {
        Resources {
            array_buffers: Arena::new(ResourceKind::ArrayBuffer, context),
            index_buffers: Arena::new(ResourceKind::IndexBuffer, context),
            array_objects: Arena::new(ResourceKind::ArrayObject, context),
            textures_2d: Arena::new(ResourceKind::Texture2D, context),
            textures_cube: Arena::new(ResourceKind::TextureCube, context),
            renderbuffers: Arena::new(ResourceKind::Renderbuffer, context),
            framebuffers: Arena::new(ResourceKind::Framebuffer, context),
            vertex_shaders: Arena::new(ResourceKind::VertexShader, context),
            geometry_shaders: Arena::new(ResourceKind::GeometryShader, context),
            fragment_shaders: Arena::new(ResourceKind::FragmentShader, context),
            programs: Arena::new(ResourceKind::Program, context),
        }
    }

    /// Returns the live framebuffers that have this texture attached.
    pub fn framebuffers_with(&self, texture: UnitBinding)
                             -> impl Iterator<Item = RawHandle> + '_
    {
        self.framebuffers.iter()
            .filter(move |(_, fb)| fb.textures.contains(&texture))
            .map(|(raw, _)| raw)
    }
}
