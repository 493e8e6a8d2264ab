//! Typed resource id newtypes.
//!
//! Each resource kind gets its own id type so a texture id can never be
//! passed where a shader id is expected. All of them wrap the same
//! generation-checked [`RawHandle`] and are `Pod`, so the command protocol
//! carries them byte-for-byte.

use bytemuck::{Pod, Zeroable};
use ember_core::RawHandle;

/// Defines a `Pod` newtype id over [`RawHandle`].
macro_rules! resource_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Pod, Zeroable)]
        #[repr(transparent)]
        pub struct $name(RawHandle);

        impl $name {
            /// Wraps a raw table handle.
            #[inline]
            #[must_use]
            pub const fn from_raw(raw: RawHandle) -> Self {
                Self(raw)
            }

            /// Returns the underlying table handle.
            #[inline]
            #[must_use]
            pub const fn raw(self) -> RawHandle {
                self.0
            }
        }
    };
}

resource_id! {
    /// Id of a vertex buffer (static or dynamic).
    VertexBufferId
}

resource_id! {
    /// Id of an index buffer (static or dynamic).
    IndexBufferId
}

resource_id! {
    /// Id of a texture.
    TextureId
}

resource_id! {
    /// Id of a single shader stage.
    ShaderId
}

resource_id! {
    /// Id of a linked GPU program (vertex + fragment shader).
    GpuProgramId
}

resource_id! {
    /// Id of a user-declared uniform.
    UniformId
}

resource_id! {
    /// Id of an offscreen render target. Creation is a declared future
    /// extension; the id type exists so layers can already name one.
    RenderTargetId
}
