use std::fmt;

/// Opaque texture handle handed to the UI toolkit.
///
/// The value is only ever a lookup key into the renderer's binding registry;
/// it is never dereferenced.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(usize);

impl TextureId {
    /// "No texture": the draw inherits whatever texture is currently bound.
    pub const NULL: Self = Self(0);

    /// Reserved handle for the toolkit's font atlas.
    pub const FONT_ATLAS: Self = Self(1);

    /// First handle assigned to a registered texture. Everything below is reserved.
    pub const FIRST_DYNAMIC: Self = Self(100);

    #[inline]
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }

    #[inline]
    pub const fn is_reserved(self) -> bool {
        self.0 < Self::FIRST_DYNAMIC.0
    }

    #[inline]
    pub(crate) fn successor(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
