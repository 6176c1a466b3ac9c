use std::collections::HashMap;
use std::hash::Hash;

use crate::draw::TextureId;
use crate::error::{RenderError, Result};

struct BindingEntry<K, G> {
    texture: K,
    binding: G,
}

/// Texture ↔ binding cache.
///
/// Two indexes over the same entries:
/// - by texture identity, so a texture is bound at most once
/// - by `TextureId`, for draw-time resolution
///
/// Ids start at `TextureId::FIRST_DYNAMIC`, increase monotonically and are
/// never reused, even after removal. Entries live until removed explicitly.
pub struct BindingRegistry<K, G> {
    by_texture: HashMap<K, TextureId>,
    by_id: HashMap<TextureId, BindingEntry<K, G>>,
    next_id: TextureId,
}

impl<K, G> BindingRegistry<K, G>
where
    K: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::starting_at(TextureId::FIRST_DYNAMIC)
    }

    pub(crate) fn starting_at(first: TextureId) -> Self {
        Self {
            by_texture: HashMap::new(),
            by_id: HashMap::new(),
            next_id: first,
        }
    }

    /// Existing id for `texture`, if registered.
    #[inline]
    pub fn get(&self, texture: &K) -> Option<TextureId> {
        self.by_texture.get(texture).copied()
    }

    /// Returns the id of `texture`, creating its binding with `create` if needed.
    ///
    /// `create` runs only for unregistered textures. If it fails, nothing is
    /// recorded and no id is consumed.
    pub fn get_or_insert_with<F>(&mut self, texture: &K, create: F) -> Result<TextureId>
    where
        F: FnOnce() -> Result<G>,
    {
        if let Some(id) = self.get(texture) {
            return Ok(id);
        }

        let id = self.next_id;
        let successor = id.successor().ok_or(RenderError::HandleSpaceExhausted)?;
        let binding = create()?;

        self.next_id = successor;
        self.by_texture.insert(texture.clone(), id);
        self.by_id.insert(
            id,
            BindingEntry {
                texture: texture.clone(),
                binding,
            },
        );
        Ok(id)
    }

    /// Removes `texture` from both indexes and hands back its binding.
    ///
    /// Returns `None` for textures that were never registered.
    pub fn remove(&mut self, texture: &K) -> Option<G> {
        let id = self.by_texture.remove(texture)?;
        self.by_id.remove(&id).map(|entry| entry.binding)
    }

    /// Binding registered under `id`. Reserved ids never resolve.
    #[inline]
    pub fn resolve(&self, id: TextureId) -> Option<&G> {
        self.by_id.get(&id).map(|entry| &entry.binding)
    }

    /// Texture registered under `id`.
    #[inline]
    pub fn texture(&self, id: TextureId) -> Option<&K> {
        self.by_id.get(&id).map(|entry| &entry.texture)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Empties the registry, yielding every binding for release.
    ///
    /// The id counter is kept, so ids handed out before the drain stay dead.
    pub fn drain(&mut self) -> impl Iterator<Item = G> + '_ {
        self.by_texture.clear();
        self.by_id.drain().map(|(_, entry)| entry.binding)
    }
}

impl<K, G> Default for BindingRegistry<K, G>
where
    K: Clone + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    type Registry = BindingRegistry<&'static str, String>;

    fn bind(name: &'static str) -> impl FnOnce() -> Result<String> {
        move || Ok(format!("binding:{name}"))
    }

    #[test]
    fn same_texture_returns_same_id_and_creates_once() {
        let mut reg = Registry::new();
        let calls = Cell::new(0);
        let create = || {
            calls.set(calls.get() + 1);
            Ok("b".to_string())
        };

        let a = reg.get_or_insert_with(&"tex", create).unwrap();
        let b = reg.get_or_insert_with(&"tex", || panic!("must not recreate")).unwrap();

        assert_eq!(a, b);
        assert_eq!(calls.get(), 1);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn resolve_inverts_registration() {
        let mut reg = Registry::new();
        let id = reg.get_or_insert_with(&"t", bind("t")).unwrap();
        assert_eq!(reg.resolve(id).map(String::as_str), Some("binding:t"));
        assert_eq!(reg.texture(id), Some(&"t"));

        assert_eq!(reg.remove(&"t").as_deref(), Some("binding:t"));
        assert!(reg.resolve(id).is_none());
        assert!(reg.get(&"t").is_none());

        let again = reg.get_or_insert_with(&"t", bind("t")).unwrap();
        assert_ne!(again, id);
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let mut reg = BindingRegistry::<u32, u32>::new();
        let ids: Vec<TextureId> = (0..32)
            .map(|t| reg.get_or_insert_with(&t, || Ok(t)).unwrap())
            .collect();

        assert_eq!(ids[0], TextureId::FIRST_DYNAMIC);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn removed_ids_are_never_reused() {
        let mut reg = Registry::new();

        let a = reg.get_or_insert_with(&"A", bind("A")).unwrap();
        let b = reg.get_or_insert_with(&"B", bind("B")).unwrap();
        assert_eq!(a, TextureId::new(100));
        assert_eq!(b, TextureId::new(101));

        reg.remove(&"A");
        let c = reg.get_or_insert_with(&"C", bind("C")).unwrap();
        assert_eq!(c, TextureId::new(102));

        assert!(reg.resolve(TextureId::new(100)).is_none());
        assert_eq!(
            reg.resolve(TextureId::new(101)).map(String::as_str),
            Some("binding:B")
        );
    }

    #[test]
    fn removing_unknown_texture_is_a_no_op() {
        let mut reg = Registry::new();
        reg.get_or_insert_with(&"kept", bind("kept")).unwrap();
        assert!(reg.remove(&"never-registered").is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn reserved_ids_do_not_resolve() {
        let mut reg = Registry::new();
        reg.get_or_insert_with(&"t", bind("t")).unwrap();
        assert!(reg.resolve(TextureId::FONT_ATLAS).is_none());
        assert!(reg.resolve(TextureId::NULL).is_none());
    }

    #[test]
    fn failed_creation_consumes_no_id() {
        let mut reg = Registry::new();
        let err = reg.get_or_insert_with(&"bad", || Err(RenderError::allocation("bind group", "oom")));
        assert!(matches!(err, Err(RenderError::ResourceAllocation { .. })));
        assert!(reg.is_empty());

        let id = reg.get_or_insert_with(&"good", bind("good")).unwrap();
        assert_eq!(id, TextureId::FIRST_DYNAMIC);
    }

    #[test]
    fn exhausted_id_space_is_an_error() {
        let mut reg = Registry::starting_at(TextureId::new(usize::MAX));
        let err = reg.get_or_insert_with(&"t", || panic!("must not allocate"));
        assert!(matches!(err, Err(RenderError::HandleSpaceExhausted)));
    }

    #[test]
    fn drain_keeps_id_counter() {
        let mut reg = Registry::new();
        reg.get_or_insert_with(&"a", bind("a")).unwrap();
        reg.get_or_insert_with(&"b", bind("b")).unwrap();

        let mut drained: Vec<String> = reg.drain().collect();
        drained.sort();
        assert_eq!(drained, vec!["binding:a", "binding:b"]);
        assert!(reg.is_empty());

        let next = reg.get_or_insert_with(&"a", bind("a")).unwrap();
        assert_eq!(next, TextureId::new(102));
    }
}
