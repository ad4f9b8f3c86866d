//! Material library for the baked scene.
//!
//! Holds the three fixed materials the house model uses and the textures they
//! sample. Materials are unlit: the final color is `color * map`, with lighting
//! already baked into the map.
//!
//! # Invariants
//! - The material set is fixed once the library is built.
//! - The only mutation is swapping a loaded texture into a map slot.
//! - Every mutation bumps [`MaterialLibrary::revision`] so GPU backends can
//!   tell when to re-upload.

use bakedscene_assets::TextureData;
use bakedscene_common::{Color, MaterialHandle, TextureHandle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Color of the emissive pole-light material.
pub const POLE_LIGHT_COLOR: Color = Color::from_u32(0xffffe5);

/// The three roles a material plays in the baked scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MaterialSlot {
    /// Baked lighting for the house itself.
    Baked,
    /// Baked lighting for the surrounding environment.
    BakedEnvironment,
    /// Flat emissive color for windows and pole lights.
    PoleLight,
}

impl MaterialSlot {
    pub const ALL: [MaterialSlot; 3] = [
        MaterialSlot::Baked,
        MaterialSlot::BakedEnvironment,
        MaterialSlot::PoleLight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MaterialSlot::Baked => "baked",
            MaterialSlot::BakedEnvironment => "bakedEnv",
            MaterialSlot::PoleLight => "poleLight",
        }
    }

    /// Whether the slot samples a color map.
    pub fn uses_map(self) -> bool {
        !matches!(self, MaterialSlot::PoleLight)
    }
}

/// An unlit material: flat color, optionally multiplied by a color map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub color: Color,
    /// True when the material expects a map, even before it has loaded.
    pub uses_map: bool,
    pub map: Option<TextureHandle>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".into(),
            color: Color::WHITE,
            uses_map: false,
            map: None,
        }
    }
}

impl Material {
    pub fn flat(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            color,
            ..Self::default()
        }
    }

    /// A map material whose texture has not arrived yet.
    pub fn mapped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uses_map: true,
            ..Self::default()
        }
    }

    /// Map requested but not yet bound.
    pub fn is_pending(&self) -> bool {
        self.uses_map && self.map.is_none()
    }
}

/// Errors from material operations.
#[derive(Debug, thiserror::Error)]
pub enum MaterialError {
    #[error("material {0} has no color map slot")]
    NoMapSlot(&'static str),
    #[error("unknown material handle {0:?}")]
    UnknownMaterial(MaterialHandle),
}

/// Events produced by library mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MaterialEvent {
    Created {
        handle: MaterialHandle,
        name: String,
    },
    TextureBound {
        material: MaterialHandle,
        texture: TextureHandle,
    },
}

/// Materials and the textures they reference.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    materials: BTreeMap<MaterialHandle, Material>,
    textures: BTreeMap<TextureHandle, TextureData>,
    slots: BTreeMap<MaterialSlot, MaterialHandle>,
    next_material: u64,
    next_texture: u64,
    revision: u64,
    events: Vec<MaterialEvent>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed set used by the house: two baked map materials and the
    /// pole-light color.
    pub fn baked_scene() -> Self {
        let mut lib = Self::new();
        for slot in MaterialSlot::ALL {
            let material = if slot.uses_map() {
                Material::mapped(slot.name())
            } else {
                Material::flat(slot.name(), POLE_LIGHT_COLOR)
            };
            let handle = lib.insert(material);
            lib.slots.insert(slot, handle);
        }
        lib
    }

    /// Add a material and return its handle.
    pub fn insert(&mut self, material: Material) -> MaterialHandle {
        let handle = MaterialHandle(self.next_material);
        self.next_material += 1;
        self.events.push(MaterialEvent::Created {
            handle,
            name: material.name.clone(),
        });
        self.materials.insert(handle, material);
        self.revision += 1;
        handle
    }

    /// Handle of the material filling `slot`, if the library has one.
    pub fn slot(&self, slot: MaterialSlot) -> Option<MaterialHandle> {
        self.slots.get(&slot).copied()
    }

    /// Store a loaded texture and bind it as the map of `slot`'s material.
    pub fn bind_texture(
        &mut self,
        slot: MaterialSlot,
        texture: TextureData,
    ) -> Result<TextureHandle, MaterialError> {
        if !slot.uses_map() {
            return Err(MaterialError::NoMapSlot(slot.name()));
        }
        let material_handle = self
            .slot(slot)
            .ok_or(MaterialError::NoMapSlot(slot.name()))?;
        let material = self
            .materials
            .get_mut(&material_handle)
            .ok_or(MaterialError::UnknownMaterial(material_handle))?;

        let texture_handle = TextureHandle(self.next_texture);
        self.next_texture += 1;
        tracing::debug!(
            "binding texture {} ({}x{}) to material {}",
            texture.name,
            texture.width,
            texture.height,
            material.name
        );
        material.map = Some(texture_handle);
        self.textures.insert(texture_handle, texture);
        self.events.push(MaterialEvent::TextureBound {
            material: material_handle,
            texture: texture_handle,
        });
        self.revision += 1;
        Ok(texture_handle)
    }

    pub fn get(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(&handle)
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&TextureData> {
        self.textures.get(&handle)
    }

    pub fn materials(&self) -> &BTreeMap<MaterialHandle, Material> {
        &self.materials
    }

    pub fn textures(&self) -> &BTreeMap<TextureHandle, TextureData> {
        &self.textures
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// True once every map material has its texture.
    pub fn is_ready(&self) -> bool {
        self.materials.values().all(|m| !m.is_pending())
    }

    /// Monotonic counter bumped by every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Drain and return all pending material events.
    pub fn drain_events(&mut self) -> Vec<MaterialEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[MaterialEvent] {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baked_scene_has_three_fixed_materials() {
        let lib = MaterialLibrary::baked_scene();
        assert_eq!(lib.len(), 3);

        let pole = lib.get(lib.slot(MaterialSlot::PoleLight).unwrap()).unwrap();
        assert_eq!(pole.color, Color::from_hex("#ffffe5").unwrap());
        assert!(!pole.uses_map);

        let baked = lib.get(lib.slot(MaterialSlot::Baked).unwrap()).unwrap();
        assert!(baked.is_pending());
        assert!(!lib.is_ready());
    }

    #[test]
    fn bind_texture_swaps_map_in() {
        let mut lib = MaterialLibrary::baked_scene();
        let before = lib.revision();
        lib.drain_events();

        let tex = lib
            .bind_texture(MaterialSlot::Baked, TextureData::solid("bakedHouse", [9, 9, 9, 255]))
            .unwrap();
        let baked = lib.get(lib.slot(MaterialSlot::Baked).unwrap()).unwrap();
        assert_eq!(baked.map, Some(tex));
        assert_eq!(lib.texture(tex).unwrap().name, "bakedHouse");
        assert!(lib.revision() > before);
        assert_eq!(lib.events().len(), 1);

        lib.bind_texture(
            MaterialSlot::BakedEnvironment,
            TextureData::solid("bakedEnvironment", [1, 2, 3, 255]),
        )
        .unwrap();
        assert!(lib.is_ready());
    }

    #[test]
    fn pole_light_rejects_texture() {
        let mut lib = MaterialLibrary::baked_scene();
        let err = lib
            .bind_texture(MaterialSlot::PoleLight, TextureData::solid("x", [0; 4]))
            .unwrap_err();
        assert!(matches!(err, MaterialError::NoMapSlot("poleLight")));
        assert!(lib.textures().is_empty());
    }

    #[test]
    fn empty_library_has_no_slots() {
        let mut lib = MaterialLibrary::new();
        assert!(lib.is_empty());
        assert!(lib.is_ready());
        assert!(lib.slot(MaterialSlot::Baked).is_none());
        assert!(
            lib.bind_texture(MaterialSlot::Baked, TextureData::solid("x", [0; 4]))
                .is_err()
        );
    }
}
