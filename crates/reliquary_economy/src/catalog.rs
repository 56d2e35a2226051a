//! # Item Catalog
//!
//! Read-only reference data: item templates keyed by a stable string id.
//!
//! Templates are loaded once at startup (usually from TOML) and never
//! mutated afterwards. Instances hold an `Arc` to their template, so the
//! catalog can be dropped or reloaded without touching live items.
//!
//! ```toml
//! [[templates]]
//! id = "iron-sword"
//! base_name = "Iron Sword"
//! category = "Equipment"
//! equippable = true
//! equip_slot = "Weapon"
//! allowed_affixes = ["Athlete", "Champion"]
//! flavor_text = "Heavy, honest, a little rusty."
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::equipment::EquipmentSlot;
use crate::error::{EconomyError, EconomyResult};
use crate::item::{AffixKind, Rarity};

/// Broad item category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum ItemCategory {
    /// Used up on use.
    Consumable,
    /// Crafting input.
    Material,
    /// Gear with one declared slot.
    Equipment,
    /// Fits any of the four upgrade slots.
    Upgrade,
}

/// Immutable definition of an item kind.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ItemTemplate {
    /// Stable id. Auto-assigned by the catalog when empty.
    #[serde(default)]
    pub id: String,
    /// Display base name.
    pub base_name: String,
    /// Rarity shown before any roll.
    #[serde(default)]
    pub default_rarity: Rarity,
    /// Category.
    pub category: ItemCategory,
    /// Whether the item can be equipped.
    #[serde(default)]
    pub equippable: bool,
    /// Declared slot for non-upgrade equipment.
    #[serde(default)]
    pub equip_slot: Option<EquipmentSlot>,
    /// Affixes the generator may roll.
    #[serde(default)]
    pub allowed_affixes: Vec<AffixKind>,
    /// Flavor text.
    #[serde(default)]
    pub flavor_text: String,
}

impl ItemTemplate {
    /// Creates a non-equippable template with no affixes.
    #[must_use]
    pub fn new(id: impl Into<String>, base_name: impl Into<String>, category: ItemCategory) -> Self {
        Self {
            id: id.into(),
            base_name: base_name.into(),
            default_rarity: Rarity::Common,
            category,
            equippable: false,
            equip_slot: None,
            allowed_affixes: Vec::new(),
            flavor_text: String::new(),
        }
    }

    /// Marks the template equippable in `slot`.
    #[must_use]
    pub fn equippable_in(mut self, slot: EquipmentSlot) -> Self {
        self.equippable = true;
        self.equip_slot = Some(slot);
        self
    }

    /// Sets the affix pool.
    #[must_use]
    pub fn with_affixes(mut self, affixes: impl IntoIterator<Item = AffixKind>) -> Self {
        self.allowed_affixes = affixes.into_iter().collect();
        self
    }

    /// Sets the flavor text.
    #[must_use]
    pub fn with_flavor(mut self, text: impl Into<String>) -> Self {
        self.flavor_text = text.into();
        self
    }

    /// Whether an item of this template may occupy `slot`.
    ///
    /// Upgrades fit any upgrade slot; everything else must match its
    /// declared slot exactly.
    #[must_use]
    pub fn accepts_slot(&self, slot: EquipmentSlot) -> bool {
        if !self.equippable {
            return false;
        }
        if self.category == ItemCategory::Upgrade {
            slot.is_upgrade()
        } else {
            self.equip_slot == Some(slot)
        }
    }
}

/// Resolves template ids back to templates (used when loading saves).
pub trait TemplateResolver {
    /// Looks up a template by id.
    fn resolve(&self, template_id: &str) -> Option<Arc<ItemTemplate>>;
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    templates: Vec<ItemTemplate>,
}

/// The item catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    templates: BTreeMap<String, Arc<ItemTemplate>>,
    next_auto_id: u32,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a catalog from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` on malformed TOML and `DuplicateTemplate`
    /// when two templates share an id.
    pub fn from_toml_str(text: &str) -> EconomyResult<Self> {
        let file: CatalogFile = toml::from_str(text)?;
        let mut catalog = Self::new();
        for template in file.templates {
            catalog.insert(template)?;
        }
        tracing::info!("Loaded item catalog with {} templates", catalog.len());
        Ok(catalog)
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`Catalog::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> EconomyResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Registers a template, assigning an id if it has none.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateTemplate` if the id is already taken.
    pub fn insert(&mut self, mut template: ItemTemplate) -> EconomyResult<Arc<ItemTemplate>> {
        if template.id.is_empty() {
            template.id = self.assign_id(&template.base_name);
        }
        if self.templates.contains_key(&template.id) {
            return Err(EconomyError::DuplicateTemplate(template.id));
        }
        let template = Arc::new(template);
        self.templates
            .insert(template.id.clone(), Arc::clone(&template));
        Ok(template)
    }

    /// Gets a template by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<ItemTemplate>> {
        self.templates.get(id)
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// All templates, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ItemTemplate>> {
        self.templates.values()
    }

    fn assign_id(&mut self, base_name: &str) -> String {
        let slug: String = base_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect();
        let slug = slug.trim_matches('-');
        let slug = if slug.is_empty() { "item" } else { slug };

        loop {
            self.next_auto_id += 1;
            let id = format!("{slug}-{:04}", self.next_auto_id);
            if !self.templates.contains_key(&id) {
                return id;
            }
        }
    }
}

impl TemplateResolver for Catalog {
    fn resolve(&self, template_id: &str) -> Option<Arc<ItemTemplate>> {
        self.templates.get(template_id).cloned()
    }
}
