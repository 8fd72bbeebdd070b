//! Element categories and graphics-style resolution.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Built-in model categories the extractor knows by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltInCategory {
    /// Walls.
    Walls,
    /// Structural columns.
    StructuralColumns,
    /// Architectural columns.
    Columns,
    /// Doors.
    Doors,
    /// Windows.
    Windows,
    /// Curtain wall panels.
    CurtainWallPanels,
    /// Curtain wall mullions.
    CurtainWallMullions,
    /// Floors.
    Floors,
    /// Furniture.
    Furniture,
    /// Generic models.
    GenericModels,
    /// Model and detail lines.
    Lines,
    /// Rooms.
    Rooms,
}

impl fmt::Display for BuiltInCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuiltInCategory::Walls => "walls",
            BuiltInCategory::StructuralColumns => "structural_columns",
            BuiltInCategory::Columns => "columns",
            BuiltInCategory::Doors => "doors",
            BuiltInCategory::Windows => "windows",
            BuiltInCategory::CurtainWallPanels => "curtain_wall_panels",
            BuiltInCategory::CurtainWallMullions => "curtain_wall_mullions",
            BuiltInCategory::Floors => "floors",
            BuiltInCategory::Furniture => "furniture",
            BuiltInCategory::GenericModels => "generic_models",
            BuiltInCategory::Lines => "lines",
            BuiltInCategory::Rooms => "rooms",
        };
        f.write_str(name)
    }
}

/// Categories that block a camera's view: structure and openings.
pub fn default_whitelist() -> BTreeSet<BuiltInCategory> {
    [
        BuiltInCategory::Walls,
        BuiltInCategory::StructuralColumns,
        BuiltInCategory::Columns,
        BuiltInCategory::Doors,
        BuiltInCategory::Windows,
        BuiltInCategory::CurtainWallPanels,
        BuiltInCategory::CurtainWallMullions,
    ]
    .into_iter()
    .collect()
}

/// Graphics style of a geometry primitive, scoped to one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StyleId(pub u64);

/// Category or subcategory, scoped to one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(pub u64);

/// Maximum parent-chain depth before a category tree is treated as cyclic.
const MAX_CATEGORY_DEPTH: usize = 32;

/// Host lookup from graphics styles to categories.
///
/// Implementations are pure lookups. A `None` anywhere in the chain means
/// "unknown", which callers treat as keep.
pub trait CategoryResolver {
    /// Category assigned to a graphics style.
    fn style_category(&self, style: StyleId) -> Option<CategoryId>;

    /// Parent of a subcategory; `None` for a top-level category.
    fn parent(&self, category: CategoryId) -> Option<CategoryId>;

    /// Built-in identity of a top-level category.
    fn builtin(&self, category: CategoryId) -> Option<BuiltInCategory>;

    /// Walk from a style to its top-level category.
    ///
    /// Returns `None` if the style has no category or the parent chain does
    /// not terminate.
    fn top_level(&self, style: StyleId) -> Option<CategoryId> {
        let mut current = self.style_category(style)?;
        for _ in 0..MAX_CATEGORY_DEPTH {
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return Some(current),
            }
        }
        None
    }
}

/// In-memory [`CategoryResolver`] built from a style map and a category tree.
#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    styles: HashMap<StyleId, CategoryId>,
    parents: HashMap<CategoryId, CategoryId>,
    builtins: HashMap<CategoryId, BuiltInCategory>,
}

impl CategoryTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a top-level category with its built-in identity.
    pub fn add_category(&mut self, id: CategoryId, builtin: BuiltInCategory) -> &mut Self {
        self.builtins.insert(id, builtin);
        self
    }

    /// Register a subcategory under `parent`.
    pub fn add_subcategory(&mut self, id: CategoryId, parent: CategoryId) -> &mut Self {
        self.parents.insert(id, parent);
        self
    }

    /// Assign a graphics style to a category.
    pub fn add_style(&mut self, style: StyleId, category: CategoryId) -> &mut Self {
        self.styles.insert(style, category);
        self
    }
}

impl CategoryResolver for CategoryTable {
    fn style_category(&self, style: StyleId) -> Option<CategoryId> {
        self.styles.get(&style).copied()
    }

    fn parent(&self, category: CategoryId) -> Option<CategoryId> {
        self.parents.get(&category).copied()
    }

    fn builtin(&self, category: CategoryId) -> Option<BuiltInCategory> {
        self.builtins.get(&category).copied()
    }
}
