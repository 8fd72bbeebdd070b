//! JSON scene documents: host elements, linked models and cameras.

use anyhow::{bail, Context, Result};
use camfov::geom::{Arc3d, Curve3d, Line3d};
use camfov::math::{LengthUnit, Plane, Point2, Point3, Transform, Vec3};
use camfov::obstacles::{
    BuiltInCategory, CategoryId, CategoryTable, ElementId, ExtractOptions, GeometryNode,
    LinkedModel, ModelElement, ObstacleExtractor, ObstacleSet, StyleId,
};
use camfov::{heading_deg, CameraId};
use serde::{Deserialize, Serialize};

/// A scene file. Lengths are in `unit`; angles are degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Format version string.
    #[serde(default = "default_version")]
    pub version: String,
    /// Length unit of every coordinate in the file.
    #[serde(default)]
    pub unit: LengthUnit,
    /// Elevation of the plan level the obstacles are projected onto.
    #[serde(default)]
    pub level_elevation: f64,
    /// Host model elements.
    #[serde(default)]
    pub elements: Vec<ElementDef>,
    /// Linked models.
    #[serde(default)]
    pub links: Vec<LinkDef>,
    /// Cameras placed in the host.
    #[serde(default)]
    pub cameras: Vec<CameraDef>,
}

fn default_version() -> String {
    "0.1".to_string()
}

/// A model element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDef {
    /// Element id, unique within its model.
    pub id: u64,
    /// Category of the element, if known.
    #[serde(default)]
    pub category: Option<BuiltInCategory>,
    /// Geometry tree.
    pub geometry: Vec<NodeDef>,
}

/// One geometry node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeDef {
    /// Solid given by its edges.
    Solid {
        /// Edge curves.
        edges: Vec<CurveDef>,
        /// Graphics style id.
        #[serde(default)]
        style: Option<u64>,
    },
    /// Standalone curve.
    Curve {
        /// The curve.
        curve: CurveDef,
        /// Graphics style id.
        #[serde(default)]
        style: Option<u64>,
    },
    /// Nested geometry under a local placement.
    Instance {
        /// Local origin.
        #[serde(default)]
        offset: [f64; 3],
        /// Rotation about Z in degrees.
        #[serde(default)]
        rotation_deg: f64,
        /// Child nodes.
        children: Vec<NodeDef>,
    },
}

/// One curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CurveDef {
    /// Straight segment.
    Line {
        /// Start point.
        start: [f64; 3],
        /// End point.
        end: [f64; 3],
    },
    /// Arc through three points.
    Arc {
        /// Start point.
        start: [f64; 3],
        /// Point between start and end.
        mid: [f64; 3],
        /// End point.
        end: [f64; 3],
    },
    /// Closed horizontal circle.
    Circle {
        /// Center point.
        center: [f64; 3],
        /// Radius.
        radius: f64,
    },
}

/// A linked model with its own category tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDef {
    /// Link name.
    pub name: String,
    /// Placement of the link origin in the host.
    #[serde(default)]
    pub offset: [f64; 3],
    /// Rotation of the link about Z in degrees.
    #[serde(default)]
    pub rotation_deg: f64,
    /// Categories of the linked document.
    #[serde(default)]
    pub categories: Vec<CategoryDef>,
    /// Graphics styles of the linked document.
    #[serde(default)]
    pub styles: Vec<StyleDef>,
    /// Elements of the linked document.
    #[serde(default)]
    pub elements: Vec<ElementDef>,
}

/// A category or subcategory of a linked document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDef {
    /// Category id.
    pub id: u64,
    /// Built-in identity of a top-level category.
    #[serde(default)]
    pub builtin: Option<BuiltInCategory>,
    /// Parent of a subcategory.
    #[serde(default)]
    pub parent: Option<u64>,
}

/// Graphics style to category assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDef {
    /// Style id.
    pub id: u64,
    /// Category id.
    pub category: u64,
}

/// A placed camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDef {
    /// Camera element id.
    pub id: u64,
    /// Insertion point.
    pub position: [f64; 3],
    /// Family placement rotation; 90 looks along +X.
    #[serde(default = "default_placement")]
    pub placement_rotation_deg: f64,
    /// Extra rotation set by the user.
    #[serde(default)]
    pub rotation_deg: f64,
    /// Full view angle; the settings default when absent.
    #[serde(default)]
    pub fov_deg: Option<f64>,
    /// View range.
    pub range: f64,
}

fn default_placement() -> f64 {
    90.0
}

/// Which linked models contribute obstacles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkFilter {
    /// Every link.
    All,
    /// Host elements only.
    None,
    /// Only the named links.
    Named(Vec<String>),
}

impl LinkFilter {
    /// Parse `all`, `none` or a comma-separated list of link names.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "all" => LinkFilter::All,
            "none" => LinkFilter::None,
            names => LinkFilter::Named(
                names
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }

    fn accepts(&self, name: &str) -> bool {
        match self {
            LinkFilter::All => true,
            LinkFilter::None => false,
            LinkFilter::Named(names) => names.iter().any(|n| n == name),
        }
    }
}

/// A camera converted to meters and a plan heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedCamera {
    /// Camera id.
    pub id: CameraId,
    /// Position on the plan.
    pub position: Point2,
    /// Heading in degrees.
    pub heading_deg: f64,
    /// Full view angle, if set.
    pub fov_deg: Option<f64>,
    /// Range in meters.
    pub range: f64,
}

impl Scene {
    /// Parse a scene from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let scene: Scene = serde_json::from_str(json).context("invalid scene document")?;
        Ok(scene)
    }

    /// Load a scene file.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read scene {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Projection plane at the level elevation, in meters.
    pub fn plane(&self) -> Plane {
        Plane::horizontal(self.unit.to_meters(self.level_elevation))
    }

    /// Host elements in meters.
    pub fn host_elements(&self) -> Result<Vec<ModelElement>> {
        self.elements.iter().map(|e| self.element(e)).collect()
    }

    /// Linked models in meters, each with its category table.
    pub fn linked_models(&self, filter: &LinkFilter) -> Result<Vec<(LinkedModel, CategoryTable)>> {
        if let LinkFilter::Named(names) = filter {
            let known = |n: &&String| self.links.iter().any(|l| &l.name == *n);
            if let Some(missing) = names.iter().find(|n| !known(n)) {
                bail!("scene has no link named `{missing}`");
            }
        }
        self.links
            .iter()
            .filter(|link| filter.accepts(&link.name))
            .map(|link| {
                let elements = link
                    .elements
                    .iter()
                    .map(|e| self.element(e))
                    .collect::<Result<Vec<_>>>()
                    .with_context(|| format!("in link `{}`", link.name))?;
                let model = LinkedModel {
                    name: link.name.clone(),
                    transform: Transform::placement(self.vec(&link.offset), link.rotation_deg),
                    elements,
                };
                Ok((model, category_table(link)))
            })
            .collect()
    }

    /// Extract the obstacle set of the host and the accepted links.
    pub fn obstacles(&self, options: &ExtractOptions, links: &LinkFilter) -> Result<ObstacleSet> {
        let host = self.host_elements()?;
        let linked = self.linked_models(links)?;
        let mut extractor = ObstacleExtractor::new(self.plane(), options.clone());
        extractor.add_host_elements(&host);
        for (model, table) in &linked {
            extractor.add_linked_model(model, table);
        }
        Ok(extractor.finish())
    }

    /// Cameras in meters, optionally only the one with `id`.
    pub fn cameras(&self, id: Option<u64>) -> Result<Vec<PlacedCamera>> {
        let cameras: Vec<PlacedCamera> = self
            .cameras
            .iter()
            .filter(|c| id.map_or(true, |id| c.id == id))
            .map(|c| PlacedCamera {
                id: CameraId(c.id),
                position: Point2::new(
                    self.unit.to_meters(c.position[0]),
                    self.unit.to_meters(c.position[1]),
                ),
                heading_deg: heading_deg(c.placement_rotation_deg, c.rotation_deg),
                fov_deg: c.fov_deg,
                range: self.unit.to_meters(c.range),
            })
            .collect();
        match (id, cameras.is_empty()) {
            (Some(id), true) => bail!("scene has no camera {id}"),
            _ => Ok(cameras),
        }
    }

    fn element(&self, def: &ElementDef) -> Result<ModelElement> {
        let geometry = def
            .geometry
            .iter()
            .map(|n| self.node(n))
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("element {}", def.id))?;
        Ok(ModelElement {
            id: ElementId(def.id),
            category: def.category,
            geometry,
        })
    }

    fn node(&self, def: &NodeDef) -> Result<GeometryNode> {
        Ok(match def {
            NodeDef::Solid { edges, style } => {
                let mut curves = Vec::with_capacity(edges.len());
                for edge in edges {
                    curves.extend(self.curves(edge)?);
                }
                GeometryNode::Solid {
                    edges: curves,
                    style: style.map(StyleId),
                }
            }
            NodeDef::Curve { curve, style } => {
                let mut parts = self.curves(curve)?;
                let style = style.map(StyleId);
                if parts.len() == 1 {
                    GeometryNode::Curve {
                        curve: parts.remove(0),
                        style,
                    }
                } else {
                    GeometryNode::Instance {
                        transform: Transform::identity(),
                        children: parts
                            .into_iter()
                            .map(|curve| GeometryNode::Curve { curve, style })
                            .collect(),
                        style,
                    }
                }
            }
            NodeDef::Instance {
                offset,
                rotation_deg,
                children,
            } => GeometryNode::Instance {
                transform: Transform::placement(self.vec(offset), *rotation_deg),
                children: children.iter().map(|c| self.node(c)).collect::<Result<_>>()?,
                style: None,
            },
        })
    }

    fn curves(&self, def: &CurveDef) -> Result<Vec<Curve3d>> {
        Ok(match def {
            CurveDef::Line { start, end } => {
                vec![Curve3d::Line(Line3d::new(self.point(start), self.point(end)))]
            }
            CurveDef::Arc { start, mid, end } => vec![Curve3d::Arc(Arc3d::new(
                self.point(start),
                self.point(mid),
                self.point(end),
            ))],
            CurveDef::Circle { center, radius } => Arc3d::full_circle(
                self.point(center),
                Vec3::x(),
                Vec3::y(),
                self.unit.to_meters(*radius),
            )?
            .into_iter()
            .map(Curve3d::Arc)
            .collect(),
        })
    }

    fn point(&self, p: &[f64; 3]) -> Point3 {
        Point3::from(self.vec(p))
    }

    fn vec(&self, p: &[f64; 3]) -> Vec3 {
        Vec3::new(
            self.unit.to_meters(p[0]),
            self.unit.to_meters(p[1]),
            self.unit.to_meters(p[2]),
        )
    }
}

fn category_table(link: &LinkDef) -> CategoryTable {
    let mut table = CategoryTable::new();
    for category in &link.categories {
        if let Some(builtin) = category.builtin {
            table.add_category(CategoryId(category.id), builtin);
        }
        if let Some(parent) = category.parent {
            table.add_subcategory(CategoryId(category.id), CategoryId(parent));
        }
    }
    for style in &link.styles {
        table.add_style(StyleId(style.id), CategoryId(style.category));
    }
    table
}
