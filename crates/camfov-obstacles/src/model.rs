//! Model-side input: elements, geometry trees and linked models.

use std::fmt;

use camfov_geom::Curve3d;
use camfov_math::Transform;

use crate::{BuiltInCategory, StyleId};

/// Identifier of a model element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element {}", self.0)
    }
}

/// One node of an element's geometry tree.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryNode {
    /// A solid, contributing its edges.
    Solid {
        /// Edge curves in the node's local frame.
        edges: Vec<Curve3d>,
        /// Graphics style of the solid.
        style: Option<StyleId>,
    },
    /// A standalone curve (model line, centerline, sketch).
    Curve {
        /// The curve in the node's local frame.
        curve: Curve3d,
        /// Graphics style of the curve.
        style: Option<StyleId>,
    },
    /// Nested geometry placed by a local transform.
    Instance {
        /// Local frame of the children, relative to the parent.
        transform: Transform,
        /// Child nodes.
        children: Vec<GeometryNode>,
        /// Graphics style of the instance itself (never filtered on).
        style: Option<StyleId>,
    },
}

/// A model element and its geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelElement {
    /// Element identity.
    pub id: ElementId,
    /// Element category, if the element has one.
    pub category: Option<BuiltInCategory>,
    /// Geometry tree roots.
    pub geometry: Vec<GeometryNode>,
}

/// A sub-model placed into the host by one outer transform.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedModel {
    /// Display name of the link.
    pub name: String,
    /// Placement of the link in host coordinates.
    pub transform: Transform,
    /// The link's elements.
    pub elements: Vec<ModelElement>,
}
