//! Geometry traversal, projection and deduplication.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use camfov_geom::{Arc2d, Curve2d, Curve3d, GeomError, Line2d};
use camfov_math::{Plane, Point2, Transform, SHORT_CURVE};
use thiserror::Error;

use crate::{
    default_whitelist, BuiltInCategory, CategoryResolver, ElementId, GeometryNode, LinkedModel,
    ModelElement, StyleId,
};

/// Extraction settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Decimal places kept in the endpoint dedup key.
    pub precision: usize,
    /// Shortest representable curve; projected curves shorter than twice
    /// this are dropped.
    pub short_curve_tolerance: f64,
    /// Categories that count as obstacles.
    pub whitelist: BTreeSet<BuiltInCategory>,
    /// Discard standalone curves found in linked models.
    pub drop_linked_curves: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            precision: 4,
            short_curve_tolerance: SHORT_CURVE,
            whitelist: default_whitelist(),
            drop_linked_curves: true,
        }
    }
}

/// Identity of one extracted obstacle curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObstacleId(pub u32);

impl fmt::Display for ObstacleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obstacle #{}", self.0)
    }
}

/// Where an obstacle curve came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObstacleSource {
    /// Owning element.
    pub element: ElementId,
    /// Name of the linked model, `None` for host geometry.
    pub link: Option<String>,
    /// Category the curve was admitted under, when known.
    pub category: Option<BuiltInCategory>,
}

/// A deduplicated 2D obstacle curve.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleCurve {
    /// Identity used when merging ray hits.
    pub id: ObstacleId,
    /// The projected curve.
    pub curve: Curve2d,
    /// Provenance.
    pub source: ObstacleSource,
}

/// A primitive that could not be turned into an obstacle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionWarning {
    /// A transform or point was NaN or infinite.
    #[error("{element}: non-finite geometry")]
    NonFinite {
        /// Owning element.
        element: ElementId,
    },

    /// An arc projected edge-on to the working plane.
    #[error("{element}: arc is edge-on to the projection plane")]
    EdgeOnArc {
        /// Owning element.
        element: ElementId,
    },

    /// The projected curve could not be rebuilt.
    #[error("{element}: projected curve rejected: {source}")]
    Rebuild {
        /// Owning element.
        element: ElementId,
        /// Construction error.
        #[source]
        source: GeomError,
    },
}

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Curve primitives inspected.
    pub visited: usize,
    /// Curves emitted as obstacles.
    pub emitted: usize,
    /// Curves dropped because an equal key was already emitted.
    pub duplicates: usize,
    /// Curves shorter than the degenerate threshold after projection.
    pub degenerate: usize,
    /// Curves rejected by the category whitelist.
    pub filtered: usize,
    /// Standalone linked-model curves dropped.
    pub centerlines: usize,
    /// Curves that produced an [`ExtractionWarning`].
    pub failed: usize,
}

/// Extraction result: the obstacle curves plus diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ObstacleSet {
    curves: Vec<ObstacleCurve>,
    stats: ExtractStats,
    warnings: Vec<ExtractionWarning>,
}

impl ObstacleSet {
    /// Build a set directly from 2D curves (ids assigned in order).
    pub fn from_curves(curves: impl IntoIterator<Item = (Curve2d, ObstacleSource)>) -> Self {
        let curves: Vec<ObstacleCurve> = curves
            .into_iter()
            .enumerate()
            .map(|(i, (curve, source))| ObstacleCurve {
                id: ObstacleId(i as u32),
                curve,
                source,
            })
            .collect();
        let stats = ExtractStats {
            visited: curves.len(),
            emitted: curves.len(),
            ..ExtractStats::default()
        };
        Self {
            curves,
            stats,
            warnings: Vec::new(),
        }
    }

    /// All obstacle curves.
    pub fn curves(&self) -> &[ObstacleCurve] {
        &self.curves
    }

    /// Iterate over the obstacle curves.
    pub fn iter(&self) -> std::slice::Iter<'_, ObstacleCurve> {
        self.curves.iter()
    }

    /// Look up a curve by id.
    pub fn get(&self, id: ObstacleId) -> Option<&ObstacleCurve> {
        self.curves.get(id.0 as usize).filter(|c| c.id == id)
    }

    /// Number of obstacle curves.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// True if there are no obstacles.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Counters from extraction.
    pub fn stats(&self) -> &ExtractStats {
        &self.stats
    }

    /// Primitives skipped with a warning.
    pub fn warnings(&self) -> &[ExtractionWarning] {
        &self.warnings
    }
}

impl<'a> IntoIterator for &'a ObstacleSet {
    type Item = &'a ObstacleCurve;
    type IntoIter = std::slice::Iter<'a, ObstacleCurve>;

    fn into_iter(self) -> Self::IntoIter {
        self.curves.iter()
    }
}

/// Where a batch of elements comes from.
#[derive(Clone, Copy)]
pub enum ElementSource<'a> {
    /// The host model: identity transform, element categories only.
    Host,
    /// A linked model: outer transform plus style resolution.
    Linked {
        /// Link name, recorded in provenance.
        name: &'a str,
        /// Placement of the link in host coordinates.
        transform: &'a Transform,
        /// Style lookup for the link's document.
        resolver: &'a dyn CategoryResolver,
    },
}

impl fmt::Debug for ElementSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementSource::Host => f.write_str("Host"),
            ElementSource::Linked { name, .. } => write!(f, "Linked({name})"),
        }
    }
}

/// Order-independent endpoint key of a projected curve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurveKey(String);

impl CurveKey {
    /// Key from the two endpoints, rounded to `precision` decimals.
    pub fn new(a: &Point2, b: &Point2, precision: usize) -> Self {
        let ka = point_key(a, precision);
        let kb = point_key(b, precision);
        if ka <= kb {
            Self(format!("{ka}|{kb}"))
        } else {
            Self(format!("{kb}|{ka}"))
        }
    }

    /// Key of a curve's endpoints.
    pub fn of_curve(curve: &Curve2d, precision: usize) -> Self {
        Self::new(&curve.start(), &curve.end(), precision)
    }

    /// The key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn point_key(p: &Point2, precision: usize) -> String {
    format!(
        "{},{}",
        coord_key(p.x, precision),
        coord_key(p.y, precision)
    )
}

fn coord_key(v: f64, precision: usize) -> String {
    let s = format!("{v:.precision$}");
    // "-0.0000" and "0.0000" are the same coordinate
    match s.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => s,
    }
}

/// Incremental extractor: host elements and any number of linked models
/// share one dedup table.
pub struct ObstacleExtractor {
    plane: Plane,
    options: ExtractOptions,
    seen: HashSet<CurveKey>,
    set: ObstacleSet,
}

impl ObstacleExtractor {
    /// New extractor projecting onto `plane`.
    pub fn new(plane: Plane, options: ExtractOptions) -> Self {
        Self {
            plane,
            options,
            seen: HashSet::new(),
            set: ObstacleSet::default(),
        }
    }

    /// Add elements of the host model.
    pub fn add_host_elements(&mut self, elements: &[ModelElement]) -> &mut Self {
        self.add_elements(elements, ElementSource::Host)
    }

    /// Add the elements of a linked model, resolving styles with `resolver`.
    pub fn add_linked_model(
        &mut self,
        link: &LinkedModel,
        resolver: &dyn CategoryResolver,
    ) -> &mut Self {
        self.add_elements(
            &link.elements,
            ElementSource::Linked {
                name: &link.name,
                transform: &link.transform,
                resolver,
            },
        )
    }

    /// Add elements from an arbitrary source.
    pub fn add_elements(
        &mut self,
        elements: &[ModelElement],
        source: ElementSource<'_>,
    ) -> &mut Self {
        let before = self.set.stats;
        for element in elements {
            self.add_element(element, source);
        }
        let after = self.set.stats;
        log::debug!(
            "{:?}: {} elements, {} curves emitted, {} duplicates, {} filtered",
            source,
            elements.len(),
            after.emitted - before.emitted,
            after.duplicates - before.duplicates,
            after.filtered - before.filtered,
        );
        self
    }

    /// Finish and return the obstacle set.
    pub fn finish(self) -> ObstacleSet {
        self.set
    }

    fn add_element(&mut self, element: &ModelElement, source: ElementSource<'_>) {
        if let Some(category) = element.category {
            if !self.options.whitelist.contains(&category) {
                let skipped = count_curves(&element.geometry);
                self.set.stats.visited += skipped;
                self.set.stats.filtered += skipped;
                return;
            }
        }

        let (outer, link, resolver) = match source {
            ElementSource::Host => (Transform::identity(), None, None),
            ElementSource::Linked {
                name,
                transform,
                resolver,
            } => (transform.clone(), Some(name), Some(resolver)),
        };

        let mut stack: Vec<(&GeometryNode, Transform)> = element
            .geometry
            .iter()
            .rev()
            .map(|node| (node, outer.clone()))
            .collect();

        while let Some((node, frame)) = stack.pop() {
            match node {
                GeometryNode::Instance {
                    transform,
                    children,
                    ..
                } => {
                    let inner = frame.then(transform);
                    stack.extend(children.iter().rev().map(|c| (c, inner.clone())));
                }
                GeometryNode::Solid { edges, style } => {
                    let admitted = self.admit(element, *style, resolver, edges.len());
                    if let Some(category) = admitted {
                        for edge in edges {
                            self.emit(element, edge, &frame, link, category);
                        }
                    }
                }
                GeometryNode::Curve { curve, style } => {
                    if link.is_some() && self.options.drop_linked_curves {
                        self.set.stats.visited += 1;
                        self.set.stats.centerlines += 1;
                        continue;
                    }
                    if let Some(category) = self.admit(element, *style, resolver, 1) {
                        self.emit(element, curve, &frame, link, category);
                    }
                }
            }
        }
    }

    /// Style filter for linked primitives. Returns the category to record
    /// (`Some(None)` when unknown), or `None` if the primitive is rejected.
    fn admit(
        &mut self,
        element: &ModelElement,
        style: Option<StyleId>,
        resolver: Option<&dyn CategoryResolver>,
        curves: usize,
    ) -> Option<Option<BuiltInCategory>> {
        let (Some(resolver), Some(style)) = (resolver, style) else {
            return Some(element.category);
        };
        let Some(top) = resolver.top_level(style) else {
            // unresolvable style: keep
            return Some(element.category);
        };
        match resolver.builtin(top) {
            Some(category) if self.options.whitelist.contains(&category) => Some(Some(category)),
            other => {
                log::trace!(
                    "{}: style {:?} resolves to {:?}, filtered",
                    element.id,
                    style,
                    other
                );
                self.set.stats.visited += curves;
                self.set.stats.filtered += curves;
                None
            }
        }
    }

    fn emit(
        &mut self,
        element: &ModelElement,
        curve: &Curve3d,
        frame: &Transform,
        link: Option<&str>,
        category: Option<BuiltInCategory>,
    ) {
        self.set.stats.visited += 1;
        match self.project(curve, frame, element.id) {
            Ok(Some(curve2d)) => {
                let key = CurveKey::of_curve(&curve2d, self.options.precision);
                if !self.seen.insert(key) {
                    self.set.stats.duplicates += 1;
                    return;
                }
                let id = ObstacleId(self.set.curves.len() as u32);
                self.set.curves.push(ObstacleCurve {
                    id,
                    curve: curve2d,
                    source: ObstacleSource {
                        element: element.id,
                        link: link.map(str::to_string),
                        category,
                    },
                });
                self.set.stats.emitted += 1;
            }
            Ok(None) => {
                self.set.stats.degenerate += 1;
            }
            Err(warning) => {
                log::warn!("skipping primitive: {warning}");
                self.set.stats.failed += 1;
                self.set.warnings.push(warning);
            }
        }
    }

    /// Project a model curve into the plane's 2D frame. `Ok(None)` means the
    /// projection is too short to keep.
    fn project(
        &self,
        curve: &Curve3d,
        frame: &Transform,
        element: ElementId,
    ) -> Result<Option<Curve2d>, ExtractionWarning> {
        if !frame.is_finite() || !curve.is_finite() {
            return Err(ExtractionWarning::NonFinite { element });
        }
        let placed = curve.transformed(frame);
        let min_length = 2.0 * self.options.short_curve_tolerance;
        let start = self.plane.to_plane(&placed.start());
        let end = self.plane.to_plane(&placed.end());
        if (end - start).norm() < min_length {
            return Ok(None);
        }

        let rebuilt = match placed {
            Curve3d::Line(_) => Line2d::new(start, end).map(Curve2d::Line),
            Curve3d::Arc(arc) => {
                let mid = self.plane.to_plane(&arc.mid);
                match Arc2d::through_points(start, mid, end) {
                    Err(GeomError::CollinearPoints) => {
                        return Err(ExtractionWarning::EdgeOnArc { element });
                    }
                    other => other.map(Curve2d::Arc),
                }
            }
        };
        rebuilt
            .map(Some)
            .map_err(|source| ExtractionWarning::Rebuild { element, source })
    }
}

fn count_curves(nodes: &[GeometryNode]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            GeometryNode::Solid { edges, .. } => edges.len(),
            GeometryNode::Curve { .. } => 1,
            GeometryNode::Instance { children, .. } => count_curves(children),
        })
        .sum()
}

/// One-shot extraction of a single batch of elements.
pub fn extract(
    roots: &[ModelElement],
    source: ElementSource<'_>,
    plane: &Plane,
    options: &ExtractOptions,
) -> ObstacleSet {
    let mut extractor = ObstacleExtractor::new(plane.clone(), options.clone());
    extractor.add_elements(roots, source);
    extractor.finish()
}
