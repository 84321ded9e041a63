//! Automatic junction connectors.
//!
//! All conductors on a page form an undirected planar graph. Endpoints and
//! crossings are clustered into nodes, each node's branches are counted, and
//! nodes with three or more branches get a generated connector symbol whose
//! ID is derived from its rounded position. Rebuilding the same geometry
//! always yields the same symbols.

use crate::document::{
    AutoConnectorType, Conductor, ConductorClass, ConductorColor, ConductorPath, Document,
    Selection, Symbol, SymbolType,
};
use crate::error::KernelResult;
use crate::geometry::{distance_to_polyline, polyline_intersections, rects_overlap};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Candidates closer than this merge into one node.
pub const CLUSTER_EPSILON: f64 = 0.75;
/// Padding applied to bounding boxes before the overlap test.
pub const BOUNDS_PADDING: f64 = 1.0;
/// Generated IDs round positions to `1 / ID_PRECISION` document units.
pub const ID_PRECISION: f64 = 10.0;

/// Junction classification of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JunctionKind {
    /// Exactly three branches.
    Tee,
    /// Four or more branches.
    Crossrun,
}

impl JunctionKind {
    pub fn from_branch_count(branches: usize) -> Option<Self> {
        match branches {
            0..=2 => None,
            3 => Some(JunctionKind::Tee),
            _ => Some(JunctionKind::Crossrun),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JunctionKind::Tee => "tee",
            JunctionKind::Crossrun => "crossrun",
        }
    }
}

/// A junction that needs a connector symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoConnectorNode {
    pub position: Point,
    pub color: ConductorColor,
    pub connector_class: ConductorClass,
    pub page: u32,
    pub junction: JunctionKind,
}

/// Combined material of every conductor meeting at a node.
///
/// Aluminum meeting copper is bimetallic; otherwise red outranks green,
/// which outranks cyan.
pub fn resolve_junction_color(colors: &[ConductorColor]) -> ConductorColor {
    let has = |c: ConductorColor| colors.contains(&c);
    let has_copper = colors.iter().any(|c| c.is_copper());
    if has(ConductorColor::Purple) || (has(ConductorColor::Blue) && has_copper) {
        ConductorColor::Purple
    } else if has(ConductorColor::Red) {
        ConductorColor::Red
    } else if has(ConductorColor::Green) {
        ConductorColor::Green
    } else if has(ConductorColor::Cyan) {
        ConductorColor::Cyan
    } else if has(ConductorColor::Blue) {
        ConductorColor::Blue
    } else {
        ConductorColor::default()
    }
}

/// Highest class of every conductor meeting at a node.
pub fn resolve_junction_class(classes: &[ConductorClass]) -> ConductorClass {
    if classes.contains(&ConductorClass::Class2) {
        ConductorClass::Class2
    } else if classes.contains(&ConductorClass::Class1) {
        ConductorClass::Class1
    } else {
        ConductorClass::None
    }
}

/// Connector symbol placed for a junction in the given mode.
pub fn connector_symbol_type(junction: JunctionKind, mode: AutoConnectorType) -> SymbolType {
    match (mode, junction) {
        (AutoConnectorType::Mechanical, JunctionKind::Tee) => SymbolType::CableToCable,
        (AutoConnectorType::Mechanical, JunctionKind::Crossrun) => SymbolType::MechanicalCrossrun,
        (AutoConnectorType::Exothermic, JunctionKind::Tee) => SymbolType::ExothermicTee,
        (AutoConnectorType::Exothermic, JunctionKind::Crossrun) => SymbolType::ExothermicCrossrun,
    }
}

/// Deterministic symbol ID for a node.
pub fn auto_connector_symbol_id(node: &AutoConnectorNode, mode: AutoConnectorType) -> String {
    let rx = (node.position.x * ID_PRECISION).round() as i64;
    let ry = (node.position.y * ID_PRECISION).round() as i64;
    format!(
        "auto-conn-p{}-{}-{}-{}-{}-{}",
        node.page,
        rx,
        ry,
        node.color.as_str(),
        node.junction.as_str(),
        mode.as_str()
    )
}

/// Find every junction node across all pages, sorted by page, y, x, color
/// and junction kind.
pub fn analyze_auto_connector_nodes(paths: &[ConductorPath]) -> Vec<AutoConnectorNode> {
    let mut nodes = Vec::new();
    for page_paths in group_by_page(paths).values() {
        nodes.extend(analyze_page(page_paths));
    }
    sort_nodes(&mut nodes);
    nodes
}

fn group_by_page(paths: &[ConductorPath]) -> BTreeMap<u32, Vec<&ConductorPath>> {
    let mut pages: BTreeMap<u32, Vec<&ConductorPath>> = BTreeMap::new();
    for path in paths {
        pages.entry(path.page).or_default().push(path);
    }
    pages
}

fn padded(bounds: Rect) -> Rect {
    bounds.inflate(BOUNDS_PADDING, BOUNDS_PADDING)
}

fn analyze_page(paths: &[&ConductorPath]) -> Vec<AutoConnectorNode> {
    let mut candidates = Vec::new();
    for path in paths {
        candidates.push(path.start());
        candidates.push(path.end());
    }
    for (i, a) in paths.iter().enumerate() {
        for b in &paths[i + 1..] {
            if rects_overlap(padded(a.bounds), b.bounds) {
                candidates.extend(polyline_intersections(&a.points, &b.points));
            }
        }
    }

    cluster_candidates(candidates)
        .into_iter()
        .filter_map(|center| classify_node(center, paths))
        .collect()
}

/// Merge candidates into clusters represented by their running centroid.
///
/// Candidates are sorted first so the result does not depend on the order
/// conductors were drawn in.
fn cluster_candidates(mut candidates: Vec<Point>) -> Vec<Point> {
    candidates.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

    struct Cluster {
        sum_x: f64,
        sum_y: f64,
        count: usize,
    }
    impl Cluster {
        fn center(&self) -> Point {
            Point::new(self.sum_x / self.count as f64, self.sum_y / self.count as f64)
        }
    }

    let mut clusters: Vec<Cluster> = Vec::new();
    for point in candidates {
        let nearest = clusters
            .iter()
            .enumerate()
            .map(|(i, c)| (i, c.center().distance(point)))
            .filter(|(_, d)| *d <= CLUSTER_EPSILON)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i);
        match nearest {
            Some(i) => {
                let cluster = &mut clusters[i];
                cluster.sum_x += point.x;
                cluster.sum_y += point.y;
                cluster.count += 1;
            }
            None => clusters.push(Cluster {
                sum_x: point.x,
                sum_y: point.y,
                count: 1,
            }),
        }
    }
    clusters.iter().map(Cluster::center).collect()
}

/// Branches a conductor contributes at `center`: one when the node is at
/// either endpoint, two when the node splits its interior.
fn branch_count(center: Point, path: &ConductorPath) -> usize {
    if !padded(path.bounds).contains(center) {
        return 0;
    }
    if center.distance(path.start()) <= CLUSTER_EPSILON
        || center.distance(path.end()) <= CLUSTER_EPSILON
    {
        1
    } else if distance_to_polyline(center, &path.points) <= CLUSTER_EPSILON {
        2
    } else {
        0
    }
}

fn classify_node(center: Point, paths: &[&ConductorPath]) -> Option<AutoConnectorNode> {
    let mut branches = 0;
    let mut colors = Vec::new();
    let mut classes = Vec::new();
    let mut page = None;
    for path in paths {
        let count = branch_count(center, path);
        if count == 0 {
            continue;
        }
        branches += count;
        colors.push(path.color);
        classes.push(path.class);
        page = Some(path.page);
    }

    let junction = JunctionKind::from_branch_count(branches)?;
    Some(AutoConnectorNode {
        position: center,
        color: resolve_junction_color(&colors),
        connector_class: resolve_junction_class(&classes),
        page: page?,
        junction,
    })
}

fn sort_nodes(nodes: &mut [AutoConnectorNode]) {
    nodes.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then(a.position.y.total_cmp(&b.position.y))
            .then(a.position.x.total_cmp(&b.position.x))
            .then(a.color.cmp(&b.color))
            .then(a.junction.cmp(&b.junction))
    });
}

/// Connector symbol for one node.
pub fn auto_connector_symbol(node: &AutoConnectorNode, mode: AutoConnectorType) -> Symbol {
    let mut symbol = Symbol::new(
        node.position,
        connector_symbol_type(node.junction, mode),
        node.color,
        node.connector_class,
    )
    .on_page(node.page);
    symbol.id = auto_connector_symbol_id(node, mode);
    symbol.auto_connector = true;
    symbol
}

/// Connector symbols for `nodes`, one per distinct ID.
pub fn build_auto_connector_symbols(
    nodes: &[AutoConnectorNode],
    mode: AutoConnectorType,
) -> Vec<Symbol> {
    let mut seen = HashSet::new();
    nodes
        .iter()
        .map(|node| auto_connector_symbol(node, mode))
        .filter(|symbol| seen.insert(symbol.id.clone()))
        .collect()
}

/// Copy of the document without any generated connector symbols.
pub fn strip_auto_connector_symbols(document: &Document) -> Document {
    let mut next = document.clone();
    next.symbols.retain(|s| !s.auto_connector);
    next
}

/// Whether a hand-placed connector already sits at the node.
fn manual_connector_near(symbols: &[Symbol], node: &AutoConnectorNode) -> bool {
    symbols.iter().any(|s| {
        !s.auto_connector
            && s.symbol_type.is_connector()
            && s.page == node.page
            && s.position.distance(node.position) <= CLUSTER_EPSILON
    })
}

/// Regenerate every connector symbol from conductor geometry.
///
/// Manually placed connectors are kept and suppress a generated one at the
/// same node. Returns the document unchanged when auto connectors are off.
pub fn rebuild_auto_connectors(document: &Document) -> Document {
    if !document.settings.auto_connectors_enabled {
        return document.clone();
    }
    let mode = document.settings.auto_connector_type;
    let mut next = strip_auto_connector_symbols(document);
    let mut nodes = analyze_auto_connector_nodes(&document.conductors());
    nodes.retain(|node| !manual_connector_near(&next.symbols, node));
    let generated = build_auto_connector_symbols(&nodes, mode);
    log::debug!("Rebuilt auto connectors: {} nodes, {} symbols", nodes.len(), generated.len());
    next.symbols.extend(generated);
    next
}

/// Nodes in the neighborhood of the `added` conductors.
///
/// Only conductors on the same page whose padded bounds overlap an added
/// conductor take part, and only nodes lying on an added conductor are
/// returned.
pub fn analyze_incremental_nodes(
    document: &Document,
    added: &[Selection],
) -> Vec<AutoConnectorNode> {
    let paths = document.conductors();
    let added_paths: Vec<&ConductorPath> = paths
        .iter()
        .filter(|p| added.contains(&p.selection))
        .collect();

    let mut nodes = Vec::new();
    let pages: HashSet<u32> = added_paths.iter().map(|p| p.page).collect();
    for page in pages {
        let on_page: Vec<&ConductorPath> = added_paths
            .iter()
            .copied()
            .filter(|p| p.page == page)
            .collect();
        let neighborhood: Vec<&ConductorPath> = paths
            .iter()
            .filter(|p| p.page == page)
            .filter(|p| on_page.iter().any(|a| rects_overlap(padded(a.bounds), padded(p.bounds))))
            .collect();
        nodes.extend(analyze_page(&neighborhood).into_iter().filter(|node| {
            on_page
                .iter()
                .any(|a| distance_to_polyline(node.position, &a.points) <= CLUSTER_EPSILON)
        }));
    }
    sort_nodes(&mut nodes);
    nodes
}

/// Update connector symbols after `added` conductors were inserted.
///
/// Nodes whose ID already exists are skipped, manual connectors are never
/// touched, and generated symbols at a node whose classification changed
/// are replaced.
pub fn apply_incremental_auto_connectors(document: &Document, added: &[Selection]) -> Document {
    let mut next = document.clone();
    if !document.settings.auto_connectors_enabled || added.is_empty() {
        return next;
    }
    let mode = document.settings.auto_connector_type;
    let mut placed = 0usize;
    for node in analyze_incremental_nodes(document, added) {
        let id = auto_connector_symbol_id(&node, mode);
        if next.symbols.iter().any(|s| s.id == id) {
            continue;
        }
        if manual_connector_near(&next.symbols, &node) {
            continue;
        }
        next.symbols.retain(|s| {
            !(s.auto_connector
                && s.page == node.page
                && s.position.distance(node.position) <= CLUSTER_EPSILON)
        });
        next.symbols.push(auto_connector_symbol(&node, mode));
        placed += 1;
    }
    log::debug!("Incremental auto connectors: {} placed for {} conductors", placed, added.len());
    next
}

/// Insert conductors and update connectors around them.
///
/// Fails without touching anything when one of the conductors is an invalid
/// arc.
pub fn add_conductors(document: &Document, conductors: Vec<Conductor>) -> KernelResult<Document> {
    let mut next = document.clone();
    let mut added = Vec::with_capacity(conductors.len());
    for conductor in conductors {
        added.push(next.add_conductor(conductor)?);
    }
    Ok(apply_incremental_auto_connectors(&next, &added))
}

/// Delete an entity; deleting a conductor rebuilds the connectors.
///
/// Returns `None` when nothing matched the selection.
pub fn remove_selection(document: &Document, selection: &Selection) -> Option<Document> {
    let mut next = document.clone();
    if !next.delete_selection(selection) {
        return None;
    }
    if selection.is_conductor() {
        Some(rebuild_auto_connectors(&next))
    } else {
        Some(next)
    }
}
