use itertools::Itertools;
use nalgebra::{DMatrix, DVector};
use std::collections::{BTreeMap, BTreeSet};

/// Composition matrices below this determinant magnitude do not span a simplex.
const SIMPLEX_SINGULAR_TOLERANCE: f64 = 1e-12;

/// A point of the energy-composition space: atomic fractions over the diagram's
/// elements and the formation energy per atom.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HullPoint {
    pub coords: Vec<f64>,
    pub energy: f64,
}

/// One simplex of the lower hull, stored as the inverse of its composition matrix so
/// that barycentric weights of any target are a single product.
#[derive(Debug, Clone)]
struct Facet {
    vertices: Vec<usize>,
    barycentric: DMatrix<f64>,
    energies: DVector<f64>,
}

impl Facet {
    /// `None` when the vertices do not span a simplex.
    fn new(mut vertices: Vec<usize>, points: &[HullPoint]) -> Option<Self> {
        vertices.sort_unstable();
        let n = vertices.len();
        let basis = DMatrix::from_fn(n, n, |row, col| points[vertices[col]].coords[row]);
        let det = basis.determinant();
        if !det.is_finite() || det.abs() < SIMPLEX_SINGULAR_TOLERANCE {
            return None;
        }
        let barycentric = basis.try_inverse()?;
        let energies = DVector::from_iterator(n, vertices.iter().map(|&v| points[v].energy));
        Some(Self {
            vertices,
            barycentric,
            energies,
        })
    }

    fn weights(&self, target: &[f64]) -> DVector<f64> {
        &self.barycentric * DVector::from_column_slice(target)
    }

    /// Energy of the facet's hyperplane at `target`, inside the simplex or not.
    fn plane_energy(&self, target: &[f64]) -> f64 {
        self.weights(target).dot(&self.energies)
    }

    fn energy_at(&self, target: &[f64], tolerance: f64) -> Option<f64> {
        let weights = self.weights(target);
        if weights.iter().any(|w| *w < -tolerance) {
            return None;
        }
        Some(weights.dot(&self.energies))
    }
}

/// The lower convex hull of a point set, as a list of facets over point indices.
///
/// Built by incremental insertion from the simplex of the elemental corners: a point
/// strictly below some facet planes removes those facets and is joined to the horizon
/// ridges around them. A point on or above the current hull can never become a vertex
/// later, since insertions only lower the hull.
#[derive(Debug, Clone)]
pub(crate) struct LowerHull {
    facets: Vec<Facet>,
}

impl LowerHull {
    /// Returns `None` when `corners` do not span the composition simplex.
    pub fn build(points: &[HullPoint], corners: &[usize], tolerance: f64) -> Option<Self> {
        let mut hull = Self {
            facets: vec![Facet::new(corners.to_vec(), points)?],
        };

        // Deepest points first, so shallow candidates are rejected against few facets.
        let mut order: Vec<usize> = (0..points.len())
            .filter(|idx| !corners.contains(idx))
            .collect();
        order.sort_by(|&a, &b| points[a].energy.total_cmp(&points[b].energy));

        for idx in order {
            hull.insert(points, idx, tolerance);
        }
        Some(hull)
    }

    fn insert(&mut self, points: &[HullPoint], idx: usize, tolerance: f64) {
        let point = &points[idx];
        let (visible, kept): (Vec<Facet>, Vec<Facet>) = std::mem::take(&mut self.facets)
            .into_iter()
            .partition(|facet| point.energy < facet.plane_energy(&point.coords) - tolerance);
        self.facets = kept;
        if visible.is_empty() {
            return;
        }

        // Ridges seen once bound the visible region; ridges seen twice lie inside it.
        let mut ridges: BTreeMap<Vec<usize>, usize> = BTreeMap::new();
        for facet in &visible {
            let size = facet.vertices.len() - 1;
            for ridge in facet.vertices.iter().copied().combinations(size) {
                *ridges.entry(ridge).or_default() += 1;
            }
        }
        self.facets.extend(
            ridges
                .into_iter()
                .filter(|(_, count)| *count == 1)
                .filter_map(|(mut ridge, _)| {
                    ridge.push(idx);
                    Facet::new(ridge, points)
                }),
        );
    }

    /// Every point index that is a vertex of some facet.
    pub fn vertices(&self) -> BTreeSet<usize> {
        self.facets
            .iter()
            .flat_map(|facet| facet.vertices.iter().copied())
            .collect()
    }

    /// Vertices lying strictly below the hull of their neighbours.
    ///
    /// Removing a vertex only reshapes the hull over its star, and the replacement
    /// facets are spanned by the link vertices, so the test only looks at those.
    pub fn strict_vertices(&self, points: &[HullPoint], tolerance: f64) -> Vec<usize> {
        self.vertices()
            .into_iter()
            .filter(|&vertex| {
                let link: BTreeSet<usize> = self
                    .facets
                    .iter()
                    .filter(|facet| facet.vertices.contains(&vertex))
                    .flat_map(|facet| facet.vertices.iter().copied())
                    .filter(|&other| other != vertex)
                    .collect();
                let neighbours: Vec<&HullPoint> = link.iter().map(|&v| &points[v]).collect();
                let point = &points[vertex];
                match lower_hull_energy(&neighbours, &point.coords, tolerance) {
                    None => true,
                    Some(hull) => point.energy < hull - tolerance,
                }
            })
            .collect()
    }

    /// Hull energy at `target`; `None` if no facet contains it.
    pub fn energy_at(&self, target: &[f64], tolerance: f64) -> Option<f64> {
        self.facets
            .iter()
            .filter_map(|facet| facet.energy_at(target, tolerance))
            .reduce(f64::min)
    }
}

/// Energy of the lower convex hull of a small point set at composition `target`.
///
/// Every `n`-subset of points (with `n` the dimension of `target`) that spans a
/// simplex containing `target` gives an upper bound `Σ λ_i E_i`; the hull is the
/// minimum over all of them. Returns `None` when no simplex contains `target`.
pub(crate) fn lower_hull_energy(
    points: &[&HullPoint],
    target: &[f64],
    tolerance: f64,
) -> Option<f64> {
    let owned: Vec<HullPoint> = points.iter().map(|p| (*p).clone()).collect();
    (0..owned.len())
        .combinations(target.len())
        .filter_map(|subset| Facet::new(subset, &owned)?.energy_at(target, tolerance))
        .reduce(f64::min)
}
