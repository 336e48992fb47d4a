use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: u32 = 12;

#[derive(Clone, Copy, Debug)]
struct Square {
    center: Vec2,
    half: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let (min, max) = points.iter().fold(
            (
                vec2(f32::INFINITY, f32::INFINITY),
                vec2(f32::NEG_INFINITY, f32::NEG_INFINITY),
            ),
            |(min, max), point| (min.min(*point), max.max(*point)),
        );
        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return None;
        }

        let span = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half: span * 0.5 + 1.0,
        })
    }

    fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half && (point.y - self.center.y).abs() <= self.half
    }

    fn quadrant(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half * 0.5;
        let x = if quadrant & 1 == 0 { -quarter } else { quarter };
        let y = if quadrant & 2 == 0 { -quarter } else { quarter };
        Self {
            center: self.center + vec2(x, y),
            half: quarter,
        }
    }

    fn distance_sq_to(self, point: Vec2) -> f32 {
        let dx = ((point.x - self.center.x).abs() - self.half).max(0.0);
        let dy = ((point.y - self.center.y).abs() - self.half).max(0.0);
        dx * dx + dy * dy
    }
}

struct Cell {
    square: Square,
    mass: f32,
    center_of_mass: Vec2,
    /// First of four consecutive child cells.
    children: Option<usize>,
    points: Vec<usize>,
}

impl Cell {
    fn empty(square: Square) -> Self {
        Self {
            square,
            mass: 0.0,
            center_of_mass: square.center,
            children: None,
            points: Vec::new(),
        }
    }
}

#[derive(Clone, Copy)]
pub(super) struct Repulsion {
    pub(super) strength: f32,
    pub(super) softening: f32,
    pub(super) theta: f32,
}

/// Quadtree over node positions, stored as a flat arena.
pub(super) struct BarnesHut {
    cells: Vec<Cell>,
}

fn push_apart(point: Vec2, other: Vec2, strength: f32, softening: f32, salt: usize) -> Vec2 {
    let delta = point - other;
    let distance_sq = delta.length_sq();
    let direction = if distance_sq > 1e-8 {
        delta / distance_sq.sqrt()
    } else {
        let angle = (salt as f32 * 0.618_034).fract() * std::f32::consts::TAU;
        vec2(angle.cos(), angle.sin())
    };
    direction * (strength / (distance_sq + softening))
}

impl BarnesHut {
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let square = Square::enclosing(positions)?;
        let mut tree = Self {
            cells: vec![Cell::empty(square)],
        };
        tree.fill(0, (0..positions.len()).collect(), positions, 0);
        Some(tree)
    }

    fn fill(&mut self, cell: usize, points: Vec<usize>, positions: &[Vec2], depth: u32) {
        let mass = points.len() as f32;
        if mass > 0.0 {
            let sum = points
                .iter()
                .fold(Vec2::ZERO, |sum, &index| sum + positions[index]);
            self.cells[cell].mass = mass;
            self.cells[cell].center_of_mass = sum / mass;
        }

        if points.len() <= LEAF_CAPACITY || depth >= MAX_DEPTH {
            self.cells[cell].points = points;
            return;
        }

        let square = self.cells[cell].square;
        let mut quadrants: [Vec<usize>; 4] = Default::default();
        for &index in &points {
            quadrants[square.quadrant(positions[index])].push(index);
        }
        if quadrants.iter().filter(|quadrant| !quadrant.is_empty()).count() <= 1 {
            self.cells[cell].points = points;
            return;
        }

        let first = self.cells.len();
        self.cells
            .extend((0..4).map(|quadrant| Cell::empty(square.child(quadrant))));
        self.cells[cell].children = Some(first);
        for (quadrant, members) in quadrants.into_iter().enumerate() {
            self.fill(first + quadrant, members, positions, depth + 1);
        }
    }

    /// Repulsive force on `index` from every other point, approximating
    /// distant cells by their center of mass.
    pub(super) fn repulsion(
        &self,
        index: usize,
        positions: &[Vec2],
        params: Repulsion,
        stack: &mut Vec<usize>,
    ) -> Vec2 {
        let point = positions[index];
        let mut force = Vec2::ZERO;

        stack.clear();
        stack.push(0);
        while let Some(cell_index) = stack.pop() {
            let cell = &self.cells[cell_index];
            if cell.mass <= 0.0 {
                continue;
            }

            match cell.children {
                None => {
                    for &other in &cell.points {
                        if other != index {
                            force += push_apart(
                                point,
                                positions[other],
                                params.strength,
                                params.softening,
                                index + other,
                            );
                        }
                    }
                }
                Some(first) => {
                    let distance = (point - cell.center_of_mass).length().max(1e-3);
                    let far = !cell.square.contains(point)
                        && (cell.square.half * 2.0) / distance < params.theta;
                    if far {
                        force += push_apart(
                            point,
                            cell.center_of_mass,
                            params.strength * cell.mass,
                            params.softening,
                            index,
                        );
                    } else {
                        stack.extend(first..first + 4);
                    }
                }
            }
        }
        force
    }

    /// Separation force on `index` from points whose discs overlap its own,
    /// with each disc inflated by `spacing`.
    pub(super) fn overlap(
        &self,
        index: usize,
        positions: &[Vec2],
        radii: &[f32],
        reach: f32,
        spacing: f32,
        stack: &mut Vec<usize>,
    ) -> Vec2 {
        let point = positions[index];
        let mut force = Vec2::ZERO;

        stack.clear();
        stack.push(0);
        while let Some(cell_index) = stack.pop() {
            let cell = &self.cells[cell_index];
            if cell.mass <= 0.0 || cell.square.distance_sq_to(point) > reach * reach {
                continue;
            }

            match cell.children {
                Some(first) => stack.extend(first..first + 4),
                None => {
                    for &other in &cell.points {
                        if other == index {
                            continue;
                        }
                        let delta = point - positions[other];
                        let distance = delta.length();
                        let min_distance = (radii[index] + radii[other]) * spacing;
                        if distance < min_distance {
                            let direction = if distance > 1e-4 {
                                delta / distance
                            } else {
                                let angle = ((index * 31 + other) as f32 * 0.618_034).fract()
                                    * std::f32::consts::TAU;
                                vec2(angle.cos(), angle.sin())
                            };
                            force += direction * (min_distance - distance);
                        }
                    }
                }
            }
        }
        force
    }
}
