//! Positional collision resolution against the terrain map and other actors.

use glam::{Vec3, Vec4};

use crate::world::{MapGrid, grid_index};

/// Cells inspected behind an actor along each axis when testing for ground.
const GROUND_LOOKBACK: i64 = 3;

pub trait Position {
    fn point(&self) -> Vec3;
    fn set_point(&mut self, point: Vec3);
}

impl Position for Vec3 {
    fn point(&self) -> Vec3 {
        *self
    }

    fn set_point(&mut self, point: Vec3) {
        *self = point;
    }
}

impl Position for Vec4 {
    fn point(&self) -> Vec3 {
        self.truncate()
    }

    fn set_point(&mut self, point: Vec3) {
        self.x = point.x;
        self.y = point.y;
        self.z = point.z;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapContact {
    None,
    Boundary,
    Top,
    Wall,
}

pub fn collide_with_map<P: Position>(position: &mut P, map: &MapGrid) -> MapContact {
    let mut point = position.point();
    let size = map.size() as i64;
    let half = map.half_extent();
    let x = grid_index(point.x, map.size());
    let z = grid_index(point.z, map.size());

    let mut contact = MapContact::None;
    if x < 0 {
        point.x = -half;
        contact = MapContact::Boundary;
    } else if x >= size {
        point.x = half;
        contact = MapContact::Boundary;
    }
    if z < 0 {
        point.z = -half;
        contact = MapContact::Boundary;
    } else if z >= size {
        point.z = half;
        contact = MapContact::Boundary;
    }

    if contact == MapContact::None {
        if let Some(cell) = map.cell_at(x, z) {
            if point.y < cell.top {
                point.y = cell.top;
                contact = MapContact::Top;
            } else if !cell.covers(point.x, point.z) {
                point.x = point.x.clamp(cell.left, cell.right);
                point.z = point.z.clamp(cell.front, cell.back);
                contact = MapContact::Wall;
            }
        }
    }

    position.set_point(point);
    contact
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
}

impl Bounds {
    pub fn cuboid(size: Vec3) -> Self {
        Bounds::Box {
            half_extents: size / 2.0,
        }
    }

    pub fn contains(&self, center: Vec3, point: Vec3) -> bool {
        match *self {
            Bounds::Sphere { radius } => spheres_overlap(center, point, radius),
            Bounds::Box { half_extents } => point_in_box(point, center, half_extents),
        }
    }
}

pub fn spheres_overlap(a: Vec3, b: Vec3, radius: f32) -> bool {
    a.distance(b) < radius
}

/// Strict containment: points on a face are outside.
pub fn point_in_box(point: Vec3, center: Vec3, half_extents: Vec3) -> bool {
    let offset = (point - center).abs();
    offset.cmplt(half_extents).all()
}

/// Last position at which one actor did not overlap another.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RollbackCache {
    last_safe: Option<Vec3>,
}

impl RollbackCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_safe(&self) -> Option<Vec3> {
        self.last_safe
    }

    pub fn record(&mut self, point: Vec3) {
        self.last_safe = Some(point);
    }
}

/// Rolls `position` back to its last safe point when it overlaps `bounds`
/// around `other`. Returns whether an overlap was detected.
pub fn collide_with_actor<P: Position>(
    position: &mut P,
    other: Vec3,
    bounds: Bounds,
    cache: &mut RollbackCache,
) -> bool {
    let point = position.point();
    if bounds.contains(other, point) {
        if let Some(safe) = cache.last_safe() {
            position.set_point(safe);
        }
        true
    } else {
        cache.record(point);
        false
    }
}

/// Highest block top in the cells at and behind `position`.
pub fn ground_height(position: Vec3, map: &MapGrid) -> Option<f32> {
    let x = grid_index(position.x, map.size());
    let z = grid_index(position.z, map.size());
    (0..=GROUND_LOOKBACK)
        .flat_map(|dx| (0..=GROUND_LOOKBACK).map(move |dz| (dx, dz)))
        .filter_map(|(dx, dz)| map.cell_at(x.saturating_sub(dx), z.saturating_sub(dz)))
        .map(|cell| cell.top)
        .reduce(f32::max)
}

pub fn is_grounded(position: Vec3, map: &MapGrid) -> bool {
    ground_height(position, map).is_some_and(|top| position.y <= top)
}
