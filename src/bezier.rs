use glam::Vec3;

/// Cubic Bezier from `p0` to `p1` shaped by `c0` and `c1`, evaluated with
/// de Casteljau's construction. `t` outside `[0, 1]` extrapolates.
pub fn cubic_bezier(p0: Vec3, p1: Vec3, c0: Vec3, c1: Vec3, t: f32) -> Vec3 {
    let p0c0 = p0.lerp(c0, t);
    let c0c1 = c0.lerp(c1, t);
    let c1p1 = c1.lerp(p1, t);

    let near = p0c0.lerp(c0c1, t);
    let far = c0c1.lerp(c1p1, t);

    near.lerp(far, t)
}

/// Looping walk along a cubic Bezier at a fixed parameter speed.
#[derive(Debug, Clone)]
pub struct BezierPath {
    pub start: Vec3,
    pub end: Vec3,
    pub control: [Vec3; 2],
    /// Parameter advance per second.
    pub speed: f32,
    t: f32,
}

impl BezierPath {
    pub fn new(start: Vec3, end: Vec3, control: [Vec3; 2], speed: f32) -> Self {
        Self {
            start,
            end,
            control,
            speed,
            t: 0.0,
        }
    }

    pub fn t(&self) -> f32 {
        self.t
    }

    pub fn point(&self) -> Vec3 {
        cubic_bezier(self.start, self.end, self.control[0], self.control[1], self.t)
    }

    /// Returns the point for this frame, then moves the parameter forward.
    pub fn advance(&mut self, dt: f32) -> Vec3 {
        if self.t > 1.0 {
            self.t = 0.0;
        }
        let point = self.point();
        self.t += self.speed * dt;
        point
    }
}
