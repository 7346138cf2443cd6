/// Projected vertex with rotated position, screen position, depth, and normal
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f64; 3],
    pub screen_position: [f64; 2],
    /// Distance from the camera along the view axis
    pub depth: f64,
    pub normal: [f64; 3],
}
