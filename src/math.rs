use crate::color::Rgb;
use crate::config::LightingConfig;

/// Edge function used in rasterization
pub fn edge_function(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    (c[0] - a[0]) * (b[1] - a[1]) - (c[1] - a[1]) * (b[0] - a[0])
}

/// Multiplies a 3x3 matrix by a 3-dimensional vector
pub fn multiply_matrix_vector(matrix: &[[f64; 3]; 3], vector: &[f64; 3]) -> [f64; 3] {
    let mut result = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Rotation matrix around the Y-axis (yaw)
pub fn rotation_y(angle: f64) -> [[f64; 3]; 3] {
    let (sin_a, cos_a) = angle.sin_cos();
    [[cos_a, 0.0, sin_a], [0.0, 1.0, 0.0], [-sin_a, 0.0, cos_a]]
}

pub fn subtract(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(u: &[f64; 3], v: &[f64; 3]) -> [f64; 3] {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

pub fn length(v: &[f64; 3]) -> f64 {
    dot(v, v).sqrt()
}

/// Normalizes a vector; a zero vector stays zero
pub fn normalize(v: &[f64; 3]) -> [f64; 3] {
    let length = length(v);
    if length > f64::EPSILON {
        [v[0] / length, v[1] / length, v[2] / length]
    } else {
        [0.0; 3]
    }
}

/// Unnormalized normal of a triangle; its length is twice the triangle area
pub fn face_normal(a: &[f64; 3], b: &[f64; 3], c: &[f64; 3]) -> [f64; 3] {
    cross(&subtract(b, a), &subtract(c, a))
}

/// Calculates the light intensity at a surface point seen from `eye`.
///
/// Lighting is two-sided: a normal facing away from the eye is flipped
/// before the directional terms are evaluated.
pub fn calculate_light_intensity(
    normal: &[f64; 3],
    position: &[f64; 3],
    eye: &[f64; 3],
    lighting: &LightingConfig,
) -> f64 {
    let mut normal = *normal;
    if dot(&normal, &subtract(eye, position)) < 0.0 {
        normal = [-normal[0], -normal[1], -normal[2]];
    }

    let diffuse: f64 = lighting
        .directional
        .iter()
        .map(|light| {
            let light_dir = normalize(&light.position);
            dot(&normal, &light_dir).max(0.0) * light.intensity
        })
        .sum();

    lighting.ambient + diffuse * (1.0 - lighting.metalness)
}

/// Applies lighting to a color
pub fn apply_lighting(color: Rgb, intensity: f64) -> Rgb {
    let channel = |c: u8| (c as f64 * intensity).clamp(0.0, 255.0) as u8;
    Rgb::new(channel(color.r), channel(color.g), channel(color.b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DirectionalLight;
    use std::f64::consts::FRAC_PI_2;

    fn assert_close(a: [f64; 3], b: [f64; 3]) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < 1e-9, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn rotation_y_quarter_turn() {
        let rotated = multiply_matrix_vector(&rotation_y(FRAC_PI_2), &[1.0, 2.0, 0.0]);
        assert_close(rotated, [0.0, 2.0, -1.0]);
    }

    #[test]
    fn face_normal_follows_winding() {
        let n = face_normal(&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert_close(n, [0.0, 0.0, 1.0]);
        let n = face_normal(&[0.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[1.0, 0.0, 0.0]);
        assert_close(n, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn normalize_keeps_zero_vector() {
        assert_eq!(normalize(&[0.0; 3]), [0.0; 3]);
        assert_close(normalize(&[3.0, 0.0, 4.0]), [0.6, 0.0, 0.8]);
    }

    #[test]
    fn light_intensity_is_two_sided() {
        let lighting = LightingConfig {
            ambient: 0.25,
            metalness: 0.5,
            directional: vec![DirectionalLight {
                position: [0.0, 0.0, 10.0],
                intensity: 1.0,
            }],
        };
        let eye = [0.0, 0.0, 100.0];
        let front = calculate_light_intensity(&[0.0, 0.0, 1.0], &[0.0; 3], &eye, &lighting);
        let back = calculate_light_intensity(&[0.0, 0.0, -1.0], &[0.0; 3], &eye, &lighting);
        assert!((front - 0.75).abs() < 1e-9);
        assert!((back - front).abs() < 1e-9);
    }

    #[test]
    fn lighting_saturates_channels() {
        let lit = apply_lighting(Rgb::new(200, 100, 0), 2.0);
        assert_eq!(lit, Rgb::new(255, 200, 0));
        let dark = apply_lighting(Rgb::new(200, 100, 0), 0.5);
        assert_eq!(dark, Rgb::new(100, 50, 0));
    }
}
