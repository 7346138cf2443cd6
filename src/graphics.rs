use crate::color::Rgb;
use crate::config::LightingConfig;
use crate::math::{apply_lighting, calculate_light_intensity, edge_function, normalize};
use crate::vertex::Vertex;

/// Upper half block: foreground paints the top pixel, background the bottom
pub const HALF_BLOCK: char = '▀';

/// RGB pixel buffer with a depth buffer
#[derive(Clone, Debug)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
    depth: Vec<f64>,
}

impl Canvas {
    pub fn new(width: usize, height: usize, background: Rgb) -> Self {
        Canvas {
            width,
            height,
            pixels: vec![background; width * height],
            depth: vec![f64::INFINITY; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    /// Blends every pixel toward `color`
    pub fn tint(&mut self, color: Rgb, amount: f64) {
        for pixel in self.pixels.iter_mut() {
            *pixel = pixel.blend(color, amount);
        }
    }
}

/// Draws a triangle with per-pixel lighting.
///
/// Either winding is accepted; depth testing keeps the nearest surface.
pub fn draw_triangle(
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    canvas: &mut Canvas,
    lighting: &LightingConfig,
    eye: &[f64; 3],
    base_color: Rgb,
) {
    if canvas.width == 0 || canvas.height == 0 {
        return;
    }

    // Precompute area of the triangle
    let area = edge_function(&v0.screen_position, &v1.screen_position, &v2.screen_position);
    if area.abs() < f64::EPSILON {
        return;
    }

    // Compute bounding box of the triangle
    let min_x = v0.screen_position[0]
        .min(v1.screen_position[0])
        .min(v2.screen_position[0])
        .floor()
        .max(0.0);
    let max_x = v0.screen_position[0]
        .max(v1.screen_position[0])
        .max(v2.screen_position[0])
        .ceil()
        .min(canvas.width as f64 - 1.0);
    let min_y = v0.screen_position[1]
        .min(v1.screen_position[1])
        .min(v2.screen_position[1])
        .floor()
        .max(0.0);
    let max_y = v0.screen_position[1]
        .max(v1.screen_position[1])
        .max(v2.screen_position[1])
        .ceil()
        .min(canvas.height as f64 - 1.0);
    if min_x > max_x || min_y > max_y {
        return;
    }
    let (min_x, max_x) = (min_x as usize, max_x as usize);
    let (min_y, max_y) = (min_y as usize, max_y as usize);

    // For each pixel in the bounding box
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = [x as f64 + 0.5, y as f64 + 0.5];

            let w0 = edge_function(&v1.screen_position, &v2.screen_position, &p);
            let w1 = edge_function(&v2.screen_position, &v0.screen_position, &p);
            let w2 = edge_function(&v0.screen_position, &v1.screen_position, &p);

            let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
            if !inside {
                continue;
            }

            // Barycentric coordinates; the sign of `area` cancels out
            let w0 = w0 / area;
            let w1 = w1 / area;
            let w2 = w2 / area;

            let depth = v0.depth * w0 + v1.depth * w1 + v2.depth * w2;
            let offset = y * canvas.width + x;
            if depth >= canvas.depth[offset] {
                continue;
            }
            canvas.depth[offset] = depth;

            let position = [
                v0.position[0] * w0 + v1.position[0] * w1 + v2.position[0] * w2,
                v0.position[1] * w0 + v1.position[1] * w1 + v2.position[1] * w2,
                v0.position[2] * w0 + v1.position[2] * w1 + v2.position[2] * w2,
            ];
            let normal = normalize(&[
                v0.normal[0] * w0 + v1.normal[0] * w1 + v2.normal[0] * w2,
                v0.normal[1] * w0 + v1.normal[1] * w1 + v2.normal[1] * w2,
                v0.normal[2] * w0 + v1.normal[2] * w1 + v2.normal[2] * w2,
            ]);

            let intensity = calculate_light_intensity(&normal, &position, eye, lighting);
            canvas.pixels[offset] = apply_lighting(base_color, intensity);
        }
    }
}

/// Draws a line between two points using Bresenham's algorithm
pub fn draw_line(x0: f64, y0: f64, x1: f64, y1: f64, canvas: &mut Canvas, color: Rgb) {
    let (mut x0, mut y0, x1, y1) = (
        x0.round() as isize,
        y0.round() as isize,
        x1.round() as isize,
        y1.round() as isize,
    );
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error value e_xy

    loop {
        if x0 >= 0 && x0 < canvas.width as isize && y0 >= 0 && y0 < canvas.height as isize {
            canvas.pixels[y0 as usize * canvas.width + x0 as usize] = color;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// One terminal cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub symbol: char,
    pub fg: Rgb,
    pub bg: Rgb,
}

/// Grid of terminal cells ready to be written out
#[derive(Clone, Debug)]
pub struct Frame {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl Frame {
    pub fn new(cols: u16, rows: u16, background: Rgb) -> Self {
        let blank = Cell {
            symbol: ' ',
            fg: Rgb::WHITE,
            bg: background,
        };
        Frame {
            cols,
            rows,
            cells: vec![blank; cols as usize * rows as usize],
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cell(&self, col: u16, row: u16) -> Cell {
        self.cells[row as usize * self.cols as usize + col as usize]
    }

    pub fn set(&mut self, col: u16, row: u16, cell: Cell) {
        if col < self.cols && row < self.rows {
            self.cells[row as usize * self.cols as usize + col as usize] = cell;
        }
    }

    /// Writes text starting at `(col, row)`, keeping each cell's background.
    /// Text past the right edge is dropped.
    pub fn put_str(&mut self, col: u16, row: u16, text: &str, fg: Rgb) {
        if row >= self.rows {
            return;
        }
        for (i, symbol) in text.chars().enumerate() {
            let Some(c) = col.checked_add(i as u16).filter(|c| *c < self.cols) else {
                break;
            };
            let bg = self.cell(c, row).bg;
            self.set(c, row, Cell { symbol, fg, bg });
        }
    }

    /// Copies a canvas into the rows starting at `top`, two pixels per cell
    pub fn blit(&mut self, canvas: &Canvas, top: u16) {
        let cols = canvas.width().min(self.cols as usize);
        for row in 0..canvas.height().div_ceil(2) {
            let frame_row = top as usize + row;
            if frame_row >= self.rows as usize {
                break;
            }
            for col in 0..cols {
                let upper = canvas.pixel(col, row * 2);
                let lower = if row * 2 + 1 < canvas.height() {
                    canvas.pixel(col, row * 2 + 1)
                } else {
                    upper
                };
                self.set(
                    col as u16,
                    frame_row as u16,
                    Cell {
                        symbol: HALF_BLOCK,
                        fg: upper,
                        bg: lower,
                    },
                );
            }
        }
    }
}
