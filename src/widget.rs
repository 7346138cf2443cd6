use crate::color::{Channel, Rgb};
use crate::config::{Config, NEAR_PLANE};
use crate::graphics::{draw_line, draw_triangle, Canvas, Cell, Frame};
use crate::math::{multiply_matrix_vector, rotation_y};
use crate::mesh::Mesh;
use crate::state::AppState;
use crate::vertex::Vertex;
use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::time::Instant;
use tracing::debug;

/// Rows used by the color header and the three sliders
pub const PANEL_ROWS: u16 = 4;
/// Slider step for PageUp/PageDown
const COARSE_STEP: i16 = 16;
/// `"> green ["`
const SLIDER_PREFIX: u16 = 9;
/// `"] 255"`
const SLIDER_SUFFIX: u16 = 5;

/// What the main loop should do after an event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Heart view: color sliders on top, the rotating mesh below
pub struct HeartWidget {
    mesh: Mesh,
    config: Config,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
}

impl HeartWidget {
    pub fn new(mesh: Mesh, config: Config) -> Self {
        HeartWidget {
            mesh,
            config,
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
        }
    }

    fn eye(&self) -> [f64; 3] {
        [0.0, 0.0, self.config.camera.distance]
    }

    /// Rows taken by the slider panel for a terminal of the given height
    pub fn panel_rows(rows: u16) -> u16 {
        if rows >= PANEL_ROWS + 2 {
            PANEL_ROWS
        } else {
            0
        }
    }

    /// Bar start column and width of the sliders for a terminal this wide
    fn slider_bar(cols: u16) -> Option<(u16, u16)> {
        let width = cols.checked_sub(SLIDER_PREFIX + SLIDER_SUFFIX)?;
        (width >= 2).then_some((SLIDER_PREFIX, width))
    }

    /// Value a pointer at `col` selects on a slider bar, clamped to the range
    pub fn slider_value_at(cols: u16, col: u16) -> Option<u8> {
        let (start, width) = Self::slider_bar(cols)?;
        let offset = col.saturating_sub(start).min(width - 1) as u32;
        let span = (width - 1) as u32;
        Some(((offset * 255 + span / 2) / span) as u8)
    }

    /// Rotates and projects the mesh onto a canvas of `width × height`
    /// square pixels
    fn compute_projected_vertices(
        &self,
        data: &AppState,
        width: usize,
        height: usize,
    ) -> Vec<Vertex> {
        let camera = &self.config.camera;
        let focal = 1.0 / (camera.fov_degrees.to_radians() / 2.0).tan();
        let half_width = width as f64 / 2.0;
        let half_height = height as f64 / 2.0;
        let scale = focal * data.zoom * half_height;
        let rotation = rotation_y(data.yaw);

        self.mesh
            .positions
            .iter()
            .zip(self.mesh.normals.iter())
            .map(|(position, normal)| {
                let position = multiply_matrix_vector(&rotation, position);
                let normal = multiply_matrix_vector(&rotation, normal);
                let depth = camera.distance - position[2];
                Vertex {
                    position,
                    screen_position: [
                        half_width + position[0] * scale / depth,
                        half_height - position[1] * scale / depth,
                    ],
                    depth,
                    normal,
                }
            })
            .collect()
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent, data: &mut AppState) -> Control {
        if key.kind != KeyEventKind::Press {
            return Control::Continue;
        }

        let selected = data.selected;
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Control::Quit;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Control::Quit,
            KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::Char(' ') => {
                data.paused = !data.paused;
            }
            KeyCode::Char('d') | KeyCode::Char('D') => data.debug = !data.debug,
            KeyCode::Char('w') | KeyCode::Char('W') => data.wireframe = !data.wireframe,
            KeyCode::Char('r') | KeyCode::Char('R') => data.reset_view(),
            KeyCode::Char('+') | KeyCode::Char('=') => data.zoom_by(1.1),
            KeyCode::Char('-') | KeyCode::Char('_') => data.zoom_by(1.0 / 1.1),
            KeyCode::Up | KeyCode::BackTab => data.selected = selected.previous(),
            KeyCode::Down | KeyCode::Tab => data.selected = selected.next(),
            KeyCode::Left => {
                data.color.nudge(selected, -1);
            }
            KeyCode::Right => {
                data.color.nudge(selected, 1);
            }
            KeyCode::PageDown => {
                data.color.nudge(selected, -COARSE_STEP);
            }
            KeyCode::PageUp => {
                data.color.nudge(selected, COARSE_STEP);
            }
            KeyCode::Home => data.color.set(selected, 0),
            KeyCode::End => data.color.set(selected, 255),
            _ => {}
        }
        Control::Continue
    }

    /// Pressing or dragging on a slider bar selects and sets that channel.
    /// Returns whether a slider was hit.
    pub fn handle_mouse(
        &mut self,
        mouse: MouseEvent,
        data: &mut AppState,
        cols: u16,
        rows: u16,
    ) -> bool {
        let pressed = matches!(
            mouse.kind,
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left)
        );
        if !pressed || Self::panel_rows(rows) == 0 {
            return false;
        }

        let Some(channel) = (mouse.row as usize)
            .checked_sub(1)
            .and_then(|i| Channel::ALL.get(i).copied())
        else {
            return false;
        };
        let Some(value) = Self::slider_value_at(cols, mouse.column) else {
            return false;
        };
        debug!(channel = channel.label(), value, "slider drag");
        data.selected = channel;
        data.color.set(channel, value);
        true
    }

    /// Paint the whole view into a frame of `cols × rows` cells
    pub fn paint(&mut self, data: &AppState, cols: u16, rows: u16) -> Frame {
        // Update FPS calculation
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
        }

        let background = self.config.scene.background();
        let mut frame = Frame::new(cols, rows, background);
        let panel_rows = Self::panel_rows(rows);
        if panel_rows > 0 {
            self.paint_panel(&mut frame, data);
        }

        let canvas_rows = rows - panel_rows;
        let mut canvas = Canvas::new(cols as usize, canvas_rows as usize * 2, background);
        self.paint_mesh(&mut canvas, data);
        if data.paused {
            canvas.tint(Rgb::BLACK, 0.6);
        }
        frame.blit(&canvas, panel_rows);

        if data.debug {
            self.paint_debug(&mut frame, data, panel_rows);
        }

        // Display 'Paused' if the simulation is paused
        if data.paused && canvas_rows > 0 {
            let text = "Paused";
            let col = cols.saturating_sub(text.len() as u16) / 2;
            frame.put_str(col, panel_rows + canvas_rows / 2, text, Rgb::WHITE);
        }

        frame
    }

    fn paint_mesh(&self, canvas: &mut Canvas, data: &AppState) {
        let (width, height) = (canvas.width(), canvas.height());
        if width == 0 || height == 0 {
            return;
        }
        let vertices = self.compute_projected_vertices(data, width, height);
        // Triangles touching the near plane would project through the camera
        let visible = |t: &[usize; 3]| t.iter().all(|&i| vertices[i].depth > NEAR_PLANE);

        if data.wireframe {
            let color = data.color.color();
            for [a, b, c] in self.mesh.triangles().filter(visible) {
                for (start, end) in [(a, b), (b, c), (c, a)] {
                    let (v0, v1) = (&vertices[start], &vertices[end]);
                    draw_line(
                        v0.screen_position[0],
                        v0.screen_position[1],
                        v1.screen_position[0],
                        v1.screen_position[1],
                        canvas,
                        color,
                    );
                }
            }
        } else {
            let eye = self.eye();
            let base_color = data.color.color();
            for [a, b, c] in self.mesh.triangles().filter(visible) {
                draw_triangle(
                    &vertices[a],
                    &vertices[b],
                    &vertices[c],
                    canvas,
                    &self.config.lighting,
                    &eye,
                    base_color,
                );
            }
        }
    }

    fn paint_panel(&self, frame: &mut Frame, data: &AppState) {
        let cols = frame.cols();
        let panel = Rgb::new(32, 8, 24);
        let blank = Cell {
            symbol: ' ',
            fg: Rgb::WHITE,
            bg: panel,
        };
        for row in 0..PANEL_ROWS {
            for col in 0..cols {
                frame.set(col, row, blank);
            }
        }

        let header = format!(" Color  {}", data.color.css());
        frame.put_str(0, 0, &header, Rgb::WHITE);
        let hint = "arrows: adjust  w: wireframe  p: pause  q: quit ";
        if let Some(col) = cols.checked_sub(hint.len() as u16) {
            if col as usize > header.len() {
                frame.put_str(col, 0, hint, Rgb::new(160, 160, 160));
            }
        }

        let Some((start, width)) = Self::slider_bar(cols) else {
            return;
        };
        for (i, channel) in Channel::ALL.iter().enumerate() {
            let row = i as u16 + 1;
            let value = data.color.get(*channel);
            let marker = if *channel == data.selected { '>' } else { ' ' };
            frame.put_str(0, row, &format!("{marker} {:<5} [", channel.label()), Rgb::WHITE);

            let filled = (value as u32 * width as u32 / 255) as u16;
            let tint = channel.tint(value.max(64));
            for offset in 0..width {
                let (symbol, fg) = if offset < filled {
                    ('█', tint)
                } else {
                    ('─', Rgb::new(96, 96, 96))
                };
                frame.set(start + offset, row, Cell { symbol, fg, bg: panel });
            }
            frame.put_str(start + width, row, &format!("] {value:>3}"), Rgb::WHITE);
        }
    }

    fn paint_debug(&self, frame: &mut Frame, data: &AppState, top: u16) {
        let lines = [
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            format!("Yaw: {:.2}", data.yaw),
            format!("Zoom: {:.2}", data.zoom),
            format!("Color: {}", data.color.css()),
            format!(
                "Mesh: {} vertices, {} triangles",
                self.mesh.vertex_count(),
                self.mesh.triangle_count()
            ),
            format!("FPS: {:.2}", self.fps),
        ];
        for (i, line) in lines.iter().enumerate() {
            frame.put_str(1, top + i as u16, line, Rgb::WHITE);
        }
    }
}
