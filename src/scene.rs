// scene.rs — 视场示意图渲染
// 每帧从已解析的 FovState 全量重绘，固定顺序：
//   角度网格 → 透视房间 → 遮罩 → 视场矩形 → 对角线 → 标注 → 宽高比叠加框
// 渲染器本身不做校验，输入由 fov::resolve 夹取并解析。

use egui::{Color32, Stroke};
use glam::Vec2;

use crate::canvas::CanvasTarget;
use crate::fov::FovState;

/// 显示选项。scale 的含义是"每 100 逻辑像素多少度"。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayOptions {
    pub scale: f32,
    pub show_grid: bool,
    pub show_room: bool,
    pub show_diagonals: bool,
    pub dim_outside: bool,
}

impl DisplayOptions {
    pub fn new() -> Self {
        Self {
            scale: 20.0,
            show_grid: true,
            show_room: true,
            show_diagonals: true,
            dim_outside: true,
        }
    }
}

/// 叠加框的宽高比，与视场状态无关。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio {
    pub width: f32,
    pub height: f32,
}

impl AspectRatio {
    fn ratio(&self) -> f32 {
        self.width / self.height
    }
}

pub const ASPECT_PRESETS: &[(&str, f32, f32)] = &[
    ("16:9", 16.0, 9.0),
    ("4:3", 4.0, 3.0),
    ("3:2", 3.0, 2.0),
    ("1:1", 1.0, 1.0),
    ("21:9", 21.0, 9.0),
    ("9:16", 9.0, 16.0),
];

// 调色板（原工具从 CSS 变量取色，这里固定下来）
const GRID: Color32 = Color32::from_rgb(51, 65, 85);
const AXIS: Color32 = Color32::from_rgba_premultiplied(90, 104, 125, 178);
const TICK: Color32 = Color32::from_rgb(154, 164, 178);
const ROOM: Color32 = Color32::from_rgba_premultiplied(26, 26, 26, 26);
const DIM: Color32 = Color32::from_rgba_premultiplied(4, 7, 13, 140);
const FOV: Color32 = Color32::from_rgb(110, 231, 255);
const FOV_GUIDE: Color32 = Color32::from_rgba_premultiplied(88, 185, 204, 204);
const LABEL: Color32 = Color32::from_rgb(203, 213, 225);
const ASPECT_STROKE: Color32 = Color32::from_rgba_premultiplied(38, 81, 89, 89);
const ASPECT_FILL: Color32 = Color32::from_rgba_premultiplied(13, 28, 31, 31);

const ASPECT_MARGIN: f32 = 16.0;

/// 视场矩形：h·pxPerDeg × v·pxPerDeg，画布居中。返回 (min, size)。
pub fn view_rect(canvas: Vec2, state: &FovState, scale: f32) -> (Vec2, Vec2) {
    let px_per_deg = 100.0 / scale;
    let size = Vec2::new(state.h as f32 * px_per_deg, state.v as f32 * px_per_deg);
    ((canvas - size) / 2.0, size)
}

/// 给定宽高比下，扣除四边 16px 边距后能放进画布的最大居中矩形。
/// 宽或高非正时返回 None（不绘制）。
pub fn aspect_box(canvas: Vec2, aspect: &AspectRatio) -> Option<(Vec2, Vec2)> {
    if !(aspect.width > 0.0 && aspect.height > 0.0) {
        return None;
    }
    let ratio = aspect.ratio();
    let mut w = canvas.x - ASPECT_MARGIN * 2.0;
    let mut h = w / ratio;
    if h > canvas.y - ASPECT_MARGIN * 2.0 {
        h = canvas.y - ASPECT_MARGIN * 2.0;
        w = h * ratio;
    }
    Some(((canvas - Vec2::new(w, h)) / 2.0, Vec2::new(w, h)))
}

pub fn render(
    canvas: &mut dyn CanvasTarget,
    state: &FovState,
    options: &DisplayOptions,
    aspect: &AspectRatio,
) {
    let size = canvas.size();
    let px_per_deg = 100.0 / options.scale;

    if options.show_grid {
        draw_angular_grid(canvas, px_per_deg);
    }
    if options.show_room {
        draw_room(canvas);
    }

    let (view_min, view_size) = view_rect(size, state, options.scale);

    if options.dim_outside {
        canvas.dim_outside(view_min, view_size, DIM);
    }

    canvas.round_rect(view_min, view_size, 6.0, Stroke::new(2.0, FOV));

    if options.show_diagonals {
        let guide = Stroke::new(2.0, FOV_GUIDE);
        let tl = view_min;
        let br = view_min + view_size;
        let bl = Vec2::new(view_min.x, br.y);
        let tr = Vec2::new(br.x, view_min.y);
        canvas.dashed_path(&[tl, br], false, guide, 6.0, 6.0);
        canvas.dashed_path(&[bl, tr], false, guide, 6.0, 6.0);
    }

    draw_labels(canvas, state, view_min, view_size);
    draw_aspect_box(canvas, aspect);
}

/// 等角度参考网格：每 10° 一圈轴对齐菱形（近似等度线），
/// 外加十字轴线和水平方向的度数刻度。
fn draw_angular_grid(canvas: &mut dyn CanvasTarget, px_per_deg: f32) {
    let size = canvas.size();
    let center = size / 2.0;
    let grid = Stroke::new(1.0, GRID);

    for deg in (10..=170).step_by(10) {
        let rad = deg as f32 * px_per_deg / std::f32::consts::SQRT_2;
        let diamond = [
            Vec2::new(center.x, center.y - rad),
            Vec2::new(center.x + rad, center.y),
            Vec2::new(center.x, center.y + rad),
            Vec2::new(center.x - rad, center.y),
        ];
        canvas.dashed_path(&diamond, true, grid, 2.0, 4.0);
    }

    let axis = Stroke::new(1.0, AXIS);
    canvas.line(Vec2::new(0.0, center.y), Vec2::new(size.x, center.y), axis);
    canvas.line(Vec2::new(center.x, 0.0), Vec2::new(center.x, size.y), axis);

    // 水平刻度：每 20° 一个，半度间距便于阅读，贴近边缘的跳过
    let mut deg: i32 = -160;
    while deg <= 160 {
        let x = center.x + deg as f32 * px_per_deg / 2.0;
        if x >= 20.0 && x <= size.x - 20.0 {
            canvas.text(
                Vec2::new(x, center.y + 12.0),
                &format!("{}°", deg.abs()),
                10.0,
                TICK,
                0.0,
            );
        }
        deg += 20;
    }
}

/// 装饰性的单点透视地面网格，尺寸只跟画布大小有关，与视场无关。
fn draw_room(canvas: &mut dyn CanvasTarget) {
    let size = canvas.size();
    let cx = size.x / 2.0;
    let cy = size.y / 2.0 + 40.0;
    let depth = size.x.min(size.y) * 0.55;
    let half = size.x.min(size.y) * 0.8 / 2.0;
    let stroke = Stroke::new(1.0, ROOM);

    // 纵深方向的横线，向消失点收拢
    for i in 0..=10 {
        let t = i as f32 / 10.0;
        let y = cy + t * depth;
        let reach = half * (1.0 - t * 0.6);
        canvas.line(Vec2::new(cx - reach, y), Vec2::new(cx + reach, y), stroke);
    }
    // 从远端边缘向外张开的扇线
    for i in -5..=5 {
        let t = i as f32 / 5.0;
        let x = cx + t * half;
        canvas.line(
            Vec2::new(x, cy),
            Vec2::new(x + t * depth * 0.6, cy + depth),
            stroke,
        );
    }
}

fn draw_labels(canvas: &mut dyn CanvasTarget, state: &FovState, min: Vec2, size: Vec2) {
    let cx = min.x + size.x / 2.0;
    let cy = min.y + size.y / 2.0;

    canvas.text(
        Vec2::new(cx, min.y - 12.0),
        &format!("{:.1}° H", state.h),
        12.0,
        LABEL,
        0.0,
    );
    canvas.text(
        Vec2::new(min.x - 12.0, cy),
        &format!("{:.1}° V", state.v),
        12.0,
        LABEL,
        -std::f32::consts::FRAC_PI_2,
    );
    canvas.text(
        Vec2::new(cx, min.y + size.y + 16.0),
        &format!("{:.1}° D", state.d),
        12.0,
        LABEL,
        0.0,
    );
}

fn draw_aspect_box(canvas: &mut dyn CanvasTarget, aspect: &AspectRatio) {
    let Some((min, size)) = aspect_box(canvas.size(), aspect) else {
        return;
    };
    canvas.dashed_round_rect(
        min,
        size,
        8.0,
        ASPECT_FILL,
        Stroke::new(1.0, ASPECT_STROKE),
        4.0,
        6.0,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};
    use crate::fov::{self, FovState, Mode};

    fn resolved() -> FovState {
        fov::resolve(FovState { h: 90.0, v: 59.3, d: 0.0 }, Mode::Hv)
    }

    fn options_off() -> DisplayOptions {
        DisplayOptions {
            scale: 20.0,
            show_grid: false,
            show_room: false,
            show_diagonals: false,
            dim_outside: false,
        }
    }

    const ASPECT_16_9: AspectRatio = AspectRatio { width: 16.0, height: 9.0 };

    #[test]
    fn view_rect_is_exact_at_round_scale() {
        // scale 10°/100px → 1° = 10px，90° 正好 900px
        let state = FovState { h: 90.0, v: 60.0, d: 0.0 };
        let (min, size) = view_rect(Vec2::new(1000.0, 800.0), &state, 10.0);
        assert_eq!(size.x, 900.0);
        assert_eq!(size.y, 600.0);
        assert_eq!(min.x, 50.0);
        assert_eq!(min.y, 100.0);
    }

    #[test]
    fn aspect_box_is_maximal_and_exact() {
        let (_, size) = aspect_box(Vec2::new(800.0, 600.0), &ASPECT_16_9).unwrap();
        // 宽度受限：800 - 2*16 = 768
        assert_eq!(size.x, 768.0);
        assert!(size.y <= 568.0);
        let ratio = size.x as f64 / size.y as f64;
        assert!((ratio - 16.0 / 9.0).abs() < 1e-6, "ratio = {ratio}");
    }

    #[test]
    fn aspect_box_switches_to_height_limit() {
        let (min, size) = aspect_box(Vec2::new(800.0, 300.0), &ASPECT_16_9).unwrap();
        assert_eq!(size.y, 268.0);
        assert!(size.x < 768.0);
        let ratio = size.x as f64 / size.y as f64;
        assert!((ratio - 16.0 / 9.0).abs() < 1e-6, "ratio = {ratio}");
        // 居中
        assert!((min.x * 2.0 + size.x - 800.0).abs() < 0.01);
    }

    #[test]
    fn aspect_box_rejects_degenerate_ratio() {
        assert!(aspect_box(Vec2::new(800.0, 600.0), &AspectRatio { width: 0.0, height: 9.0 }).is_none());
        assert!(aspect_box(Vec2::new(800.0, 600.0), &AspectRatio { width: 16.0, height: -1.0 }).is_none());
    }

    #[test]
    fn all_toggles_off_draws_only_rect_labels_and_overlay() {
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        render(&mut canvas, &resolved(), &options_off(), &ASPECT_16_9);

        assert_eq!(canvas.count(|op| matches!(op, DrawOp::RoundRect { .. })), 1);
        assert_eq!(canvas.count(|op| matches!(op, DrawOp::Text { .. })), 3);
        assert_eq!(canvas.count(|op| matches!(op, DrawOp::DashedRoundRect { .. })), 1);
        assert_eq!(canvas.count(|op| matches!(op, DrawOp::Line { .. })), 0);
        assert_eq!(canvas.count(|op| matches!(op, DrawOp::DashedPath { .. })), 0);
        assert_eq!(canvas.count(|op| matches!(op, DrawOp::DimOutside { .. })), 0);
    }

    #[test]
    fn labels_show_resolved_angles() {
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        render(&mut canvas, &resolved(), &options_off(), &ASPECT_16_9);

        let texts: Vec<&str> = canvas
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert!(texts.contains(&"90.0° H"), "{texts:?}");
        assert!(texts.contains(&"59.3° V"), "{texts:?}");
        assert!(texts.contains(&"98.0° D"), "{texts:?}");

        // V 标注竖排
        let rotated = canvas.count(|op| matches!(op, DrawOp::Text { angle, .. } if *angle != 0.0));
        assert_eq!(rotated, 1);
    }

    #[test]
    fn grid_draws_diamonds_axes_and_ticks() {
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let mut options = options_off();
        options.show_grid = true;
        render(&mut canvas, &resolved(), &options, &ASPECT_16_9);

        // 10°..=170° 每 10° 一圈菱形
        assert_eq!(
            canvas.count(|op| matches!(op, DrawOp::DashedPath { closed: true, .. })),
            17
        );
        // 两条轴线
        assert_eq!(canvas.count(|op| matches!(op, DrawOp::Line { .. })), 2);
        // scale=20 → pxPerDeg=5，±160° 的刻度正好压在画布边缘被跳过，
        // 剩 15 个刻度 + 3 个角度标注
        assert_eq!(canvas.count(|op| matches!(op, DrawOp::Text { .. })), 18);
    }

    #[test]
    fn room_draws_depth_and_fan_lines() {
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let mut options = options_off();
        options.show_room = true;
        render(&mut canvas, &resolved(), &options, &ASPECT_16_9);

        assert_eq!(canvas.count(|op| matches!(op, DrawOp::Line { .. })), 22);
    }

    #[test]
    fn dim_mask_cuts_out_the_view_rect() {
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let mut options = options_off();
        options.dim_outside = true;
        let state = resolved();
        render(&mut canvas, &state, &options, &ASPECT_16_9);

        let (expect_min, expect_size) = view_rect(Vec2::new(800.0, 600.0), &state, options.scale);
        let dims: Vec<_> = canvas
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::DimOutside { min, size } => Some((*min, *size)),
                _ => None,
            })
            .collect();
        assert_eq!(dims, vec![(expect_min, expect_size)]);
    }

    #[test]
    fn diagonals_are_corner_to_corner_dashes() {
        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        let mut options = options_off();
        options.show_diagonals = true;
        render(&mut canvas, &resolved(), &options, &ASPECT_16_9);

        let dashes: Vec<_> = canvas
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::DashedPath { points, closed, dash, gap } => {
                    Some((points.len(), *closed, *dash, *gap))
                }
                _ => None,
            })
            .collect();
        assert_eq!(dashes, vec![(2, false, 6.0, 6.0), (2, false, 6.0, 6.0)]);
    }

    #[test]
    fn degenerate_state_still_renders() {
        // 哨兵 1° 只是画出一个很小的矩形，不会失败
        let state = fov::resolve(FovState { h: 100.0, v: 0.0, d: 50.0 }, Mode::Hd);
        assert_eq!(state.v, 1.0);

        let mut canvas = RecordingCanvas::new(800.0, 600.0);
        render(&mut canvas, &state, &DisplayOptions::new(), &ASPECT_16_9);
        let small = canvas.count(
            |op| matches!(op, DrawOp::RoundRect { size, .. } if size.y < 10.0 && size.y > 0.0),
        );
        assert_eq!(small, 1);
    }
}
