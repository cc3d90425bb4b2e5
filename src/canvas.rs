// canvas.rs — 2D 绘图表面抽象
// 场景渲染只依赖这个 trait，既能画到 egui Painter，
// 也能在测试里录制绘制调用（无需真实窗口）。

use egui::epaint::TextShape;
use egui::{Align2, Color32, FontId, Pos2, Stroke};
use glam::Vec2;

pub trait CanvasTarget {
    /// 画布大小（逻辑像素，几何统一按逻辑像素书写）。
    fn size(&self) -> Vec2;

    fn line(&mut self, from: Vec2, to: Vec2, stroke: Stroke);

    /// 虚线路径；closed 时首尾相连。
    fn dashed_path(&mut self, points: &[Vec2], closed: bool, stroke: Stroke, dash: f32, gap: f32);

    /// 圆角矩形描边（实线）。
    fn round_rect(&mut self, min: Vec2, size: Vec2, radius: f32, stroke: Stroke);

    /// 圆角矩形：半透明填充 + 虚线描边（宽高比叠加框用）。
    fn dashed_round_rect(
        &mut self,
        min: Vec2,
        size: Vec2,
        radius: f32,
        fill: Color32,
        stroke: Stroke,
        dash: f32,
        gap: f32,
    );

    /// 整个画布做半透明遮罩，镂空给定矩形（等价于 even-odd 填充）。
    fn dim_outside(&mut self, min: Vec2, size: Vec2, color: Color32);

    /// 以 center 为中心绘制文本；angle 为弧度，绕中心旋转。
    fn text(&mut self, center: Vec2, text: &str, size: f32, color: Color32, angle: f32);
}

/// 按顺时针方向采样圆角矩形轮廓（每个圆角 6 段），供填充/虚线描边共用。
pub fn rounded_rect_points(min: Vec2, size: Vec2, radius: f32) -> Vec<Vec2> {
    use std::f32::consts::{FRAC_PI_2, PI};

    let r = radius.min(size.x / 2.0).min(size.y / 2.0).max(0.0);
    let corners = [
        (Vec2::new(min.x + r, min.y + r), PI),                      // 左上
        (Vec2::new(min.x + size.x - r, min.y + r), PI + FRAC_PI_2), // 右上
        (Vec2::new(min.x + size.x - r, min.y + size.y - r), 0.0),   // 右下
        (Vec2::new(min.x + r, min.y + size.y - r), FRAC_PI_2),      // 左下
    ];

    const SEGS: usize = 6;
    let mut points = Vec::with_capacity(4 * (SEGS + 1));
    for (center, start) in corners {
        for i in 0..=SEGS {
            let a = start + FRAC_PI_2 * i as f32 / SEGS as f32;
            points.push(center + r * Vec2::new(a.cos(), a.sin()));
        }
    }
    points
}

/// 生产实现：把逻辑像素坐标平移到 egui 画布区域再落到 Painter。
pub struct PainterCanvas<'a> {
    painter: &'a egui::Painter,
    origin: Pos2,
    size: Vec2,
}

impl<'a> PainterCanvas<'a> {
    pub fn new(painter: &'a egui::Painter, rect: egui::Rect) -> Self {
        Self {
            painter,
            origin: rect.min,
            size: Vec2::new(rect.width(), rect.height()),
        }
    }

    fn at(&self, p: Vec2) -> Pos2 {
        Pos2::new(self.origin.x + p.x, self.origin.y + p.y)
    }

    fn rect_at(&self, min: Vec2, size: Vec2) -> egui::Rect {
        egui::Rect::from_min_size(self.at(min), egui::vec2(size.x, size.y))
    }

    fn add_dashed(&self, points: &[Vec2], closed: bool, stroke: Stroke, dash: f32, gap: f32) {
        let mut path: Vec<Pos2> = points.iter().map(|&p| self.at(p)).collect();
        if closed {
            if let Some(&first) = path.first() {
                path.push(first);
            }
        }
        for shape in egui::Shape::dashed_line(&path, stroke, dash, gap) {
            self.painter.add(shape);
        }
    }
}

impl CanvasTarget for PainterCanvas<'_> {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn line(&mut self, from: Vec2, to: Vec2, stroke: Stroke) {
        self.painter.line_segment([self.at(from), self.at(to)], stroke);
    }

    fn dashed_path(&mut self, points: &[Vec2], closed: bool, stroke: Stroke, dash: f32, gap: f32) {
        self.add_dashed(points, closed, stroke, dash, gap);
    }

    fn round_rect(&mut self, min: Vec2, size: Vec2, radius: f32, stroke: Stroke) {
        self.painter.rect_stroke(self.rect_at(min, size), radius, stroke);
    }

    fn dashed_round_rect(
        &mut self,
        min: Vec2,
        size: Vec2,
        radius: f32,
        fill: Color32,
        stroke: Stroke,
        dash: f32,
        gap: f32,
    ) {
        let outline = rounded_rect_points(min, size, radius);
        let filled: Vec<Pos2> = outline.iter().map(|&p| self.at(p)).collect();
        self.painter
            .add(egui::Shape::convex_polygon(filled, fill, Stroke::NONE));
        self.add_dashed(&outline, true, stroke, dash, gap);
    }

    fn dim_outside(&mut self, min: Vec2, size: Vec2, color: Color32) {
        // egui 没有 even-odd 合成，用四条边带覆盖同样的像素
        let w = self.size.x;
        let h = self.size.y;
        let top = min.y.clamp(0.0, h);
        let bottom = (min.y + size.y).clamp(0.0, h);
        let left = min.x.clamp(0.0, w);
        let right = (min.x + size.x).clamp(0.0, w);

        let bands = [
            (Vec2::ZERO, Vec2::new(w, top)),
            (Vec2::new(0.0, bottom), Vec2::new(w, h - bottom)),
            (Vec2::new(0.0, top), Vec2::new(left, bottom - top)),
            (Vec2::new(right, top), Vec2::new(w - right, bottom - top)),
        ];
        for (band_min, band_size) in bands {
            if band_size.x > 0.0 && band_size.y > 0.0 {
                self.painter.rect_filled(self.rect_at(band_min, band_size), 0.0, color);
            }
        }
    }

    fn text(&mut self, center: Vec2, text: &str, size: f32, color: Color32, angle: f32) {
        let target = self.at(center);
        if angle == 0.0 {
            self.painter.text(
                target,
                Align2::CENTER_CENTER,
                text,
                FontId::proportional(size),
                color,
            );
            return;
        }

        // TextShape 绕 pos（文本左上角）旋转；
        // 反推 pos 使旋转后的文本中心落在 target 上
        let galley = self
            .painter
            .layout_no_wrap(text.to_owned(), FontId::proportional(size), color);
        let half = egui::vec2(galley.size().x / 2.0, galley.size().y / 2.0);
        let (sin, cos) = angle.sin_cos();
        let rotated_half = egui::vec2(half.x * cos - half.y * sin, half.x * sin + half.y * cos);
        let mut shape = TextShape::new(target - rotated_half, galley);
        shape.angle = angle;
        self.painter.add(shape);
    }
}

/// 测试替身：按顺序录制所有绘制调用。
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Line { from: Vec2, to: Vec2 },
    DashedPath { points: Vec<Vec2>, closed: bool, dash: f32, gap: f32 },
    RoundRect { min: Vec2, size: Vec2, radius: f32 },
    DashedRoundRect { min: Vec2, size: Vec2, radius: f32 },
    DimOutside { min: Vec2, size: Vec2 },
    Text { center: Vec2, text: String, angle: f32 },
}

#[cfg(test)]
pub struct RecordingCanvas {
    size: Vec2,
    pub ops: Vec<DrawOp>,
}

#[cfg(test)]
impl RecordingCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            ops: Vec::new(),
        }
    }

    pub fn count(&self, pred: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }
}

#[cfg(test)]
impl CanvasTarget for RecordingCanvas {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn line(&mut self, from: Vec2, to: Vec2, _stroke: Stroke) {
        self.ops.push(DrawOp::Line { from, to });
    }

    fn dashed_path(&mut self, points: &[Vec2], closed: bool, _stroke: Stroke, dash: f32, gap: f32) {
        self.ops.push(DrawOp::DashedPath {
            points: points.to_vec(),
            closed,
            dash,
            gap,
        });
    }

    fn round_rect(&mut self, min: Vec2, size: Vec2, radius: f32, _stroke: Stroke) {
        self.ops.push(DrawOp::RoundRect { min, size, radius });
    }

    fn dashed_round_rect(
        &mut self,
        min: Vec2,
        size: Vec2,
        radius: f32,
        _fill: Color32,
        _stroke: Stroke,
        _dash: f32,
        _gap: f32,
    ) {
        self.ops.push(DrawOp::DashedRoundRect { min, size, radius });
    }

    fn dim_outside(&mut self, min: Vec2, size: Vec2, _color: Color32) {
        self.ops.push(DrawOp::DimOutside { min, size });
    }

    fn text(&mut self, center: Vec2, text: &str, _size: f32, _color: Color32, angle: f32) {
        self.ops.push(DrawOp::Text {
            center,
            text: text.to_owned(),
            angle,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounded_outline_stays_inside_bounds() {
        let min = Vec2::new(10.0, 20.0);
        let size = Vec2::new(100.0, 60.0);
        let points = rounded_rect_points(min, size, 8.0);

        assert_eq!(points.len(), 28);
        for p in &points {
            assert!(p.x >= min.x - 0.01 && p.x <= min.x + size.x + 0.01);
            assert!(p.y >= min.y - 0.01 && p.y <= min.y + size.y + 0.01);
        }
    }

    #[test]
    fn corner_radius_is_clamped_to_half_extent() {
        // 半径超过短边一半时收缩成胶囊，不会自交
        let points = rounded_rect_points(Vec2::ZERO, Vec2::new(40.0, 10.0), 30.0);
        for p in &points {
            assert!(p.y >= -0.01 && p.y <= 10.01, "y out of range: {p:?}");
        }
    }
}
