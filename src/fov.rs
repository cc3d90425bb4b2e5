// fov.rs — 视场角求解与查看器状态
// 投影模型：直线（针孔）投影。对角线关系：
//   tan(D/2)^2 = tan(H/2)^2 + tan(V/2)^2

use crate::scene::{AspectRatio, DisplayOptions};

/// 求解模式：三个角中哪两个是自由输入、哪一个被推导。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Hv, // 1. 输入 H/V，推导对角线 D
    Hd, // 2. 输入 H/D，推导垂直 V
    Vd, // 3. 输入 V/D，推导水平 H
}

/// 已解析的视场角，单位均为度。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FovState {
    pub h: f64,
    pub v: f64,
    pub d: f64,
}

fn tan_half(deg: f64) -> f64 {
    (deg / 2.0).to_radians().tan()
}

fn from_tan_half(t: f64) -> f64 {
    2.0 * t.atan().to_degrees()
}

/// H/V → D。对任意有限的 h, v > 0 都成立，结果 ≥ max(h, v) 且 < h + v。
pub fn diagonal_from_hv(h: f64, v: f64) -> f64 {
    let th = tan_half(h);
    let tv = tan_half(v);
    from_tan_half((th * th + tv * tv).sqrt())
}

/// H/D → V。若 tan(d/2) ≤ tan(h/2)，对角线与水平几何上不相容，
/// 返回 1° 的哨兵值而不是让 NaN 流进渲染（与原工具兼容）。
pub fn vertical_from_hd(h: f64, d: f64) -> f64 {
    let th = tan_half(h);
    let td = tan_half(d);
    if td <= th {
        return 1.0;
    }
    from_tan_half((td * td - th * th).max(0.0).sqrt())
}

/// V/D → H。与 vertical_from_hd 对称。
pub fn horizontal_from_vd(v: f64, d: f64) -> f64 {
    let tv = tan_half(v);
    let td = tan_half(d);
    if td <= tv {
        return 1.0;
    }
    from_tan_half((td * td - tv * tv).max(0.0).sqrt())
}

/// 夹取输入后按模式推导第三个角，返回完全一致的状态。
/// 夹取范围（H/V: 1..=200，D: 1..=260）是产品层面的合理镜头范围，
/// 同时保证画布几何有界。
pub fn resolve(state: FovState, mode: Mode) -> FovState {
    let h = state.h.clamp(1.0, 200.0);
    let v = state.v.clamp(1.0, 200.0);
    let d = state.d.clamp(1.0, 260.0);

    match mode {
        Mode::Hv => FovState { h, v, d: diagonal_from_hv(h, v) },
        Mode::Hd => FovState { h, v: vertical_from_hd(h, d), d },
        Mode::Vd => FovState { h: horizontal_from_vd(v, d), v, d },
    }
}

/// 由对角线视场角换算 35mm 等效焦距（全画幅对角线 36x24）。
pub fn equivalent_focal_mm(d_deg: f64) -> f64 {
    let d = d_deg.clamp(0.01, 179.9);
    let full_frame_diag = (36.0f64 * 36.0 + 24.0 * 24.0).sqrt();
    full_frame_diag / (2.0 * tan_half(d))
}

pub struct FovViewer {
    pub state: FovState,
    pub mode: Mode,
    pub options: DisplayOptions,
    pub aspect: AspectRatio,
    /// 预设下标（scene::ASPECT_PRESETS），None 表示自定义。
    pub aspect_preset: Option<usize>,
    pub is_fullscreen: bool,
}

impl FovViewer {
    pub fn new() -> Self {
        Self {
            state: FovState { h: 90.0, v: 59.3, d: 0.0 },
            mode: Mode::Hv,
            options: DisplayOptions::new(),
            aspect: AspectRatio { width: 16.0, height: 9.0 },
            aspect_preset: Some(0),
            is_fullscreen: false,
        }
    }

    pub fn reset_view(&mut self) {
        self.state = FovState { h: 90.0, v: 59.3, d: 0.0 };
        self.mode = Mode::Hv;
        self.options.scale = DisplayOptions::new().scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-3;

    #[test]
    fn diagonal_matches_known_lens() {
        // tan(49.007°) = sqrt(tan²45° + tan²29.65°)
        let d = diagonal_from_hv(90.0, 59.3);
        assert!((d - 98.0).abs() < 0.1, "d = {d}");
    }

    #[test]
    fn diagonal_bounds() {
        for &(h, v) in &[(10.0, 10.0), (35.0, 90.0), (120.0, 45.0), (170.0, 170.0)] {
            let d = diagonal_from_hv(h, v);
            let max = if h > v { h } else { v };
            assert!(d >= max, "d = {d} < max({h}, {v})");
            assert!(d < h + v, "d = {d} >= {h} + {v}");
        }
    }

    #[test]
    fn diagonal_is_monotonic() {
        let mut prev = diagonal_from_hv(10.0, 60.0);
        for h in [20.0, 40.0, 80.0, 120.0, 160.0] {
            let d = diagonal_from_hv(h, 60.0);
            assert!(d > prev, "not increasing in h at {h}");
            prev = d;
        }
        let mut prev = diagonal_from_hv(60.0, 10.0);
        for v in [20.0, 40.0, 80.0, 120.0, 160.0] {
            let d = diagonal_from_hv(60.0, v);
            assert!(d > prev, "not increasing in v at {v}");
            prev = d;
        }
    }

    #[test]
    fn hd_round_trip_recovers_vertical() {
        for h in [20.0, 45.0, 90.0, 120.0, 150.0] {
            for v in [15.0, 59.3, 100.0, 140.0] {
                let d = diagonal_from_hv(h, v);
                let back = vertical_from_hd(h, d);
                assert!((back - v).abs() < EPS, "h={h} v={v} d={d} back={back}");
            }
        }
    }

    #[test]
    fn vd_round_trip_recovers_horizontal() {
        for h in [20.0, 45.0, 90.0, 120.0, 150.0] {
            for v in [15.0, 59.3, 100.0, 140.0] {
                let d = diagonal_from_hv(h, v);
                let back = horizontal_from_vd(v, d);
                assert!((back - h).abs() < EPS, "h={h} v={v} d={d} back={back}");
            }
        }
    }

    #[test]
    fn incompatible_diagonal_returns_sentinel() {
        // 对角线小于水平：几何上不可能，固定返回 1°
        assert_eq!(vertical_from_hd(100.0, 50.0), 1.0);
        assert_eq!(horizontal_from_vd(100.0, 50.0), 1.0);
        // 相等同样触发
        assert_eq!(vertical_from_hd(80.0, 80.0), 1.0);
    }

    #[test]
    fn resolve_clamps_before_deriving() {
        let s = resolve(FovState { h: 500.0, v: -3.0, d: 0.0 }, Mode::Hv);
        assert_eq!(s.h, 200.0);
        assert_eq!(s.v, 1.0);
        assert!((s.d - diagonal_from_hv(200.0, 1.0)).abs() < EPS);

        let s = resolve(FovState { h: 120.0, v: 0.0, d: 300.0 }, Mode::Hd);
        assert_eq!(s.d, 260.0);
        assert!((s.v - vertical_from_hd(120.0, 260.0)).abs() < EPS);
    }

    #[test]
    fn resolve_hd_satisfies_identity() {
        let s = resolve(FovState { h: 120.0, v: 0.0, d: 150.0 }, Mode::Hd);
        let d = diagonal_from_hv(s.h, s.v);
        assert!((d - 150.0).abs() < EPS, "identity broken: {d}");
    }

    #[test]
    fn equivalent_focal_for_normal_lens() {
        // 46.8° 对角 ≈ 50mm（全画幅）
        let f = equivalent_focal_mm(46.8);
        assert!((f - 50.0).abs() < 0.5, "f = {f}");
    }
}
