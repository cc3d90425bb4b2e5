// renderer.rs — 表面管理与 egui 渲染
// 示意图全部由 egui 矢量图形承载，wgpu 侧只做清屏 + egui 渲染通道，
// 不需要自定义管线。

use winit::window::Window;

fn setup_egui_ui_fonts(ctx: &egui::Context) {
    // UI 字体加载策略（多语言）：
    // - 运行时动态搜索：系统字体目录 +（可选）exe 同目录/工作目录的 ./assets
    // - 界面默认简体中文，优先找覆盖 CJK 的字体
    //
    // 说明：ab_glyph 对 .ttc 支持不稳定，因此优先 .ttf/.otf；.ttc 仍会尝试，失败会自动跳过。

    fn try_load_font_from_path(path: &std::path::Path) -> Option<Vec<u8>> {
        let bytes = std::fs::read(path).ok()?;
        if ab_glyph::FontArc::try_from_vec(bytes.clone()).is_ok() {
            Some(bytes)
        } else {
            None
        }
    }

    let mut candidates: Vec<std::path::PathBuf> = Vec::new();

    // 1) 系统字体目录（跨平台）
    if cfg!(windows) {
        let win_fonts = std::path::PathBuf::from(r"C:\Windows\Fonts");
        candidates.push(win_fonts.join("msyh.ttf")); // Microsoft YaHei
        candidates.push(win_fonts.join("simhei.ttf"));
        candidates.push(win_fonts.join("Deng.ttf")); // DengXian
        candidates.push(win_fonts.join("meiryo.ttc"));
        candidates.push(win_fonts.join("malgun.ttf"));
        candidates.push(win_fonts.join("segoeui.ttf"));
        candidates.push(win_fonts.join("arial.ttf"));
    } else if cfg!(target_os = "macos") {
        candidates.push(std::path::PathBuf::from("/System/Library/Fonts/PingFang.ttc"));
        candidates.push(std::path::PathBuf::from("/System/Library/Fonts/Hiragino Sans GB.ttc"));
        candidates.push(std::path::PathBuf::from("/System/Library/Fonts/Helvetica.ttc"));
        candidates.push(std::path::PathBuf::from(
            "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        ));
        candidates.push(std::path::PathBuf::from("/Library/Fonts/NotoSansCJK-Regular.ttc"));
        candidates.push(std::path::PathBuf::from("/Library/Fonts/NotoSansSC-Regular.otf"));
        if let Ok(home) = std::env::var("HOME") {
            let home = std::path::PathBuf::from(home);
            candidates.push(home.join("Library/Fonts/NotoSansCJK-Regular.ttc"));
            candidates.push(home.join("Library/Fonts/NotoSansSC-Regular.otf"));
        }
    } else if cfg!(unix) {
        let linux_candidates = [
            "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/opentype/noto/NotoSansSC-Regular.otf",
            "/usr/share/fonts/truetype/noto/NotoSansSC-Regular.ttf",
            "/usr/share/fonts/truetype/noto/NotoSansJP-Regular.ttf",
            "/usr/share/fonts/truetype/wqy/wqy-zenhei.ttc",
            "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
        ];
        for p in linux_candidates {
            candidates.push(std::path::PathBuf::from(p));
        }
        if let Ok(home) = std::env::var("HOME") {
            let home = std::path::PathBuf::from(home);
            candidates.push(home.join(".local/share/fonts/NotoSansCJK-Regular.ttc"));
            candidates.push(home.join(".local/share/fonts/NotoSansSC-Regular.ttf"));
            candidates.push(home.join(".fonts/NotoSansCJK-Regular.ttc"));
        }
    }

    // 2) 再尝试 assets（用户可自行放置字体，便于打包/跨机器）
    let asset_files = [
        "NotoSansCJK-Regular.ttc",
        "NotoSansSC-Regular.otf",
        "NotoSansSC-Regular.ttf",
        "NotoSans-Regular.ttf",
    ];
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            for f in asset_files {
                candidates.push(dir.join("assets").join(f));
            }
        }
    }
    for f in asset_files {
        candidates.push(std::path::PathBuf::from("assets").join(f));
    }

    let mut chosen: Option<(std::path::PathBuf, Vec<u8>)> = None;
    for p in candidates {
        if let Some(bytes) = try_load_font_from_path(&p) {
            chosen = Some((p, bytes));
            break;
        }
    }

    let Some((font_path, font_bytes)) = chosen else {
        log::warn!("{}", crate::i18n::tr("font.not_found"));
        return;
    };

    log::info!(
        "{}",
        crate::i18n::tr_with("font.using", &[("path", font_path.display().to_string())])
    );

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("ui".to_owned(), egui::FontData::from_owned(font_bytes));
    if let Some(family) = fonts.families.get_mut(&egui::FontFamily::Proportional) {
        family.insert(0, "ui".to_owned());
    }
    if let Some(family) = fonts.families.get_mut(&egui::FontFamily::Monospace) {
        family.insert(0, "ui".to_owned());
    }
    ctx.set_fonts(fonts);
}

pub struct Renderer {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pixels_per_point: f32,

    // UI
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub async fn new(window: std::sync::Arc<Window>) -> Self {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = unsafe { instance.create_surface(window.as_ref()) }.unwrap();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    label: None,
                },
                None,
            )
            .await
            .unwrap();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo, // VSync on
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let egui_ctx = egui::Context::default();
        setup_egui_ui_fonts(&egui_ctx);

        // 几何统一按逻辑像素书写；背板分辨率跟随缩放因子但最多 2x，
        // 超高 DPI 显示器上限制填充率
        let pixels_per_point = (window.scale_factor() as f32).min(2.0);
        let mut egui_state = egui_winit::State::new(window.as_ref());
        egui_state.set_pixels_per_point(pixels_per_point);

        let egui_renderer = egui_wgpu::Renderer::new(&device, config.format, None, 1);

        Self {
            surface,
            device,
            queue,
            config,
            size,
            pixels_per_point,
            egui_ctx,
            egui_state,
            egui_renderer,
        }
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn render_with_ui(
        &mut self,
        window: &Window,
        run_ui: impl FnOnce(&egui::Context),
    ) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // 1. 清屏（深色底，相当于画布的 clear）
        {
            let _clear_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.012,
                            g: 0.020,
                            b: 0.045,
                            a: 1.0,
                        }),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });
        }

        // 2. UI + 示意图（全部是 egui 形状）
        let raw_input = self.egui_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, run_ui);

        self.egui_state
            .handle_platform_output(window, &self.egui_ctx, full_output.platform_output);
        let clipped_primitives = self.egui_ctx.tessellate(full_output.shapes);

        let screen_descriptor = egui_wgpu::renderer::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: self.pixels_per_point,
        };

        for (id, delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, delta);
        }

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });
            self.egui_renderer
                .render(&mut render_pass, &clipped_primitives, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
