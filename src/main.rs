// main.rs — 完整的 Rust 实现，包含菜单、状态栏和交互式视场示意图

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // 在 Release 模式下隐藏控制台窗口

mod canvas;
mod fov;
mod i18n;
mod renderer;
mod scene;

use canvas::PainterCanvas;
use fov::{FovViewer, Mode};
use renderer::Renderer;
use scene::ASPECT_PRESETS;

use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, WindowBuilder},
};

use std::sync::Arc;
use std::time::Instant;

fn main() {
    env_logger::init();

    // i18n
    let mut current_lang = crate::i18n::resolve_lang_from_args();
    crate::i18n::init(current_lang.clone());

    let event_loop = EventLoop::new();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&crate::i18n::tr("app.title"))
            .with_inner_size(LogicalSize::new(1280, 800))
            .build(&event_loop)
            .unwrap(),
    );

    let mut renderer = pollster::block_on(Renderer::new(window.clone()));
    let mut viewer = FovViewer::new();

    // FPS 计算
    let mut last_frame_time = Instant::now();
    let mut frame_count = 0;
    let mut fps = 0.0;
    let mut show_fps = false;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match event {
            Event::WindowEvent { event, .. } => {
                // 先让 egui 处理事件
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                    }

                    // 键盘快捷键
                    WindowEvent::KeyboardInput { input, .. } => {
                        if input.state == ElementState::Pressed {
                            match input.virtual_keycode {
                                Some(VirtualKeyCode::F11) => {
                                    viewer.is_fullscreen = !viewer.is_fullscreen;
                                    if viewer.is_fullscreen {
                                        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
                                    } else {
                                        window.set_fullscreen(None);
                                    }
                                }
                                Some(VirtualKeyCode::G) => {
                                    viewer.options.show_grid = !viewer.options.show_grid;
                                }
                                Some(VirtualKeyCode::R) => {
                                    viewer.options.show_room = !viewer.options.show_room;
                                }
                                Some(VirtualKeyCode::X) => {
                                    viewer.options.show_diagonals = !viewer.options.show_diagonals;
                                }
                                Some(VirtualKeyCode::M) => {
                                    viewer.options.dim_outside = !viewer.options.dim_outside;
                                }
                                _ => {}
                            }
                        }
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                // FPS 统计
                frame_count += 1;
                let now = Instant::now();
                if now.duration_since(last_frame_time).as_secs_f32() >= 1.0 {
                    fps = frame_count as f32 / now.duration_since(last_frame_time).as_secs_f32();
                    frame_count = 0;
                    last_frame_time = now;
                }

                let render_result = renderer.render_with_ui(&window, |ctx| {
                    draw_ui(
                        ctx,
                        &mut viewer,
                        &mut show_fps,
                        fps,
                        &window,
                        &mut current_lang,
                    );
                });

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    Err(e) => log::error!("render error: {:?}", e),
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            _ => {}
        }
    });
}

fn draw_ui(
    ctx: &egui::Context,
    viewer: &mut FovViewer,
    show_fps: &mut bool,
    fps: f32,
    window: &winit::window::Window,
    current_lang: &mut String,
) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            // File
            ui.menu_button(&crate::i18n::tr("menu.file"), |ui| {
                if ui.button(&crate::i18n::tr("menu.exit")).clicked() {
                    std::process::exit(0);
                }
            });

            // View
            ui.menu_button(&crate::i18n::tr("menu.view"), |ui| {
                if ui.button(&crate::i18n::tr("view.reset")).clicked() {
                    viewer.reset_view();
                    ui.close_menu();
                }

                if ui
                    .button(if viewer.is_fullscreen {
                        crate::i18n::tr("view.fullscreen.exit")
                    } else {
                        crate::i18n::tr("view.fullscreen.enter")
                    })
                    .clicked()
                {
                    viewer.is_fullscreen = !viewer.is_fullscreen;
                    if viewer.is_fullscreen {
                        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
                    } else {
                        window.set_fullscreen(None);
                    }
                    ui.close_menu();
                }

                ui.separator();
                ui.checkbox(&mut viewer.options.show_grid, crate::i18n::tr("view.show_grid"));
                ui.checkbox(&mut viewer.options.show_room, crate::i18n::tr("view.show_room"));
                ui.checkbox(
                    &mut viewer.options.show_diagonals,
                    crate::i18n::tr("view.show_diagonals"),
                );
                ui.checkbox(&mut viewer.options.dim_outside, crate::i18n::tr("view.dim_outside"));

                ui.separator();
                if ui.checkbox(show_fps, crate::i18n::tr("view.show_fps")).clicked() {
                    ui.close_menu();
                }
            });

            // Language
            ui.menu_button(&crate::i18n::tr("menu.language"), |ui| {
                for (code, name) in crate::i18n::LANGS {
                    if ui.radio_value(current_lang, code.to_string(), *name).clicked() {
                        crate::i18n::init(current_lang.clone());
                        window.set_title(&crate::i18n::tr("app.title"));
                        ui.close_menu();
                    }
                }
            });
        });
    });

    egui::SidePanel::left("controls")
        .resizable(false)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading(&crate::i18n::tr("panel.heading"));
            ui.separator();

            // 求解模式：两个自由输入 + 一个推导值
            ui.label(&crate::i18n::tr("panel.mode"));
            egui::ComboBox::from_id_source("mode")
                .selected_text(mode_label(viewer.mode))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut viewer.mode, Mode::Hv, crate::i18n::tr("mode.hv"));
                    ui.selectable_value(&mut viewer.mode, Mode::Hd, crate::i18n::tr("mode.hd"));
                    ui.selectable_value(&mut viewer.mode, Mode::Vd, crate::i18n::tr("mode.vd"));
                });
            ui.add_space(8.0);

            // 被推导的滑杆禁用，只显示结果
            ui.label(&crate::i18n::tr("panel.h"));
            ui.add_enabled(
                viewer.mode != Mode::Vd,
                egui::Slider::new(&mut viewer.state.h, 1.0..=200.0)
                    .suffix("°")
                    .fixed_decimals(1),
            );
            ui.label(&crate::i18n::tr("panel.v"));
            ui.add_enabled(
                viewer.mode != Mode::Hd,
                egui::Slider::new(&mut viewer.state.v, 1.0..=200.0)
                    .suffix("°")
                    .fixed_decimals(1),
            );
            ui.label(&crate::i18n::tr("panel.d"));
            ui.add_enabled(
                viewer.mode != Mode::Hv,
                egui::Slider::new(&mut viewer.state.d, 1.0..=260.0)
                    .suffix("°")
                    .fixed_decimals(1),
            );

            ui.add_space(8.0);
            ui.label(&crate::i18n::tr("panel.scale"));
            ui.add(egui::Slider::new(&mut viewer.options.scale, 2.0..=60.0).fixed_decimals(0));
            ui.small(crate::i18n::tr_with(
                "panel.scale_hint",
                &[("scale", format!("{:.0}", viewer.options.scale))],
            ));

            ui.add_space(8.0);
            ui.label(&crate::i18n::tr("panel.aspect"));
            let preset_text = match viewer.aspect_preset {
                Some(i) => ASPECT_PRESETS[i].0.to_string(),
                None => crate::i18n::tr("aspect.custom"),
            };
            egui::ComboBox::from_id_source("aspect_preset")
                .selected_text(preset_text)
                .show_ui(ui, |ui| {
                    for (i, (name, _, _)) in ASPECT_PRESETS.iter().enumerate() {
                        ui.selectable_value(&mut viewer.aspect_preset, Some(i), *name);
                    }
                    ui.selectable_value(&mut viewer.aspect_preset, None, crate::i18n::tr("aspect.custom"));
                });
            if let Some(i) = viewer.aspect_preset {
                let (_, w, h) = ASPECT_PRESETS[i];
                viewer.aspect.width = w;
                viewer.aspect.height = h;
            }
            ui.horizontal(|ui| {
                let w = ui.add(
                    egui::DragValue::new(&mut viewer.aspect.width)
                        .speed(0.1)
                        .clamp_range(0.1..=100.0),
                );
                ui.label(":");
                let h = ui.add(
                    egui::DragValue::new(&mut viewer.aspect.height)
                        .speed(0.1)
                        .clamp_range(0.1..=100.0),
                );
                // 手动编辑即脱离预设
                if w.changed() || h.changed() {
                    viewer.aspect_preset = None;
                }
            });

            ui.add_space(8.0);
            ui.label(&crate::i18n::tr("panel.display"));
            ui.checkbox(&mut viewer.options.show_grid, crate::i18n::tr("view.show_grid"));
            ui.checkbox(&mut viewer.options.show_room, crate::i18n::tr("view.show_room"));
            ui.checkbox(
                &mut viewer.options.show_diagonals,
                crate::i18n::tr("view.show_diagonals"),
            );
            ui.checkbox(&mut viewer.options.dim_outside, crate::i18n::tr("view.dim_outside"));
        });

    // 输入处理完毕，按当前模式解析缺失的角度，再画状态栏和示意图
    viewer.state = fov::resolve(viewer.state, viewer.mode);

    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(format!(
                "{} {}",
                crate::i18n::tr("status.mode_prefix"),
                mode_label(viewer.mode)
            ));
            ui.label("|");
            ui.label(format!("H: {:.1}°", viewer.state.h));
            ui.label(format!("V: {:.1}°", viewer.state.v));
            ui.label(format!("D: {:.1}°", viewer.state.d));
            ui.label("|");
            ui.label(format!(
                "{} {:.1}mm",
                crate::i18n::tr("status.focal_prefix"),
                fov::equivalent_focal_mm(viewer.state.d)
            ));
            ui.label("|");
            ui.label(crate::i18n::tr_with(
                "panel.scale_hint",
                &[("scale", format!("{:.0}", viewer.options.scale))],
            ));

            if *show_fps {
                ui.label("|");
                ui.label(
                    egui::RichText::new(format!("FPS: {:.1}", fps)).color(egui::Color32::GREEN),
                );
            }
        });
    });

    egui::CentralPanel::default()
        .frame(egui::Frame::none())
        .show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::hover());

            // 滚轮缩放示意图比例
            if response.hovered() {
                let scroll = ui.input(|i| i.scroll_delta.y);
                if scroll != 0.0 {
                    viewer.options.scale =
                        (viewer.options.scale - scroll * 0.02).clamp(2.0, 60.0);
                }
            }

            let mut canvas = PainterCanvas::new(&painter, response.rect);
            scene::render(&mut canvas, &viewer.state, &viewer.options, &viewer.aspect);
        });
}

fn mode_label(mode: Mode) -> String {
    match mode {
        Mode::Hv => crate::i18n::tr("mode.hv"),
        Mode::Hd => crate::i18n::tr("mode.hd"),
        Mode::Vd => crate::i18n::tr("mode.vd"),
    }
}
