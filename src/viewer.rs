//! Native 3D viewer using three-d
//!
//! Draws every node as a sphere and every cone as a translucent cone from the
//! parent down to its children's ring. Labels are painted on top through the
//! egui overlay so they stay readable from any angle.

use std::path::PathBuf;
use three_d::*;
use tracing::{debug, info, warn};

use crate::config::{Orientation, ViewerConfig};
use crate::propagate::Frame;
use crate::scene::{Command, Flow, Scene};
use crate::tree::{Point3, Tree};

const ORBIT_SPEED: f32 = 0.1;
const PAN_SPEED: f32 = 0.02;
const ZOOM_SPEED: f32 = 0.1;
const MIN_DISTANCE: f32 = 2.0;
const MAX_DISTANCE: f32 = 500.0;

/// Viewer-only actions that never touch the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewAction {
    ResetView,
    Screenshot,
}

/// Run the viewer until the user quits
pub fn run_viewer(mut scene: Scene, settings: ViewerConfig, screenshot_dir: PathBuf) -> anyhow::Result<()> {
    let window = Window::new(WindowSettings {
        title: "ConeTree Viewer".to_string(),
        min_size: (settings.width, settings.height),
        ..Default::default()
    })?;
    let context = window.gl();

    let mut camera = Camera::new_perspective(
        window.viewport(),
        vec3(0.0, 10.0, 40.0),
        vec3(0.0, 0.0, 0.0),
        vec3(0.0, 1.0, 0.0),
        degrees(45.0),
        0.1,
        1000.0,
    );
    let target = fit_camera(&scene.tree, &mut camera);
    let mut control = camera_control(target);
    let mut gui = GUI::new(&context);

    let sphere = CpuMesh::sphere(settings.sphere_subdivisions);
    let cone = CpuMesh::cone(settings.cone_segments);
    let mut tick_accumulator = 0.0f64;

    info!("Viewer started");

    window.render_loop(move |mut frame_input| {
        // Fixed-period animation ticks, capped so a stalled frame does not spin wildly
        tick_accumulator += frame_input.elapsed_time;
        let tick_ms = scene.animation.tick_ms() as f64;
        let mut ticks = 0;
        while tick_accumulator >= tick_ms && ticks < 10 {
            scene.tick();
            tick_accumulator -= tick_ms;
            ticks += 1;
        }
        if ticks == 10 {
            tick_accumulator = 0.0;
        }

        let scene_matrix = scene_rotation(&scene);
        let dpr = frame_input.device_pixel_ratio as f32;
        let window_height = frame_input.viewport.height as f32;

        let mut commands: Vec<Command> = Vec::new();
        let mut actions: Vec<ViewAction> = Vec::new();

        let (spheres, cones) = {
            scene.update_world();
            let frame = scene.capture();

            let spheres = sphere_instances(&frame, &settings, scene_matrix);
            let cones = cone_instances(&frame, &settings, scene_matrix);

            gui.update(
                &mut frame_input.events,
                frame_input.accumulated_time,
                frame_input.viewport,
                frame_input.device_pixel_ratio,
                |gui_context| {
                    let panel_width = egui::SidePanel::left("controls")
                        .resizable(false)
                        .show(gui_context, |ui| {
                            control_panel(ui, &scene, &mut commands, &mut actions);
                        })
                        .response
                        .rect
                        .width();

                    let offset = (panel_width * dpr) as u32;
                    camera.set_viewport(Viewport {
                        x: offset as i32,
                        y: 0,
                        width: frame_input.viewport.width.saturating_sub(offset),
                        height: frame_input.viewport.height,
                    });

                    paint_labels(gui_context, &camera, &frame, &settings, scene_matrix, dpr, window_height);
                },
            );

            (spheres, cones)
        };

        control.handle_events(&mut camera, &mut frame_input.events);
        collect_key_commands(&frame_input.events, &mut commands, &mut actions);

        for command in commands {
            let orientation_before = scene.layout.orientation;
            match scene.apply(command) {
                Ok(Flow::Continue) => {
                    if scene.layout.orientation != orientation_before {
                        actions.push(ViewAction::ResetView);
                    }
                }
                Ok(Flow::Quit) => {
                    return FrameOutput {
                        exit: true,
                        ..Default::default()
                    };
                }
                Err(e) => warn!("Command {:?} failed: {}", command, e),
            }
        }

        let mut screenshot = false;
        for action in actions {
            match action {
                ViewAction::ResetView => {
                    let target = fit_camera(&scene.tree, &mut camera);
                    control = camera_control(target);
                }
                ViewAction::Screenshot => screenshot = true,
            }
        }

        let node_color = srgba(settings.node_color);
        let sphere_model = Gm::new(
            InstancedMesh::new(&context, &spheres, &sphere),
            ColorMaterial {
                color: node_color,
                ..Default::default()
            },
        );
        let cone_model = Gm::new(
            InstancedMesh::new(&context, &cones, &cone),
            ColorMaterial {
                is_transparent: true,
                render_states: RenderStates {
                    write_mask: WriteMask::COLOR,
                    blend: Blend::TRANSPARENCY,
                    cull: Cull::None,
                    ..Default::default()
                },
                ..Default::default()
            },
        );

        let [r, g, b] = settings.background;
        frame_input
            .screen()
            .clear(ClearState::color_and_depth(r, g, b, 1.0, 1.0));

        sphere_model.render(&camera, &[]);
        if !cones.transformations.is_empty() {
            cone_model.render(&camera, &[]);
        }

        if let Err(e) = frame_input.screen().write(|| gui.render()) {
            warn!("GUI render failed: {}", e);
        }

        if screenshot {
            save_screenshot(&frame_input, &screenshot_dir);
        }

        FrameOutput::default()
    });

    info!("Viewer closed");
    Ok(())
}

/// Whole-scene rotation driven by the all-cones animation
fn scene_rotation(scene: &Scene) -> Mat4 {
    Mat4::from_angle_x(degrees(scene.animation.scene_pitch))
        * Mat4::from_angle_y(degrees(scene.animation.scene_yaw))
}

fn to_vec3(p: Point3) -> Vec3 {
    vec3(p.x, p.y, p.z)
}

fn srgba(c: [u8; 4]) -> Srgba {
    Srgba::new(c[0], c[1], c[2], c[3])
}

fn sphere_instances(frame: &Frame<'_>, settings: &ViewerConfig, scene_matrix: Mat4) -> Instances {
    let mut instances = Instances::default();
    instances.transformations = frame
        .nodes
        .iter()
        .map(|n| scene_matrix * Mat4::from_translation(to_vec3(n.position)) * Mat4::from_scale(settings.node_radius))
        .collect();
    instances
}

/// The cone mesh spans x in [0, 1] with its unit-radius base at x = 0 and tip at x = 1
fn cone_instances(frame: &Frame<'_>, settings: &ViewerConfig, scene_matrix: Mat4) -> Instances {
    let axis = match frame.orientation {
        // +X onto +Y: tip above the ring
        Orientation::Vertical => Mat4::from_angle_z(degrees(90.0)),
        // +X onto -X: tip left of the ring
        Orientation::Horizontal => Mat4::from_angle_y(degrees(180.0)),
    };

    let mut instances = Instances::default();
    instances.transformations = Vec::with_capacity(frame.cones.len());
    instances.colors = Some(Vec::with_capacity(frame.cones.len()));

    for cone in &frame.cones {
        let transform = scene_matrix
            * Mat4::from_translation(to_vec3(cone.base_center))
            * axis
            * Mat4::from_angle_x(degrees(cone.spin))
            * Mat4::from_nonuniform_scale(cone.height, cone.radius, cone.radius);
        instances.transformations.push(transform);

        let color = if cone.selected {
            settings.selected_cone_color
        } else {
            settings.cone_color
        };
        if let Some(ref mut colors) = instances.colors {
            colors.push(srgba(color));
        }
    }
    instances
}

/// Labels sit just to the right of their sphere, always on top
fn paint_labels(
    ctx: &egui::Context,
    camera: &Camera,
    frame: &Frame<'_>,
    settings: &ViewerConfig,
    scene_matrix: Mat4,
    dpr: f32,
    window_height: f32,
) {
    let painter = ctx.layer_painter(egui::LayerId::background());
    let [r, g, b, a] = settings.label_color;
    let color = egui::Color32::from_rgba_unmultiplied(r, g, b, a);
    let font = egui::FontId::proportional(settings.label_size);

    for node in &frame.nodes {
        if node.text.is_empty() {
            continue;
        }
        let world = (scene_matrix * to_vec3(node.position).extend(1.0)).truncate();
        if let Some(pos) = project(camera, world, dpr, window_height) {
            painter.text(
                egui::pos2(pos.x + settings.label_size, pos.y),
                egui::Align2::LEFT_CENTER,
                node.text,
                font.clone(),
                color,
            );
        }
    }
}

/// World point to egui screen coordinates (logical pixels, origin top-left)
fn project(camera: &Camera, p: Vec3, dpr: f32, window_height: f32) -> Option<egui::Pos2> {
    let clip = camera.projection() * camera.view() * p.extend(1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 {
        return None;
    }

    let vp = camera.viewport();
    let x = vp.x as f32 + (ndc.x + 1.0) * 0.5 * vp.width as f32;
    let y = vp.y as f32 + (ndc.y + 1.0) * 0.5 * vp.height as f32;
    Some(egui::pos2(x / dpr, (window_height - y) / dpr))
}

fn control_panel(ui: &mut egui::Ui, scene: &Scene, commands: &mut Vec<Command>, actions: &mut Vec<ViewAction>) {
    ui.heading("ConeTree");
    ui.label(format!("{} nodes | {} cones", scene.tree.len(), scene.cone_count()));
    ui.separator();

    ui.label("Orientation");
    ui.horizontal(|ui| {
        let vertical = scene.layout.orientation == Orientation::Vertical;
        if ui.selectable_label(vertical, "Vertical (V)").clicked() {
            commands.push(Command::SetOrientation(Orientation::Vertical));
        }
        if ui.selectable_label(!vertical, "Horizontal (H)").clicked() {
            commands.push(Command::SetOrientation(Orientation::Horizontal));
        }
    });
    if ui
        .button(format!("Allocation: {:?} (P)", scene.layout.allocation))
        .clicked()
    {
        commands.push(Command::ToggleProportional);
    }

    ui.separator();
    let selection = match scene.selection {
        crate::animation::Selection::All => "all cones".to_string(),
        crate::animation::Selection::Single(i) => format!("cone {} of {}", i + 1, scene.cone_count()),
    };
    ui.label(format!("Selected: {}", selection));
    if ui.button("Next cone (C)").clicked() {
        commands.push(Command::CycleSelection);
    }

    ui.separator();
    let animate = if scene.animation.enabled { "Stop (A)" } else { "Animate (A)" };
    if ui.button(animate).clicked() {
        commands.push(Command::ToggleAnimation);
    }
    ui.horizontal(|ui| {
        if ui.button("Slower").clicked() {
            commands.push(Command::Slower);
        }
        ui.label(format!("{:.2}x", scene.animation.speed));
        if ui.button("Faster").clicked() {
            commands.push(Command::Faster);
        }
    });

    ui.separator();
    if ui.button("Reset view (R)").clicked() {
        actions.push(ViewAction::ResetView);
    }
    if ui.button("Screenshot (S)").clicked() {
        actions.push(ViewAction::Screenshot);
    }
    if ui.button("Quit (Esc)").clicked() {
        commands.push(Command::Quit);
    }

    ui.separator();
    ui.small("Drag: orbit | Right-drag: pan | Scroll: zoom\nPageDown/PageUp: speed");
}

fn collect_key_commands(events: &[Event], commands: &mut Vec<Command>, actions: &mut Vec<ViewAction>) {
    for event in events {
        let Event::KeyPress { kind, handled, .. } = event else {
            continue;
        };
        if *handled {
            continue;
        }
        match kind {
            Key::V => commands.push(Command::SetOrientation(Orientation::Vertical)),
            Key::H => commands.push(Command::SetOrientation(Orientation::Horizontal)),
            Key::P => commands.push(Command::ToggleProportional),
            Key::C => commands.push(Command::CycleSelection),
            Key::A => commands.push(Command::ToggleAnimation),
            Key::PageDown => commands.push(Command::Slower),
            Key::PageUp => commands.push(Command::Faster),
            Key::Escape | Key::Q => commands.push(Command::Quit),
            Key::R => actions.push(ViewAction::ResetView),
            Key::S => actions.push(ViewAction::Screenshot),
            _ => {}
        }
    }
}

/// Left-drag orbits `target`, right-drag pans, scroll zooms
fn camera_control(target: Vec3) -> CameraControl {
    CameraControl {
        left_drag_horizontal: CameraAction::OrbitLeft { target, speed: ORBIT_SPEED },
        left_drag_vertical: CameraAction::OrbitUp { target, speed: ORBIT_SPEED },
        right_drag_horizontal: CameraAction::Left { speed: PAN_SPEED },
        right_drag_vertical: CameraAction::Up { speed: PAN_SPEED },
        scroll_vertical: CameraAction::Zoom {
            target,
            speed: ZOOM_SPEED,
            min: MIN_DISTANCE,
            max: MAX_DISTANCE,
        },
        ..Default::default()
    }
}

/// Point the camera at the tree's bounding box; returns the new orbit target
fn fit_camera(tree: &Tree, camera: &mut Camera) -> Vec3 {
    let Some((min, max)) = tree.base_bounds() else {
        return vec3(0.0, 0.0, 0.0);
    };

    let center = (to_vec3(min) + to_vec3(max)) * 0.5;
    let diag = max.distance(&min).max(5.0);

    let distance = diag * 1.5;
    let offset = vec3(0.0, 0.3, 1.0).normalize() * distance;
    camera.set_view(center + offset, center, vec3(0.0, 1.0, 0.0));
    debug!("Camera fitted: center={:?} distance={:.1}", center, distance);
    center
}

fn save_screenshot(frame_input: &FrameInput, dir: &std::path::Path) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!("Failed to create {}: {}", dir.display(), e);
        return;
    }

    let vp = frame_input.viewport;
    let pixels: Vec<[u8; 4]> = frame_input.screen().read_color();
    let flat: Vec<u8> = pixels.iter().flat_map(|p| p.iter().copied()).collect();

    let Some(img) = image::RgbaImage::from_raw(vp.width, vp.height, flat) else {
        warn!("Screenshot buffer did not match {}x{}", vp.width, vp.height);
        return;
    };

    let name = format!("conetree-{}.png", chrono::Local::now().format("%Y%m%d-%H%M%S"));
    let path = dir.join(name);
    match img.save(&path) {
        Ok(()) => info!("Saved {}", path.display()),
        Err(e) => warn!("Failed to save {}: {}", path.display(), e),
    }
}
