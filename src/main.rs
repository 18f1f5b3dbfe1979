//! Interactive physics sandbox.
//!
//! This module handles:
//! - Command-line argument parsing
//! - Window creation and event loop
//! - Translating mouse and keyboard input into sandbox commands
//! - A headless mode that runs a scripted promotion without a window
//!
//! # Event Handling
//! - Mouse drag: Camera rotation
//! - Mouse click: Pick an object (click on empty space clears the selection)
//! - Mouse wheel: Camera zoom
//! - 1/2/3/4: Assign a sphere/cube/cylinder/hull collider
//! - E: Enable physics, F: Apply the horizontal force, B: Toggle debug shapes
//! - G/H, R/T, U/I, J/K, N/M: Lower/raise gravity, bounce, friction, damping, force
//! - Q/Escape: Exit application

use anyhow::Context;
use clap::Parser;
use glam::Vec3;
use physics_sandbox::{
    collider::ShapeKind,
    gpu::GpuContext,
    params::{ParameterUpdate, SimulationParameters},
    sandbox::{Sandbox, SandboxConfig},
    scene::Ray,
    selection::Command,
    Renderer,
};
use std::{sync::Arc, time::Instant};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowBuilder},
};

#[derive(Parser, Debug)]
#[command(name = "sandbox")]
#[command(about = "Promote scene objects into a live rigid-body simulation")]
struct Args {
    /// Vertical gravity (m/s²)
    #[arg(long, default_value_t = -9.81, allow_hyphen_values = true)]
    gravity: f32,

    /// Collider restitution (bounce)
    #[arg(long, default_value_t = 0.5)]
    restitution: f32,

    #[arg(long, default_value_t = 0.5)]
    friction: f32,

    /// Linear and angular damping
    #[arg(long, default_value_t = 0.0)]
    damping: f32,

    /// Magnitude of the horizontal impulse sent by F
    #[arg(long, default_value_t = 5.0, allow_hyphen_values = true)]
    impulse: f32,

    /// Physics steps per simulated second
    #[arg(long, default_value_t = 60.0)]
    step_rate: f64,

    /// Longest frame delta fed to the simulation, in seconds
    #[arg(long, default_value_t = 0.1)]
    max_frame_delta: f64,

    /// Drop physics steps beyond this many per frame
    #[arg(long)]
    max_steps_per_frame: Option<u32>,

    /// Start with collider debug shapes visible
    #[arg(long)]
    debug: bool,

    #[arg(long, default_value_t = DEFAULT_WINDOW_WIDTH)]
    width: u32,

    #[arg(long, default_value_t = DEFAULT_WINDOW_HEIGHT)]
    height: u32,

    /// Run the scripted box promotion without opening a window
    #[arg(long)]
    headless: bool,

    /// Simulated seconds for headless mode (default: 5)
    #[arg(long, default_value = "5")]
    duration: f32,
}

const MOUSE_SENSITIVITY: f32 = 0.01;
const CLICK_TOLERANCE: f64 = 4.0;
const DEFAULT_WINDOW_WIDTH: u32 = 800;
const DEFAULT_WINDOW_HEIGHT: u32 = 600;
const HEADLESS_FRAME_DELTA: f64 = 1.0 / 60.0;

const GRAVITY_STEP: f32 = 1.0;
const MATERIAL_STEP: f32 = 0.1;
const DAMPING_STEP: f32 = 0.1;
const IMPULSE_STEP: f32 = 1.0;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = sandbox_config(&args);

    if args.headless {
        return run_headless(config, args.duration);
    }

    let event_loop = EventLoop::new()?;
    let window = Arc::new(create_window(&event_loop, args.width, args.height)?);
    let gpu_context = pollster::block_on(GpuContext::new(window.clone()))?;
    let size = window.inner_size();
    let mut renderer = Renderer::new(&gpu_context, size.width, size.height);

    let mut app_state = ApplicationState {
        sandbox: Sandbox::new(config)?,
        last_update: Instant::now(),
        mouse_pressed: false,
        press_position: PhysicalPosition::new(0.0, 0.0),
        last_mouse_pos: PhysicalPosition::new(0.0, 0.0),
        fatal: None,
    };

    event_loop.run(|event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::AboutToWait => {
                handle_frame_update(&mut app_state, &mut renderer, &gpu_context, &window, elwt);
            }
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(physical_size) => {
                    renderer.resize(&gpu_context, physical_size);
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    handle_mouse_input(&mut app_state, &renderer, state, button);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    handle_cursor_moved(&mut app_state, &mut renderer, position);
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    handle_mouse_wheel(&mut renderer, delta);
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            physical_key: PhysicalKey::Code(code),
                            state: ElementState::Pressed,
                            repeat: false,
                            ..
                        },
                    ..
                } => handle_key(&mut app_state, code, elwt),
                WindowEvent::RedrawRequested => {
                    handle_redraw(&mut renderer, &gpu_context, &window, elwt);
                }
                _ => {}
            },
            _ => {}
        }
    })?;

    match app_state.fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct ApplicationState {
    sandbox: Sandbox,
    last_update: Instant,
    mouse_pressed: bool,
    press_position: PhysicalPosition<f64>,
    last_mouse_pos: PhysicalPosition<f64>,
    fatal: Option<anyhow::Error>,
}

fn sandbox_config(args: &Args) -> SandboxConfig {
    SandboxConfig {
        params: SimulationParameters {
            gravity: args.gravity,
            restitution: args.restitution,
            friction: args.friction,
            damping: args.damping,
            impulse: args.impulse,
        },
        fixed_step: 1.0 / args.step_rate,
        max_frame_delta: args.max_frame_delta,
        max_steps_per_frame: args.max_steps_per_frame,
        debug: args.debug,
        ..SandboxConfig::default()
    }
}

/// Picks the box, fits a cube collider, promotes it and pushes it sideways,
/// then lets it settle.
fn run_headless(config: SandboxConfig, duration: f32) -> anyhow::Result<()> {
    let mut sandbox = Sandbox::new(config)?;
    let target = sandbox
        .scene()
        .find("Box")
        .context("demo scene has no box")?;
    let center = sandbox.scene().world_position(target)?;

    sandbox.push(Command::Pick(Some(Ray::new(center + Vec3::Z * 10.0, -Vec3::Z))));
    sandbox.push(Command::AssignCollider(ShapeKind::Cube));
    sandbox.push(Command::EnablePhysics);
    sandbox.push(Command::ApplyForce);

    let frames = (duration as f64 / HEADLESS_FRAME_DELTA).ceil() as usize;
    for frame in 0..frames {
        let report = sandbox.frame(HEADLESS_FRAME_DELTA)?;
        for err in &report.rejected {
            println!("rejected: {}", err);
        }
        if frame % 60 == 0 {
            print_pose(&sandbox, frame as f64 * HEADLESS_FRAME_DELTA)?;
        }
    }
    print_pose(&sandbox, frames as f64 * HEADLESS_FRAME_DELTA)
}

fn print_pose(sandbox: &Sandbox, time: f64) -> anyhow::Result<()> {
    let focus = sandbox
        .selection()
        .focus()
        .context("nothing is selected")?;
    let node = sandbox.scene().node(focus)?;
    let p = node.transform.translation;
    println!(
        "t={:5.2}s {:>10} position=({:6.3}, {:6.3}, {:6.3}) bodies={}",
        time,
        node.name,
        p.x,
        p.y,
        p.z,
        sandbox.registry().len()
    );
    Ok(())
}

fn create_window(
    event_loop: &EventLoop<()>,
    width: u32,
    height: u32,
) -> anyhow::Result<Window> {
    let window = WindowBuilder::new()
        .with_title("Physics Sandbox")
        .with_inner_size(winit::dpi::PhysicalSize::new(width, height))
        .build(event_loop)?;
    Ok(window)
}

fn handle_frame_update(
    state: &mut ApplicationState,
    renderer: &mut Renderer,
    gpu_context: &GpuContext,
    window: &Window,
    elwt: &EventLoopWindowTarget<()>,
) {
    let now = Instant::now();
    let frame_delta = now.duration_since(state.last_update).as_secs_f64();
    state.last_update = now;

    match state.sandbox.frame(frame_delta) {
        Ok(report) => {
            for err in &report.rejected {
                println!("{}", err);
            }
        }
        Err(err) => {
            log::error!("simulation stopped: {}", err);
            state.fatal = Some(err.into());
            elwt.exit();
            return;
        }
    }

    renderer.update(gpu_context, &state.sandbox);
    window.request_redraw();
}

fn handle_mouse_input(
    state: &mut ApplicationState,
    renderer: &Renderer,
    element_state: ElementState,
    button: MouseButton,
) {
    if button != MouseButton::Left {
        return;
    }
    match element_state {
        ElementState::Pressed => {
            state.mouse_pressed = true;
            state.press_position = state.last_mouse_pos;
        }
        ElementState::Released => {
            state.mouse_pressed = false;
            let dx = state.last_mouse_pos.x - state.press_position.x;
            let dy = state.last_mouse_pos.y - state.press_position.y;
            if dx.hypot(dy) <= CLICK_TOLERANCE {
                let ray = pointer_ray(renderer, state.last_mouse_pos);
                state.sandbox.push(Command::Pick(ray));
            }
        }
    }
}

fn pointer_ray(renderer: &Renderer, position: PhysicalPosition<f64>) -> Option<Ray> {
    let (width, height) = renderer.size();
    if width == 0 || height == 0 {
        return None;
    }
    let ndc_x = (position.x / width as f64) * 2.0 - 1.0;
    let ndc_y = -(position.y / height as f64) * 2.0 + 1.0;
    Some(renderer.camera().ray_through(ndc_x as f32, ndc_y as f32))
}

fn handle_cursor_moved(
    state: &mut ApplicationState,
    renderer: &mut Renderer,
    position: PhysicalPosition<f64>,
) {
    if state.mouse_pressed {
        let delta_x = (position.x - state.last_mouse_pos.x) as f32 * MOUSE_SENSITIVITY;
        let delta_y = (position.y - state.last_mouse_pos.y) as f32 * MOUSE_SENSITIVITY;
        renderer.camera_mut().rotate(delta_x, -delta_y);
    }
    state.last_mouse_pos = position;
}

fn handle_mouse_wheel(renderer: &mut Renderer, delta: MouseScrollDelta) {
    let scroll_amount = match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
    };
    renderer.camera_mut().zoom(scroll_amount);
}

fn handle_key(state: &mut ApplicationState, code: KeyCode, elwt: &EventLoopWindowTarget<()>) {
    let params = *state.sandbox.params();
    let command = match code {
        KeyCode::KeyQ | KeyCode::Escape => {
            elwt.exit();
            return;
        }
        KeyCode::Digit1 => Command::AssignCollider(ShapeKind::Sphere),
        KeyCode::Digit2 => Command::AssignCollider(ShapeKind::Cube),
        KeyCode::Digit3 => Command::AssignCollider(ShapeKind::Cylinder),
        KeyCode::Digit4 => Command::AssignCollider(ShapeKind::Hull),
        KeyCode::KeyE => Command::EnablePhysics,
        KeyCode::KeyF => Command::ApplyForce,
        KeyCode::KeyB => Command::ToggleDebug,
        KeyCode::KeyG => {
            Command::SetParameter(ParameterUpdate::Gravity(params.gravity - GRAVITY_STEP))
        }
        KeyCode::KeyH => {
            Command::SetParameter(ParameterUpdate::Gravity(params.gravity + GRAVITY_STEP))
        }
        KeyCode::KeyR => Command::SetParameter(ParameterUpdate::Restitution(
            params.restitution - MATERIAL_STEP,
        )),
        KeyCode::KeyT => Command::SetParameter(ParameterUpdate::Restitution(
            params.restitution + MATERIAL_STEP,
        )),
        KeyCode::KeyU => {
            Command::SetParameter(ParameterUpdate::Friction(params.friction - MATERIAL_STEP))
        }
        KeyCode::KeyI => {
            Command::SetParameter(ParameterUpdate::Friction(params.friction + MATERIAL_STEP))
        }
        KeyCode::KeyJ => {
            Command::SetParameter(ParameterUpdate::Damping(params.damping - DAMPING_STEP))
        }
        KeyCode::KeyK => {
            Command::SetParameter(ParameterUpdate::Damping(params.damping + DAMPING_STEP))
        }
        KeyCode::KeyN => {
            Command::SetParameter(ParameterUpdate::Impulse(params.impulse - IMPULSE_STEP))
        }
        KeyCode::KeyM => {
            Command::SetParameter(ParameterUpdate::Impulse(params.impulse + IMPULSE_STEP))
        }
        _ => return,
    };
    state.sandbox.push(command);
}

fn handle_redraw(
    renderer: &mut Renderer,
    gpu_context: &GpuContext,
    window: &Window,
    elwt: &EventLoopWindowTarget<()>,
) {
    match renderer.render(gpu_context) {
        Ok(_) => {}
        Err(wgpu::SurfaceError::Lost) => renderer.resize(gpu_context, window.inner_size()),
        Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
        Err(e) => eprintln!("Render error: {:?}", e),
    }
}
