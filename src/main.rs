//! Entry point for the galaxy generator.
//!
//! Opens a window showing the generated galaxy and updates it as
//! parameters change. With `--save-frame` it renders one frame offscreen
//! and writes a PNG instead.
//!
//! # Controls
//! - Up/Down: select a parameter
//! - Left/Right: adjust it (hold Shift for 10x steps); releasing the key regenerates
//! - R: regenerate with fresh random draws
//! - Mouse drag: orbit, mouse wheel: zoom
//! - Q/Escape: exit

use anyhow::{Context, Result};
use clap::Parser;
use galaxy_generator::{
    app::AppState,
    config::GalaxyConfig,
    galaxy::GalaxyGenerator,
    gpu::GpuContext,
    load_config,
    panel::ParameterPanel,
    scene::PointScene,
    viewport::Viewport,
    Renderer,
};
use std::{path::{Path, PathBuf}, sync::Arc, time::Instant};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowBuilder},
};

#[derive(Parser, Debug)]
#[command(name = "galaxy")]
#[command(about = "Procedural spiral galaxy point-field generator")]
struct Args {
    /// TOML file with galaxy parameters, seed and window size
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for reproducible galaxies
    #[arg(long)]
    seed: Option<u64>,

    /// Number of particles (100 - 100000)
    #[arg(long)]
    count: Option<u32>,

    /// Window or frame width in logical pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window or frame height in logical pixels
    #[arg(long)]
    height: Option<u32>,

    /// Render a single frame to this PNG file without opening a window
    #[arg(long)]
    save_frame: Option<PathBuf>,
}

const WINDOW_TITLE: &str = "Galaxy Generator";
const MOUSE_SENSITIVITY: f32 = 0.01;
const ZOOM_SENSITIVITY: f32 = 0.5;
const PIXEL_SCROLL_SCALE: f32 = 0.02;
const FAST_STEP_MULTIPLIER: i32 = 10;

struct ApplicationState {
    app: AppState,
    scene: PointScene,
    panel: ParameterPanel,
    started: Instant,
    mouse_pressed: bool,
    last_mouse_pos: PhysicalPosition<f64>,
    shift_held: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config(args.config.as_deref(), args.seed, args.count)?;
    let width = args.width.unwrap_or(config.window.width);
    let height = args.height.unwrap_or(config.window.height);

    if let Some(output_path) = &args.save_frame {
        return run_headless(config, output_path, width, height);
    }

    run_interactive(config, width, height)
}

fn run_headless(config: GalaxyConfig, output_path: &Path, width: u32, height: u32) -> Result<()> {
    log::info!("Running headless, saving frame to {}", output_path.display());

    let gpu_context = pollster::block_on(GpuContext::new())?;
    let mut renderer = Renderer::new_offscreen(&gpu_context, width, height)?;

    let mut scene = PointScene::new();
    let mut app = AppState::new(config.galaxy, GalaxyGenerator::new(config.seed));
    app.regenerate(&mut scene);
    app.tick(&mut scene, 0.0);

    renderer.update(&gpu_context, &scene);
    renderer.render(&gpu_context)?;

    let frame_data = renderer
        .capture_frame(&gpu_context)
        .context("Frame capture failed")?;
    image::save_buffer(output_path, &frame_data, width, height, image::ColorType::Rgba8)
        .with_context(|| format!("Writing {}", output_path.display()))?;

    println!("Frame saved to {}", output_path.display());
    Ok(())
}

fn run_interactive(config: GalaxyConfig, width: u32, height: u32) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(width, height))
            .build(&event_loop)?,
    );

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
    let surface = instance.create_surface(window.clone())?;
    let gpu_context = pollster::block_on(GpuContext::for_surface(instance, &surface))?;
    let viewport = Viewport::from_physical(window.inner_size(), window.scale_factor());
    let mut renderer = Renderer::new(&gpu_context, surface, viewport)?;

    let mut state = ApplicationState {
        app: AppState::new(config.galaxy, GalaxyGenerator::new(config.seed)),
        scene: PointScene::new(),
        panel: ParameterPanel::new(),
        started: Instant::now(),
        mouse_pressed: false,
        last_mouse_pos: PhysicalPosition::new(0.0, 0.0),
        shift_held: false,
    };
    state.app.regenerate(&mut state.scene);
    update_title(&state, &window);

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::AboutToWait => window.request_redraw(),
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(physical_size) => {
                    let viewport = Viewport::from_physical(physical_size, window.scale_factor());
                    renderer.resize(&gpu_context, viewport);
                }
                WindowEvent::ModifiersChanged(modifiers) => {
                    state.shift_held = modifiers.state().shift_key();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    handle_key(&mut state, &window, elwt, event);
                }
                WindowEvent::MouseInput { state: element_state, button, .. } => {
                    handle_mouse_input(&mut state, element_state, button);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    handle_cursor_moved(&mut state, &mut renderer, position);
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    handle_mouse_wheel(&mut renderer, delta);
                }
                WindowEvent::RedrawRequested => {
                    handle_redraw(&mut state, &mut renderer, &gpu_context, elwt);
                }
                _ => {}
            },
            _ => {}
        }
    })?;

    Ok(())
}

fn handle_key(
    state: &mut ApplicationState,
    window: &Window,
    elwt: &EventLoopWindowTarget<()>,
    event: KeyEvent,
) {
    let PhysicalKey::Code(code) = event.physical_key else {
        return;
    };

    match (event.state, code) {
        (ElementState::Pressed, KeyCode::KeyQ | KeyCode::Escape) => elwt.exit(),
        (ElementState::Pressed, KeyCode::ArrowUp) if !event.repeat => {
            state.panel.select_previous();
        }
        (ElementState::Pressed, KeyCode::ArrowDown) if !event.repeat => {
            state.panel.select_next();
        }
        (ElementState::Pressed, KeyCode::ArrowLeft) => adjust(state, -1),
        (ElementState::Pressed, KeyCode::ArrowRight) => adjust(state, 1),
        (ElementState::Released, KeyCode::ArrowLeft | KeyCode::ArrowRight) => {
            let ApplicationState { app, scene, panel, .. } = &mut *state;
            panel.finish_change(|| {
                app.regenerate(scene);
            });
        }
        (ElementState::Pressed, KeyCode::KeyR) if !event.repeat => {
            state.app.reseed(&mut state.scene);
        }
        _ => return,
    }

    update_title(state, window);
}

fn adjust(state: &mut ApplicationState, direction: i32) {
    let multiplier = if state.shift_held { FAST_STEP_MULTIPLIER } else { 1 };
    state.panel.adjust(&mut state.app.params, direction * multiplier);
}

fn update_title(state: &ApplicationState, window: &Window) {
    window.set_title(&format!("{} | {}", WINDOW_TITLE, state.panel.status(&state.app.params)));
}

fn handle_mouse_input(
    state: &mut ApplicationState,
    element_state: ElementState,
    button: MouseButton,
) {
    if button == MouseButton::Left {
        state.mouse_pressed = element_state == ElementState::Pressed;
    }
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
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * PIXEL_SCROLL_SCALE,
    };
    renderer.camera_mut().zoom(scroll_amount * ZOOM_SENSITIVITY);
}

fn handle_redraw(
    state: &mut ApplicationState,
    renderer: &mut Renderer,
    gpu_context: &GpuContext,
    elwt: &EventLoopWindowTarget<()>,
) {
    let elapsed = state.started.elapsed().as_secs_f32();
    state.app.tick(&mut state.scene, elapsed);
    renderer.camera_mut().update();
    renderer.update(gpu_context, &state.scene);

    match renderer.render(gpu_context) {
        Ok(_) => {}
        Err(wgpu::SurfaceError::Lost) => renderer.reconfigure(gpu_context),
        Err(wgpu::SurfaceError::OutOfMemory) => {
            log::error!("Surface out of memory, exiting");
            elwt.exit();
        }
        Err(e) => log::warn!("Render error: {:?}", e),
    }
}
