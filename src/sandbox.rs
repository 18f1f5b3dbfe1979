//! Frame driver tying the scene, the physics world and the controller
//! together.

use crate::clock::{SimulationClock, DEFAULT_FIXED_STEP, DEFAULT_MAX_FRAME_DELTA};
use crate::debug::DebugLayer;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::params::SimulationParameters;
use crate::physics::PhysicsWorld;
use crate::registry::{RigidBodyRegistry, TrackedBody, DEFAULT_SETTLE_IMPULSE};
use crate::scene::{NodeId, NodeKind, Scene, Transform};
use crate::selection::{Command, Outcome, SelectionController};
use glam::Vec3;

pub const FLOOR_SIZE: f32 = 50.0;
pub const FLOOR_HALF_THICKNESS: f32 = 0.1;
const FLOOR_SEGMENTS: u32 = 25;
const SPAWN_HEIGHT: f32 = 5.0;

#[derive(Debug, Clone)]
pub struct SandboxConfig {
    pub params: SimulationParameters,
    /// Seconds per physics step.
    pub fixed_step: f64,
    /// Longest frame delta fed to the clock.
    pub max_frame_delta: f64,
    pub max_steps_per_frame: Option<u32>,
    pub settle_impulse: Vec3,
    pub debug: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            params: SimulationParameters::default(),
            fixed_step: DEFAULT_FIXED_STEP,
            max_frame_delta: DEFAULT_MAX_FRAME_DELTA,
            max_steps_per_frame: None,
            settle_impulse: DEFAULT_SETTLE_IMPULSE,
            debug: false,
        }
    }
}

/// What happened during one call to `Sandbox::frame`.
#[derive(Debug, Default)]
pub struct FrameReport {
    pub steps: u32,
    pub promoted: Vec<TrackedBody>,
    /// Commands that were not legal in the state they arrived in.
    pub ignored: usize,
    /// Recoverable failures, such as fitting a flat object.
    pub rejected: Vec<Error>,
}

pub struct Sandbox {
    scene: Scene,
    world: PhysicsWorld,
    registry: RigidBodyRegistry,
    selection: SelectionController,
    debug: DebugLayer,
    params: SimulationParameters,
    clock: SimulationClock,
    pending: Vec<Command>,
    floor: NodeId,
}

impl Sandbox {
    pub fn new(config: SandboxConfig) -> Result<Self> {
        let params = config.params.validated()?;
        let clock = SimulationClock::new(config.fixed_step, config.max_frame_delta)?
            .with_max_steps_per_frame(config.max_steps_per_frame);
        let mut scene = Scene::new();
        let mut world = PhysicsWorld::new(params.gravity_vector(), config.fixed_step as f32);

        let floor = scene.add(
            scene.root(),
            "Floor",
            NodeKind::Object,
            Transform::IDENTITY,
            Some(Mesh::floor_grid(FLOOR_SIZE, FLOOR_SEGMENTS)),
        )?;
        world.add_fixed_cuboid(
            Vec3::ZERO,
            Vec3::new(FLOOR_SIZE / 2.0, FLOOR_HALF_THICKNESS, FLOOR_SIZE / 2.0),
        );
        populate_demo_scene(&mut scene)?;

        let mut sandbox = Self {
            scene,
            world,
            registry: RigidBodyRegistry::new(config.settle_impulse),
            selection: SelectionController::new(),
            debug: DebugLayer::default(),
            params,
            clock,
            pending: Vec::new(),
            floor,
        };
        if config.debug {
            sandbox.push(Command::ToggleDebug);
        }
        log::info!("sandbox ready with {} nodes", sandbox.scene.len());
        Ok(sandbox)
    }

    /// Queues a command for the next frame.
    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    /// Runs queued commands, advances the physics world, then syncs visuals.
    ///
    /// Only failures that leave the world unable to continue are returned as
    /// `Err`; everything else lands in the report.
    pub fn frame(&mut self, frame_delta: f64) -> Result<FrameReport> {
        let mut report = FrameReport::default();
        for command in std::mem::take(&mut self.pending) {
            match self.execute(command) {
                Ok(Outcome::Applied) => {}
                Ok(Outcome::Ignored) => report.ignored += 1,
                Ok(Outcome::Promoted(tracked)) => report.promoted.push(tracked),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    log::warn!("{:?} rejected: {}", command, err);
                    report.rejected.push(err);
                }
            }
        }

        report.steps = self.clock.advance(frame_delta);
        for _ in 0..report.steps {
            self.world.step()?;
        }

        let bodies = self.registry.sync_all(&self.world, &mut self.scene);
        let proxies = self.debug.sync(&self.scene);
        for err in [bodies, proxies].into_iter().filter_map(|r| r.err()) {
            if err.is_fatal() {
                return Err(err);
            }
            log::warn!("visual sync failed: {}", err);
            report.rejected.push(err);
        }
        Ok(report)
    }

    fn execute(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::Pick(ray) => Ok(self.selection.pick(&self.scene, ray.as_ref())),
            Command::AssignCollider(kind) => {
                self.selection
                    .assign_collider(&mut self.scene, &self.registry, kind, &self.params)
            }
            Command::EnablePhysics => {
                let outcome = self.selection.enable_physics(
                    &self.scene,
                    &mut self.world,
                    &mut self.registry,
                    &self.params,
                )?;
                if let Outcome::Promoted(tracked) = &outcome {
                    self.debug.on_promoted(&self.scene, &self.world, tracked)?;
                }
                Ok(outcome)
            }
            Command::ApplyForce => {
                self.selection
                    .apply_force(&mut self.world, &self.registry, &self.params)
            }
            Command::ToggleDebug => {
                self.debug.toggle(&self.scene, &self.world, &self.registry)?;
                Ok(Outcome::Applied)
            }
            Command::SetParameter(update) => {
                let value = self.params.apply(update)?;
                self.registry
                    .propagate_parameters(&mut self.world, &self.params)?;
                log::info!("{} set to {:.2}", update.name(), value);
                Ok(Outcome::Applied)
            }
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn registry(&self) -> &RigidBodyRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn debug(&self) -> &DebugLayer {
        &self.debug
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn floor(&self) -> NodeId {
        self.floor
    }
}

/// Five primitives in a row, plus a composite model made of several meshes.
fn populate_demo_scene(scene: &mut Scene) -> Result<()> {
    let primitives = [
        ("Box", Mesh::cuboid(1.0, 1.0, 1.0)),
        ("Sphere", Mesh::uv_sphere(0.5)),
        ("Cylinder", Mesh::cylinder(0.5, 0.5, 1.0)),
        ("Icosahedron", Mesh::icosahedron(0.5)),
        ("TorusKnot", Mesh::torus_knot(0.5, 0.2)),
    ];
    for (i, (name, mesh)) in primitives.into_iter().enumerate() {
        let position = Vec3::new(i as f32 * 2.0 - 4.0, SPAWN_HEIGHT, 0.0);
        let id = scene.add(
            scene.root(),
            name,
            NodeKind::Object,
            Transform::from_translation(position),
            Some(mesh),
        )?;
        scene.node_mut(id)?.pickable = true;
    }

    let model = scene.add(
        scene.root(),
        "Model",
        NodeKind::Group,
        Transform::from_translation(Vec3::new(6.0, SPAWN_HEIGHT, 0.0)),
        None,
    )?;
    scene.node_mut(model)?.pickable = true;
    let parts = [
        ("Model body", Vec3::ZERO, Mesh::cuboid(1.2, 0.5, 0.5)),
        (
            "Model head",
            Vec3::new(0.7, 0.4, 0.0),
            Mesh::cuboid(0.45, 0.45, 0.4),
        ),
        (
            "Model tail",
            Vec3::new(-0.7, 0.2, 0.0),
            Mesh::cylinder(0.05, 0.08, 0.3),
        ),
    ];
    for (name, offset, mesh) in parts {
        scene.add(
            model,
            name,
            NodeKind::Object,
            Transform::from_translation(offset),
            Some(mesh),
        )?;
    }
    for (i, (x, z)) in [(0.45, 0.18), (0.45, -0.18), (-0.45, 0.18), (-0.45, -0.18)]
        .into_iter()
        .enumerate()
    {
        scene.add(
            model,
            format!("Model leg {}", i),
            NodeKind::Object,
            Transform::from_translation(Vec3::new(x, -0.45, z)),
            Some(Mesh::cylinder(0.08, 0.08, 0.4)),
        )?;
    }
    Ok(())
}
