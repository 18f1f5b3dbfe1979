//! Selection and promotion state machine.
//!
//! One object is in focus at a time. Picking another object drops any
//! collider that was assigned but never promoted; bodies that already exist
//! stay in the registry.

use crate::collider::{self, ColliderDescriptor, ShapeKind};
use crate::error::Result;
use crate::params::{ParameterUpdate, SimulationParameters};
use crate::physics::PhysicsWorld;
use crate::registry::{Promotion, RigidBodyRegistry, TrackedBody};
use crate::scene::{NodeId, Ray, Scene};

/// Discrete requests from the control surface, consumed once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Pointer pick. `None` when the pointer is outside the viewport.
    Pick(Option<Ray>),
    AssignCollider(ShapeKind),
    EnablePhysics,
    ApplyForce,
    ToggleDebug,
    SetParameter(ParameterUpdate),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionState {
    #[default]
    NoSelection,
    Selected(NodeId),
    ColliderAssigned {
        pivot: NodeId,
        descriptor: ColliderDescriptor,
    },
    PhysicsEnabled(TrackedBody),
}

impl SelectionState {
    pub fn name(&self) -> &'static str {
        match self {
            SelectionState::NoSelection => "no selection",
            SelectionState::Selected(_) => "selected",
            SelectionState::ColliderAssigned { .. } => "collider assigned",
            SelectionState::PhysicsEnabled(_) => "physics enabled",
        }
    }

    /// Node currently in focus.
    pub fn focus(&self) -> Option<NodeId> {
        match self {
            SelectionState::NoSelection => None,
            SelectionState::Selected(node) => Some(*node),
            SelectionState::ColliderAssigned { pivot, .. } => Some(*pivot),
            SelectionState::PhysicsEnabled(tracked) => Some(tracked.node),
        }
    }
}

/// What a command did to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Not legal in the current state; nothing changed.
    Ignored,
    /// A new body was created.
    Promoted(TrackedBody),
}

/// Nearest pickable hit, widened to its top-level selectable unit.
pub fn pick(scene: &Scene, ray: &Ray) -> Option<NodeId> {
    let hit = scene.raycast(ray)?;
    scene.selectable_root(hit.node)
}

#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    state: SelectionState,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn focus(&self) -> Option<NodeId> {
        self.state.focus()
    }

    fn transition(&mut self, next: SelectionState) {
        if self.state.name() != next.name() || self.state.focus() != next.focus() {
            log::info!(
                "selection: {} {:?} -> {} {:?}",
                self.state.name(),
                self.state.focus(),
                next.name(),
                next.focus()
            );
        }
        self.state = next;
    }

    fn ignore(&self, command: &str) -> Outcome {
        log::debug!("ignoring {} in state {}", command, self.state.name());
        Outcome::Ignored
    }

    pub fn pick(&mut self, scene: &Scene, ray: Option<&Ray>) -> Outcome {
        match ray.and_then(|ray| pick(scene, ray)) {
            None => self.transition(SelectionState::NoSelection),
            Some(node) if Some(node) == self.focus() => {}
            Some(node) => self.transition(SelectionState::Selected(node)),
        }
        Outcome::Applied
    }

    /// Fits a collider to the focus. A rejected fit leaves the focus
    /// `Selected`, dropping any collider assigned earlier.
    pub fn assign_collider(
        &mut self,
        scene: &mut Scene,
        registry: &RigidBodyRegistry,
        kind: ShapeKind,
        params: &SimulationParameters,
    ) -> Result<Outcome> {
        let target = match &self.state {
            SelectionState::Selected(node) if !registry.is_tracked(*node) => *node,
            SelectionState::ColliderAssigned { pivot, .. } => *pivot,
            _ => return Ok(self.ignore("assign collider")),
        };
        let (pivot, descriptor) = match collider::fit(scene, target, kind, params) {
            Ok(fitted) => fitted,
            Err(err) => {
                self.transition(SelectionState::Selected(target));
                return Err(err);
            }
        };
        self.transition(SelectionState::ColliderAssigned { pivot, descriptor });
        Ok(Outcome::Applied)
    }

    pub fn enable_physics(
        &mut self,
        scene: &Scene,
        world: &mut PhysicsWorld,
        registry: &mut RigidBodyRegistry,
        params: &SimulationParameters,
    ) -> Result<Outcome> {
        match &self.state {
            SelectionState::ColliderAssigned { pivot, descriptor } => {
                let promotion = registry.create_body(scene, world, *pivot, descriptor, params)?;
                self.transition(SelectionState::PhysicsEnabled(promotion.tracked()));
                Ok(match promotion {
                    Promotion::Created(tracked) => Outcome::Promoted(tracked),
                    Promotion::AlreadyTracked(_) => Outcome::Applied,
                })
            }
            SelectionState::Selected(node) => match registry.get(*node) {
                Some(tracked) => {
                    self.transition(SelectionState::PhysicsEnabled(*tracked));
                    Ok(Outcome::Applied)
                }
                None => Ok(self.ignore("enable physics")),
            },
            _ => Ok(self.ignore("enable physics")),
        }
    }

    /// Sends the configured horizontal impulse to the focused body.
    pub fn apply_force(
        &mut self,
        world: &mut PhysicsWorld,
        registry: &RigidBodyRegistry,
        params: &SimulationParameters,
    ) -> Result<Outcome> {
        let tracked = match &self.state {
            SelectionState::PhysicsEnabled(tracked) => *tracked,
            SelectionState::Selected(node) => match registry.get(*node) {
                Some(tracked) => *tracked,
                None => return Ok(self.ignore("apply force")),
            },
            _ => return Ok(self.ignore("apply force")),
        };
        registry.apply_impulse(world, &tracked, params.impulse_vector())?;
        log::debug!("impulse {:?} on {:?}", params.impulse_vector(), tracked.node);
        self.transition(SelectionState::PhysicsEnabled(tracked));
        Ok(Outcome::Applied)
    }
}
