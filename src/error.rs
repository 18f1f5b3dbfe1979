use crate::scene::NodeId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fitting found no geometry, or the fitted shape has zero volume.
    #[error("node {node:?} has no measurable geometry for a {shape} collider")]
    DegenerateGeometry { node: NodeId, shape: &'static str },

    #[error("node {0:?} is not part of the scene")]
    UnknownNode(NodeId),

    #[error("cannot move node {child:?} under {parent:?}")]
    InvalidReparent { child: NodeId, parent: NodeId },

    #[error("invalid value {value} for parameter `{name}`")]
    InvalidParameter { name: &'static str, value: f32 },

    /// Clock settings that would stall or break the step loop.
    #[error("invalid clock setting `{name}`: {value}")]
    InvalidClock { name: &'static str, value: f64 },

    #[error("tracked node {0:?} lost its rigid body")]
    MissingBody(NodeId),

    /// The physics world cannot advance. Not recoverable mid-simulation.
    #[error("physics world cannot step: {0}")]
    NonFiniteState(String),
}

impl Error {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::NonFiniteState(_))
    }
}
