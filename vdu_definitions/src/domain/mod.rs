//! Typed entities shared by every later stage of the engine.

pub mod flags;
pub mod operator;
pub mod outcome;
pub mod pod;
pub mod request;
pub mod server;
pub mod socket;

pub use self::flags::FeatureFlags;
pub use self::operator::Operator;
pub use self::outcome::ValidationOutcome;
pub use self::pod::PodKind;
pub use self::request::{DeploymentRequest, PodRequirement};
pub use self::server::ServerConfig;
pub use self::socket::{PlacedPod, PlacementPlan, SocketCapacity, SocketId};
