pub mod body;
pub mod c_api;
pub mod error;
pub mod gesture;
pub mod params;
pub mod presets;
pub mod simulation;
pub mod trail;

pub use body::{Body, BodySpec};
pub use error::SimError;
pub use params::{Params, Scenario, validate_bodies};
pub use presets::Preset;
pub use simulation::{Energy, G0, MergeEvent, Simulation, zero_momentum};
pub use trail::{Trail, Trails};
pub use ultraviolet::DVec3;
