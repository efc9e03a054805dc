// Topology engine
//
// Everything between a topology snapshot and a drawn frame: coordinate
// mapping, node layout, the animation overlay, the renderer and the frame
// loop that drives them. Nothing in here knows about terminals; drawing goes
// through the `Surface` trait.

pub mod config;
pub mod frame_loop;
pub mod layout;
pub mod mapper;
pub mod model;
pub mod overlay;
pub mod render;
pub mod surface;

pub use config::EngineConfig;
pub use frame_loop::{FrameLoop, TickOutcome};
pub use mapper::PixelPoint;
pub use model::{MessageEvent, MessageKind, Node, PlanePoint, Protocol};
pub use surface::{DisplayList, Paint, Shape, Surface};
