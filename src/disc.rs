pub mod boundary;
pub mod grid;
pub mod stencil;
pub mod wind;
