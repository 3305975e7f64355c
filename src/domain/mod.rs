// Domain layer: farm models and ports (interfaces) implemented by core/config/inference.

pub mod inference;
pub mod model;
pub mod ports;
