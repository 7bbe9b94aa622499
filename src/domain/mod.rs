// Domain layer: inventory models and ports (interfaces).

pub mod model;
pub mod ports;
