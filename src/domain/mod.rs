// Domain layer: core models and ports (interfaces). No filesystem access here.

pub mod model;
pub mod ports;
