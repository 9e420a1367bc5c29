// Domain layer: tariff and shipment models plus the ports the engine depends on.

pub mod model;
pub mod ports;
