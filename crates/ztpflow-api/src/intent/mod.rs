// Catalyst Center intent API endpoint bindings.
//
// One file per service area, implemented as inherent methods on
// `ControllerSession`. Response models live in `models`.

pub mod models;
pub mod pnp;
pub mod sites;
pub mod tasks;
pub mod templates;
