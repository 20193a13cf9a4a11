pub mod control_plane;
pub mod error;
pub mod model;
pub mod value_object;
