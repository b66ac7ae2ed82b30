//! Scene import from external file formats.

pub mod obj;

pub use obj::load_obj_scene;
