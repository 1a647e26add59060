pub mod down;
pub mod show;
pub mod up;
pub mod validate;
