pub mod controls;
pub mod frame_view;
