pub mod contents_json;
pub mod draw;
pub mod icon_gen;
