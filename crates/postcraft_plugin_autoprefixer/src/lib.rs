mod autoprefixer;
mod prefix_data;

pub use autoprefixer::*;
