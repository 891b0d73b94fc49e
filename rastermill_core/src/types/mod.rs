//! Contains types like pixel rectangles, sample-type tags, tiles, ROI membership and no-data predicates.

mod no_data;
pub use no_data::*;

mod pixel_rect;
pub use pixel_rect::*;

mod roi;
pub use roi::*;

mod sample_type;
pub use sample_type::*;

mod tile;
pub use tile::*;
