pub mod animator;
pub mod cards;
pub mod frame_loop;
pub mod layout;
pub mod scene;
pub mod view;

pub use animator::ScrollAnimator;
pub use cards::{CardSet, CardStyle, ImageRequest};
pub use frame_loop::FrameLoop;
pub use layout::{Viewport, WheelParams};
pub use scene::WheelScene;
pub use view::draw;

pub const LABEL_WIDTH: i32 = 512;
pub const LABEL_HEIGHT: i32 = 256;
pub const LABEL_FONT_SIZE: f64 = 64.0;
pub const LABEL_STROKE_WIDTH: f64 = 4.0;
/// Decode size for card images, matching the label bitmap.
pub const IMAGE_WIDTH: i32 = LABEL_WIDTH;
pub const IMAGE_HEIGHT: i32 = LABEL_HEIGHT;
pub const CARD_CORNER_RADIUS: f64 = 12.0; // world units
pub const SELECTED_BORDER_WIDTH: f64 = 3.0; // pixels
