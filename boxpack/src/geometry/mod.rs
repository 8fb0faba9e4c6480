mod placed_rect;
mod rect;

#[doc(inline)]
pub use placed_rect::PlacedRect;

#[doc(inline)]
pub use placed_rect::consolidate;

#[doc(inline)]
pub use rect::Rect;
