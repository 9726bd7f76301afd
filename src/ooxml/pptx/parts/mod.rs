/// XML parts of a presentation package read by the deck model.
pub mod layout;
pub mod presentation;
pub mod theme;

pub use layout::InheritedGeometry;
pub use presentation::{PresentationInfo, SlideRef};
pub use theme::{Theme, ThemeColor};
