mod stbox;
pub use stbox::STBox;

mod tbox;
pub use tbox::TBox;
