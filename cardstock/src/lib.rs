pub use canvas::*;
pub use card::*;
pub use errors::*;
pub use format::*;
pub use game::*;
pub use layout::*;
pub use poll::*;
pub use selection::*;
pub use text::*;

#[cfg(test)]
mod arbitrary;
mod canvas;
mod card;
mod errors;
mod format;
mod game;
mod layout;
mod poll;
mod selection;
mod text;
