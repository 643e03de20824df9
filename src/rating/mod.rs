pub mod collection;
pub mod item;
pub mod set;

pub use collection::{SetCollection, SetTitles};
pub use item::{Item, ItemId, SetId};
pub use set::ItemSet;
