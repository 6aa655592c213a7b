mod error;
mod model;
mod tag;

use super::*;

pub use error::{BlockwireError, BlockwireResult};
pub use model::{Attribute, Collection, DomainModel, DropdownOption, LinkType, Variable};
pub(crate) use model::is_valid_collection_id;
pub use tag::TypeTag;
