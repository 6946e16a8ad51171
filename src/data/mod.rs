// Thin namespace wrapper for storage components
pub mod db_storage {
    pub use crate::db_storage::*;
}

pub mod store {
    pub use crate::store::*;
}
