//! Typed ID wrappers for type safety across liji.
//!
//! Rows are identified by SQLite integer row ids. These newtypes keep a
//! giftbook id from being passed where a record id is expected.

use serde::{Deserialize, Serialize};

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Raw integer value as stored in the database.
            #[must_use]
            pub fn get(self) -> i64 {
                self.0
            }

            /// Interpret an id sent by a client. Missing and non-positive ids
            /// mean "not stored yet".
            #[must_use]
            pub fn from_client(raw: Option<i64>) -> Option<Self> {
                raw.filter(|id| *id > 0).map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(
    /// Identifier of a gift record.
    RecordId
);

row_id!(
    /// Identifier of a giftbook.
    GiftbookId
);

row_id!(
    /// Identifier of a line item inside a giftbook.
    GiftbookItemId
);
