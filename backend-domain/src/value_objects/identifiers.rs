// Identifier value objects
// Row ids are storage-assigned, monotonically increasing and never reused

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! row_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

row_id!(EventId);
row_id!(GuestId);
row_id!(CheckinId);
row_id!(ReversalId);
row_id!(PrizeId);
row_id!(WinnerId);
row_id!(SouvenirId);
row_id!(TakeId);
row_id!(OperatorId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_bare_numbers() {
        let json = serde_json::to_string(&GuestId(42)).expect("serialize");
        assert_eq!(json, "42");
        let parsed: PrizeId = serde_json::from_str("7").expect("deserialize");
        assert_eq!(parsed, PrizeId(7));
    }
}
