use std::sync::atomic::{AtomicU32, Ordering};

macro_rules! define_id_type {
    ($name:ident, $counter:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        static $counter: AtomicU32 = AtomicU32::new(0);

        impl $name {
            /// Get the inner u32 value.
            pub fn inner(self) -> u32 {
                self.0
            }

            /// Create an ID from a u32 value.
            pub fn new(value: u32) -> Self {
                Self(value)
            }

            /// Allocate the next process-unique ID. IDs are never reused.
            pub fn fresh() -> Self {
                Self($counter.fetch_add(1, Ordering::Relaxed))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id_type!(VariableId, NEXT_VARIABLE_ID);
define_id_type!(ConstraintId, NEXT_CONSTRAINT_ID);
