//! Name-based lookup of mod functions.
//!
//! The built-in set is declared once with [`define_mod_function_registry!`], which
//! generates [`ModFunctionKind`] (one variant per built-in, serialized as its
//! registry name). Names come from each mod function's `NAME` constant. [`ModFunctionRegistry`] maps names to shared instances and can
//! be extended with additional mod functions at runtime.

use crate::mod_function::ModFunction;
use crate::mod_functions::{FilterSuccess, FlipImageChannels, ResizeAndJpegEncode};
use indexmap::IndexMap;
use rlds_structures::{RldsDataError, RldsResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

macro_rules! define_mod_function_registry {
    (
        variants: {
            $(
                $(#[$variant_meta:meta])*
                $variant_name:ident => {
                    name: $name:expr,
                    create: $create_expr:expr,
                }
            ),* $(,)?
        }
    ) => {
        /// Every built-in mod function, in registration order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ModFunctionKind {
            $(
                $(#[$variant_meta])*
                $variant_name,
            )*
        }

        impl ModFunctionKind {
            pub const ALL: &'static [ModFunctionKind] = &[$(ModFunctionKind::$variant_name),*];

            /// The name this mod function is registered under.
            pub fn name(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant_name => $name,
                    )*
                }
            }

            /// Creates a fresh instance of this mod function.
            pub fn create(&self) -> Box<dyn ModFunction> {
                match self {
                    $(
                        Self::$variant_name => $create_expr,
                    )*
                }
            }
        }

        impl FromStr for ModFunctionKind {
            type Err = RldsDataError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                ModFunctionKind::ALL
                    .iter()
                    .find(|kind| kind.name() == s)
                    .copied()
                    .ok_or_else(|| RldsDataError::UnknownModFunction(s.to_string()))
            }
        }
    };
}

define_mod_function_registry! {
    variants: {
        /// Resizes image and depth observations to 256 x 256
        ResizeAndJpegEncode => {
            name: ResizeAndJpegEncode::NAME,
            create: Box::new(ResizeAndJpegEncode),
        },
        /// Drops episodes that did not succeed
        FilterSuccess => {
            name: FilterSuccess::NAME,
            create: Box::new(FilterSuccess),
        },
        /// Swaps RGB and BGR on the main camera image
        FlipImageChannels => {
            name: FlipImageChannels::NAME,
            create: Box::new(FlipImageChannels::image()),
        },
        /// Swaps RGB and BGR on wrist and hand camera images
        FlipWristImageChannels => {
            name: FlipImageChannels::WRIST_NAME,
            create: Box::new(FlipImageChannels::wrist_image()),
        },
    }
}

impl Display for ModFunctionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for ModFunctionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ModFunctionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Maps mod function names to shared, stateless instances.
#[derive(Debug, Clone, Default)]
pub struct ModFunctionRegistry {
    entries: IndexMap<&'static str, Arc<dyn ModFunction>>,
}

impl ModFunctionRegistry {
    /// A registry with nothing registered.
    pub fn empty() -> ModFunctionRegistry {
        ModFunctionRegistry::default()
    }

    /// A registry holding every [`ModFunctionKind`].
    pub fn builtin() -> ModFunctionRegistry {
        ModFunctionKind::ALL
            .iter()
            .fold(ModFunctionRegistry::empty(), |registry, kind| registry.register_shared(Arc::from(kind.create())))
    }

    /// Adds `mod_function` under its own name, replacing any previous entry with that name.
    pub fn register<M: ModFunction + 'static>(self, mod_function: M) -> ModFunctionRegistry {
        self.register_shared(Arc::new(mod_function))
    }

    pub fn register_shared(mut self, mod_function: Arc<dyn ModFunction>) -> ModFunctionRegistry {
        self.entries.insert(mod_function.name(), mod_function);
        self
    }

    pub fn get(&self, name: &str) -> RldsResult<Arc<dyn ModFunction>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| RldsDataError::UnknownModFunction(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
