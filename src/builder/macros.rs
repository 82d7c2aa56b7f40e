//! Macros for ergonomic identifier declaration.

/// Declare a fieldless enum usable as machine state.
///
/// Derives `Clone`, `Copy`, `Eq`, `Hash`, `Debug` and serde support, and
/// implements [`State`](crate::core::State) with the variant names.
///
/// # Example
///
/// ```
/// use mindset::state_enum;
/// use mindset::core::State;
///
/// state_enum! {
///     pub enum Stopwatch {
///         Stopped,
///         Running,
///     }
/// }
///
/// assert_eq!(Stopwatch::Running.name(), "Running");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),+
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }
    };
}

/// Declare a fieldless enum usable as machine action.
///
/// # Example
///
/// ```
/// use mindset::action_enum;
/// use mindset::core::Action;
///
/// action_enum! {
///     pub enum StopwatchAction {
///         Start,
///         Stop,
///         Reset,
///     }
/// }
///
/// assert_eq!(StopwatchAction::Reset.name(), "Reset");
/// ```
#[macro_export]
macro_rules! action_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),+
        }

        impl $crate::core::Action for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }
    };
}
