//! Macros for ergonomic state machine construction.

/// Generate a state enum, its tag enum and the `State` implementation.
///
/// Variants may be unit variants or carry named fields. The tag enum gets
/// one payload-free variant per state variant, which is what transitions
/// use for their `from`/`to` matching.
///
/// # Example
///
/// ```
/// use waypoint::core::State;
/// use waypoint::fsm_state;
///
/// fsm_state! {
///     pub enum Download: DownloadTag {
///         Idle,
///         Loading { url: String, attempt: u32 },
///         Done { bytes: u64 },
///         Failed,
///     }
/// }
///
/// let state = Download::Loading { url: "https://example.org".into(), attempt: 1 };
/// assert_eq!(state.tag(), DownloadTag::Loading);
/// assert_eq!(state.name(), "Loading");
/// ```
#[macro_export]
macro_rules! fsm_state {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $tag:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $({ $($field:ident : $ty:ty),* $(,)? })?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant $({ $($field : $ty),* })?
            ),*
        }

        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $tag {
            $($variant),*
        }

        impl $crate::core::StateTag for $tag {
            type State = $name;
        }

        impl $crate::core::State for $name {
            type Tag = $tag;

            fn tag(&self) -> $tag {
                match self {
                    $(Self::$variant { .. } => $tag::$variant),*
                }
            }

            fn name(&self) -> &str {
                match self {
                    $(Self::$variant { .. } => stringify!($variant)),*
                }
            }
        }
    };
}
