//! Macros for declaring tagged enums.

/// Implement [`Tagged`](crate::core::Tagged) for an enum.
///
/// Each variant is mapped to its string tag. Variants may be unit, tuple or
/// struct shaped; payloads are ignored when computing the tag. The listed
/// variants must cover the whole enum, otherwise the generated `match` fails
/// to compile.
///
/// # Example
///
/// ```
/// use statecraft::core::{Action, Tagged};
/// use statecraft::tagged;
/// use serde::Serialize;
///
/// #[derive(Debug, Serialize)]
/// enum Mouse {
///     Down { x: i32 },
///     Up,
/// }
///
/// tagged!(Mouse {
///     Down => "MOUSE_DOWN",
///     Up => "MOUSE_UP",
/// });
///
/// impl Action for Mouse {}
///
/// assert_eq!(Mouse::Down { x: 4 }.tag(), "MOUSE_DOWN");
/// ```
#[macro_export]
macro_rules! tagged {
    (
        $name:ident {
            $($variant:ident => $tag:literal),* $(,)?
        }
    ) => {
        impl $crate::core::Tagged for $name {
            const TAGS: &'static [&'static str] = &[$($tag),*];

            fn tag(&self) -> &'static str {
                match self {
                    $(Self::$variant { .. } => $tag,)*
                }
            }
        }
    };
}
