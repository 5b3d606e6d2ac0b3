//! Declarative accessor generation.
//!
//! [`properties!`](crate::properties) declares a struct whose fields are
//! private to the invoking module and exposes them through generated
//! `get_<field>()` readers and, for read-write fields, `set_<field>(value)`
//! writers. Every field carries a default used by the generated
//! [`Default`] impl.
//!
//! ```
//! nrc_core::properties! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct EncodingSettings {
//!         /// Number of hash-grid levels.
//!         ro n_levels: u32 = 16,
//!         /// Optimizer step size.
//!         rw learning_rate: f32 = 1e-3,
//!     }
//! }
//!
//! let mut s = EncodingSettings::default();
//! assert_eq!(s.get_n_levels(), 16);
//! s.set_learning_rate(5e-4);
//! assert_eq!(s.get_learning_rate(), 5e-4);
//! ```
//!
//! Read-only fields have no setter:
//!
//! ```compile_fail
//! nrc_core::properties! {
//!     pub struct Frozen {
//!         ro width: u32 = 8,
//!     }
//! }
//!
//! let mut f = Frozen::default();
//! f.set_width(16);
//! ```
//!
//! Nor can the field be reached directly from another module:
//!
//! ```compile_fail
//! mod inner {
//!     nrc_core::properties! {
//!         pub struct Frozen {
//!             ro width: u32 = 8,
//!         }
//!     }
//! }
//!
//! let mut f = inner::Frozen::default();
//! f.width = 16;
//! ```

/// Declare a struct with defaulted private fields and generated accessors.
///
/// Each field is written as `rw name: Type = default` (reader and writer) or
/// `ro name: Type = default` (reader only). Attributes on a field, including
/// doc comments, are attached to its reader.
///
/// Readers return a clone of the field; writers assign without validation.
/// Do not derive `Default` on the struct: the macro provides it.
#[macro_export]
macro_rules! properties {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $access:ident $field:ident : $ty:ty = $default:expr
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $field: $ty, )*
        }

        impl ::core::default::Default for $name {
            fn default() -> Self {
                Self { $( $field: $default, )* }
            }
        }

        impl $name {
            $(
                $crate::__property_accessors!($access $(#[$fmeta])* $field: $ty);
            )*
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __property_accessors {
    (ro $(#[$fmeta:meta])* $field:ident : $ty:ty) => {
        $crate::paste::paste! {
            $(#[$fmeta])*
            #[allow(clippy::clone_on_copy)]
            pub fn [<get_ $field>](&self) -> $ty {
                self.$field.clone()
            }
        }
    };
    (rw $(#[$fmeta:meta])* $field:ident : $ty:ty) => {
        $crate::__property_accessors!(ro $(#[$fmeta])* $field: $ty);

        $crate::paste::paste! {
            #[doc = concat!("Overwrite `", stringify!($field), "`.")]
            pub fn [<set_ $field>](&mut self, value: $ty) {
                self.$field = value;
            }
        }
    };
}

#[cfg(test)]
mod tests {
    crate::properties! {
        #[derive(Debug, Clone, PartialEq)]
        struct Camera {
            rw exposure: f32 = 1.0,
            rw label: String = String::from("main"),
            ro resolution: (u32, u32) = (1920, 1080),
        }
    }

    #[test]
    fn test_defaults() {
        let cam = Camera::default();
        assert_eq!(cam.get_exposure(), 1.0);
        assert_eq!(cam.get_label(), "main");
        assert_eq!(cam.get_resolution(), (1920, 1080));
    }

    #[test]
    fn test_set_touches_only_its_field() {
        let mut cam = Camera::default();
        cam.set_exposure(0.25);
        assert_eq!(cam.get_exposure(), 0.25);
        assert_eq!(cam.get_label(), "main");
        assert_eq!(cam.get_resolution(), (1920, 1080));

        cam.set_label("aux".to_string());
        assert_eq!(cam.get_label(), "aux");
        assert_eq!(cam.get_exposure(), 0.25);
    }

    #[test]
    fn test_get_returns_copy() {
        let cam = Camera::default();
        let mut label = cam.get_label();
        label.push_str("-edited");
        assert_eq!(cam.get_label(), "main");
    }

    #[test]
    fn test_readonly_writable_inside_declaring_module() {
        let mut cam = Camera::default();
        cam.resolution = (640, 480);
        assert_eq!(cam.get_resolution(), (640, 480));
    }
}
