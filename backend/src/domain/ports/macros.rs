//! Helper macro for declaring port error enums with snake_case constructors.
//!
//! ```ignore
//! define_port_error! {
//!     /// Errors raised by the ledger.
//!     pub enum LedgerError {
//!         /// Store unreachable.
//!         Connection { message: String } => "ledger connection failed: {message}",
//!     }
//! }
//! let err = LedgerError::connection("pool timed out");
//! ```

macro_rules! define_port_error {
    (@ctor $name:ident $variant:ident) => {
        ::paste::paste! {
            #[doc = "Construct [`" $name "::" $variant "`]."]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $name:ident $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $name $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $name:ident $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = "Construct [`" $name "::" $variant "`]."]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $name:ident $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $name
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $name $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for the generated constructors.
    use crate::domain::StudentId;

    define_port_error! {
        pub enum SamplePortError {
            Unavailable => "store unavailable",
            Query { message: String } => "query failed: {message}",
            Missing { student_id: StudentId } => "student {student_id} missing",
            Retry { message: String, attempts: u32 } => "{message} after {attempts} attempts",
        }
    }

    #[test]
    fn unit_variant_constructor() {
        assert_eq!(SamplePortError::unavailable().to_string(), "store unavailable");
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = SamplePortError::query("timeout");
        assert_eq!(err.to_string(), "query failed: timeout");
    }

    #[test]
    fn constructors_preserve_domain_types() {
        let err = SamplePortError::missing(StudentId::new(4));
        assert_eq!(err.to_string(), "student 4 missing");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = SamplePortError::retry("stale status", 3_u32);
        assert_eq!(err.to_string(), "stale status after 3 attempts");
    }
}
