//! Scalar types that can be stored in attributes.

use std::fmt::Debug;

use num_traits::{NumCast, ToPrimitive};

use super::attribute::Attribute;
use super::handle::{AttributeHandle, TypedAttributeHandle};
use super::manager::TypedAttributes;

/// A value type storable in an [`Attribute`].
///
/// Implemented for `i8` (flags and tags), `i64` (ids, connectivity, maps) and
/// `f64` (geometry).
pub trait AttributeValue:
    Copy + Default + PartialEq + PartialOrd + Debug + Send + Sync + NumCast + ToPrimitive + 'static
{
    /// Integer types round when averaging.
    const IS_INTEGER: bool;

    #[doc(hidden)]
    fn column(stores: &TypedAttributes) -> &[Attribute<Self>];
    #[doc(hidden)]
    fn column_mut(stores: &mut TypedAttributes) -> &mut Vec<Attribute<Self>>;
    #[doc(hidden)]
    fn wrap(handle: TypedAttributeHandle<Self>) -> AttributeHandle;

    /// Arithmetic mean of two values, rounded for integer types.
    fn mean(a: Self, b: Self) -> Self {
        let (Some(x), Some(y)) = (a.to_f64(), b.to_f64()) else {
            return a;
        };
        let mut m = 0.5 * (x + y);
        if Self::IS_INTEGER {
            m = m.round();
        }
        <Self as NumCast>::from(m).unwrap_or(a)
    }
}

macro_rules! impl_attribute_value {
    ($t:ty, $field:ident, $variant:ident, $int:expr) => {
        impl AttributeValue for $t {
            const IS_INTEGER: bool = $int;

            fn column(stores: &TypedAttributes) -> &[Attribute<Self>] {
                &stores.$field
            }

            fn column_mut(stores: &mut TypedAttributes) -> &mut Vec<Attribute<Self>> {
                &mut stores.$field
            }

            fn wrap(handle: TypedAttributeHandle<Self>) -> AttributeHandle {
                AttributeHandle::$variant(handle)
            }
        }
    };
}

impl_attribute_value!(i8, chars, Char, true);
impl_attribute_value!(i64, longs, Long, true);
impl_attribute_value!(f64, doubles, Double, false);
