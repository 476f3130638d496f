//! Row shapes for multi-column storage.
//!
//! A [`Row`] describes one bundle of components stored together, one dense
//! column per field. The trait is implemented for tuples up to eight
//! components; [`ArchetypeStore`](crate::ArchetypeStore) drives all column
//! edits through it so the columns move in lockstep.

use std::any::Any;

/// A component bundle stored as one dense column per field.
///
/// Implementations must keep every column the same length and apply edits
/// to all columns at the same row. The tuple implementations below do; a
/// hand-written implementation carries the same obligation.
///
/// Typed column lookup walks the columns in declaration order and returns
/// the first whose element type matches, so a row that repeats a component
/// type can only reach the later duplicates through [`get`](Row::get) and
/// [`get_mut`](Row::get_mut).
pub trait Row: Sized + 'static {
    /// The column family, one `Vec` per component.
    type Columns: Default;

    /// One row, borrowed.
    type Ref<'a>
    where
        Self: 'a;

    /// One row, borrowed mutably.
    type Mut<'a>
    where
        Self: 'a;

    /// Appends a row to every column.
    fn push(columns: &mut Self::Columns, row: Self);

    /// Swap-and-pops `row` from every column and returns it.
    ///
    /// # Panics
    /// Panics if `row` is out of bounds.
    fn swap_remove(columns: &mut Self::Columns, row: usize) -> Self;

    /// Borrows the row at `row`.
    ///
    /// # Panics
    /// Panics if `row` is out of bounds.
    fn get(columns: &Self::Columns, row: usize) -> Self::Ref<'_>;

    /// Mutably borrows the row at `row`.
    ///
    /// # Panics
    /// Panics if `row` is out of bounds.
    fn get_mut(columns: &mut Self::Columns, row: usize) -> Self::Mut<'_>;

    /// Returns the shared column length.
    fn len(columns: &Self::Columns) -> usize;

    /// Returns true if the columns hold no rows.
    fn is_empty(columns: &Self::Columns) -> bool {
        Self::len(columns) == 0
    }

    /// Empties every column.
    fn clear(columns: &mut Self::Columns);

    /// Reserves room in every column.
    fn reserve(columns: &mut Self::Columns, additional: usize);

    /// Sheds unused memory in every column.
    fn shrink_to_fit(columns: &mut Self::Columns);

    /// Returns the first column whose element type is `T`.
    fn column<T: 'static>(columns: &Self::Columns) -> Option<&Vec<T>>;

    /// Mutable variant of [`column`](Row::column).
    fn column_mut<T: 'static>(columns: &mut Self::Columns) -> Option<&mut Vec<T>>;
}

macro_rules! impl_row_for_tuple {
    ($(($type:ident, $index:tt)),+) => {
        impl<$($type: 'static),+> Row for ($($type,)+) {
            type Columns = ($(Vec<$type>,)+);
            type Ref<'a>
                = ($(&'a $type,)+)
            where
                Self: 'a;
            type Mut<'a>
                = ($(&'a mut $type,)+)
            where
                Self: 'a;

            fn push(columns: &mut Self::Columns, row: Self) {
                $(columns.$index.push(row.$index);)+
            }

            fn swap_remove(columns: &mut Self::Columns, row: usize) -> Self {
                ($(columns.$index.swap_remove(row),)+)
            }

            fn get(columns: &Self::Columns, row: usize) -> Self::Ref<'_> {
                ($(&columns.$index[row],)+)
            }

            fn get_mut(columns: &mut Self::Columns, row: usize) -> Self::Mut<'_> {
                ($(&mut columns.$index[row],)+)
            }

            fn len(columns: &Self::Columns) -> usize {
                let lengths = [$(columns.$index.len()),+];
                debug_assert!(
                    lengths.windows(2).all(|pair| pair[0] == pair[1]),
                    "column lengths diverged: {lengths:?}"
                );
                lengths[0]
            }

            fn clear(columns: &mut Self::Columns) {
                $(columns.$index.clear();)+
            }

            fn reserve(columns: &mut Self::Columns, additional: usize) {
                $(columns.$index.reserve(additional);)+
            }

            fn shrink_to_fit(columns: &mut Self::Columns) {
                $(columns.$index.shrink_to_fit();)+
            }

            fn column<T: 'static>(columns: &Self::Columns) -> Option<&Vec<T>> {
                $(
                    if let Some(column) =
                        (&columns.$index as &dyn Any).downcast_ref::<Vec<T>>()
                    {
                        return Some(column);
                    }
                )+
                None
            }

            fn column_mut<T: 'static>(columns: &mut Self::Columns) -> Option<&mut Vec<T>> {
                $(
                    if let Some(column) =
                        (&mut columns.$index as &mut dyn Any).downcast_mut::<Vec<T>>()
                    {
                        return Some(column);
                    }
                )+
                None
            }
        }
    };
}

impl_row_for_tuple!((A, 0));
impl_row_for_tuple!((A, 0), (B, 1));
impl_row_for_tuple!((A, 0), (B, 1), (C, 2));
impl_row_for_tuple!((A, 0), (B, 1), (C, 2), (D, 3));
impl_row_for_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4));
impl_row_for_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5));
impl_row_for_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6));
impl_row_for_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7));
