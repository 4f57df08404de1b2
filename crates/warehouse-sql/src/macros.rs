//! Macros for declaring table columns.

/// Defines a module with typed column constants for a database table.
///
/// ```ignore
/// define_columns!(
///     users {
///         table: "users",
///         columns: {
///             ID: i64 => "id",
///             NAME: String => "name",
///             CONFIRMED_AT: Option<String> => "confirmed_at"
///         }
///     }
/// );
/// ```
///
/// expands to
///
/// ```ignore
/// pub mod users {
///     pub const TABLE: &str = "users";
///     pub const ID: warehouse_sql::expr::Col<i64> = Col::new("id");
///     pub const NAME: warehouse_sql::expr::Col<String> = Col::new("name");
///     pub const CONFIRMED_AT: warehouse_sql::expr::Col<Option<String>> = Col::new("confirmed_at");
/// }
/// ```
#[macro_export]
macro_rules! define_columns {
    (
        $entity:ident {
            table: $table:literal,
            columns: {
                $($col_name:ident: $col_type:ty => $db_col:literal),* $(,)?
            }
        }
    ) => {
        pub mod $entity {
            #[allow(unused_imports)]
            use $crate::expr::column::Col;

            pub const TABLE: &str = $table;

            $(
                pub const $col_name: Col<$col_type> = Col::new($db_col);
            )*
        }
    };
}
