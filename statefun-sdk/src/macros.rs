/// Erases a variadic list of typed [ValueSpec](crate::ValueSpec)s into the
/// `Vec<ValueSpecBase>` that
/// [StatefulFunctionSpec](crate::StatefulFunctionSpec) expects, without
/// having to cast them one by one. The specs are taken by reference, so they
/// stay available for use inside the function being registered.
#[macro_export]
macro_rules! specs {
    ( $( $x:expr ),* $(,)? ) => {
        {
            let mut temp_vec: Vec<$crate::ValueSpecBase> = Vec::new();
            $(
                temp_vec.push((&$x).into());
            )*
            temp_vec
        }
    };
}
