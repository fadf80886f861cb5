//! Feature-gating helpers.

/// Applies `#[cfg($meta)]` to every item, and marks the item in docs.rs
/// output with the feature it requires.
macro_rules! cfg_feature {
    (
        #![$meta:meta]
        $($item:item)*
    ) => {
        $(
            #[cfg($meta)]
            #[cfg_attr(docsrs, doc(cfg($meta)))]
            $item
        )*
    }
}

/// Items that need the tokio blocking pool.
macro_rules! cfg_runtime {
    ($($item:item)*) => {
        cfg_feature! {
            #![feature = "runtime"]
            $($item)*
        }
    }
}
