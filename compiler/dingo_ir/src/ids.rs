//! Typed u32 indices into the [`crate::SyntaxArena`].

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Create from a raw index.
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Index into arena storage.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            /// Raw u32 value.
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_id! {
    /// Index of an expression.
    ExprId
}
define_id! {
    /// Index of a statement.
    StmtId
}
define_id! {
    /// Index of a top-level declaration.
    DeclId
}
define_id! {
    /// Index of a block.
    BlockId
}
define_id! {
    /// Index of a match pattern.
    PatternId
}
define_id! {
    /// Index of a syntactic type expression.
    TypeExprId
}
