//! Dependency injection infrastructure.
//!
//! Compile-time dependency injection using the `FromRef` trait and the derive
//! macros from `di-macros`.
//!
//! - `FromRef<T>`: extract a value from a reference to `T`
//! - `#[derive(Context)]`: makes each field of the root context extractable
//! - `#[derive(FromContext)]`: builds a struct by resolving each field
//!
//! # Example
//!
//! ```ignore
//! #[derive(Context, Clone)]
//! pub struct Context {
//!     pub graph: Graph,
//!     pub config: Arc<Config>,
//! }
//!
//! #[derive(FromContext, Clone)]
//! pub struct ProductRepository {
//!     graph: Graph, // resolved via FromRef<Context>
//! }
//!
//! let repo = ProductRepository::from_ref(&ctx);
//! ```

/// Extracts a value from a reference to another type.
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

/// Any Clone type can be extracted from itself.
impl<T: Clone> FromRef<T> for T {
    fn from_ref(input: &T) -> Self {
        input.clone()
    }
}

pub use di_macros::{Context, FromContext};

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Pool(u32);

    #[derive(Context, Clone)]
    #[allow(dead_code)]
    struct Context {
        pool: Pool,
        #[context(skip)]
        label: &'static str,
    }

    #[derive(FromContext, Clone)]
    struct Repository {
        pool: Pool,
    }

    #[test]
    fn test_from_context_resolves_fields() {
        let ctx = Context {
            pool: Pool(7),
            label: "test",
        };

        let repo = Repository::from_ref(&ctx);
        assert_eq!(repo.pool, Pool(7));
    }

    #[test]
    fn test_blanket_from_ref_clones() {
        let pool = Pool(3);
        assert_eq!(Pool::from_ref(&pool), Pool(3));
    }
}
