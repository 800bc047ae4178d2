//! Compile-time dependency injection macros for ontograph.
//!
//! - `#[derive(Context)]` makes each field of a root context extractable
//! - `#[derive(FromContext)]` builds a struct by resolving every field from a context
//!
//! Generated code references `crate::FromRef`, so the consuming crate must
//! define or re-export that trait at its root.

use proc_macro::TokenStream;

mod context;
mod fields;
mod from_context;

/// Derive macro for the root DI context.
///
/// Generates a `FromRef` implementation for each field type. Fields marked
/// `#[context(skip)]` are left out, which is useful for plain data (timestamps,
/// counters) that no component should resolve by type.
///
/// # Example
///
/// ```ignore
/// #[derive(Context, Clone)]
/// pub struct Context {
///     pub graph: Graph,
///     pub config: Arc<Config>,
///     pub auth: Arc<AuthGate>,
///     #[context(skip)]
///     pub started_at: Instant,
/// }
///
/// // impl FromRef<Context> for Graph { ... }
/// // impl FromRef<Context> for Arc<Config> { ... }
/// // impl FromRef<Context> for Arc<AuthGate> { ... }
/// ```
#[proc_macro_derive(Context, attributes(context))]
pub fn derive_context(input: TokenStream) -> TokenStream {
    context::derive_context_impl(input)
}

/// Derive macro for types that can be constructed from a context.
///
/// Each field is resolved with `FromRef::from_ref(ctx)`. The context type
/// defaults to `Context` and can be overridden with
/// `#[from_context(Context = "MyContext")]`.
///
/// # Example
///
/// ```ignore
/// #[derive(FromContext, Clone)]
/// pub struct OntologyManager {
///     products: ProductRepository,         // ProductRepository::from_ref(ctx)
///     functionalities: FunctionalityRepository,
/// }
/// ```
#[proc_macro_derive(FromContext, attributes(from_context))]
pub fn derive_from_context(input: TokenStream) -> TokenStream {
    from_context::derive_from_context_impl(input)
}
