extern crate proc_macro;

mod common;
mod embed;

use proc_macro::TokenStream;
use quote::quote;
use syn::parse_macro_input;

/// Embeds every `.rs` migration found in a directory (relative to the crate
/// manifest) and declares a `const` `EmbeddedMigrationSource` serving them.
///
/// ```ignore
/// creed_migrate::embed_migrations!(pub MIGRATIONS, "migrations");
/// ```
///
/// Each file must define `fn up() -> creed_migrate::Result<()>` and
/// `fn down() -> creed_migrate::Result<()>`, and may define
/// `fn description() -> &'static str`.
#[proc_macro]
pub fn embed_migrations(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as embed::EmbedInput);
    match embed::expand_from_lit_dir(input) {
        Ok(ts) => ts.into(),
        Err(e) => {
            if let Some(parse_err) = e.downcast_ref::<syn::Error>() {
                parse_err.to_compile_error().into()
            } else {
                let msg = e.to_string();
                quote!(::std::compile_error!(#msg)).into()
            }
        }
    }
}
