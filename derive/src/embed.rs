use crate::common::{Result, resolve_path};
use proc_macro2::{Ident, Span, TokenStream};
use quote::{ToTokens, TokenStreamExt, format_ident, quote};
use std::collections::HashMap;
use std::fs::{metadata, read_dir, read_to_string};
use std::path::Path;
use syn::parse::Parse;
use syn::token::Super;
use syn::{Item, LitStr, Token, VisRestricted, Visibility};

pub(crate) struct EmbedInput {
    pub_token: Option<Token![pub]>,
    ident: Ident,
    _comma: Token![,],
    path: LitStr,
}

impl Parse for EmbedInput {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let pub_token = if input.peek(Token![pub]) {
            Some(input.parse()?)
        } else {
            None
        };

        Ok(Self {
            pub_token,
            ident: input.parse()?,
            _comma: input.parse()?,
            path: input.parse()?,
        })
    }
}

struct QuotedMigration {
    file_name: String,
    mod_name: Ident,
    has_description: bool,
}

impl ToTokens for QuotedMigration {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let QuotedMigration {
            file_name,
            mod_name,
            has_description,
        } = &self;

        let description_ref = if *has_description {
            quote! { Some(&#mod_name::description) }
        } else {
            quote! { None }
        };

        let ts = quote! {
            ::creed_migrate::migrate::EmbeddedMigration {
                file_name: #file_name,
                up: &#mod_name::up,
                down: &#mod_name::down,
                description: #description_ref,
            }
        };

        tokens.append_all(ts);
    }
}

/// `001-add-users` -> `migration_001_add_users`
fn module_name(stem: &str) -> String {
    let sanitized = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>();

    format!("migration_{}", sanitized)
}

pub(crate) fn expand_from_lit_dir(input: EmbedInput) -> Result<TokenStream> {
    let path = resolve_path(input.path.value(), input.path.span())?;
    expand_embedded_source(&path, &input.ident, &input.pub_token)
}

pub(crate) fn expand_embedded_source(
    path: &Path,
    source_name: &Ident,
    pub_token: &Option<Token![pub]>,
) -> Result<TokenStream> {
    let mut files = Vec::new();
    for entry in read_dir(path)? {
        let entry = entry?;
        if !metadata(entry.path())?.is_file() {
            // not a file; ignore
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.ends_with(".rs") {
            continue;
        }

        files.push((file_name, entry.path()));
    }

    // read_dir order is platform dependent
    files.sort();

    let mut migrations = Vec::new();
    let mut migrations_mods = Vec::new();
    let mut seen_mods: HashMap<String, String> = HashMap::new();

    for (file_name, file_path) in files {
        let stem = &file_name[..file_name.len() - 3];
        let mod_name = module_name(stem);
        if let Some(other) = seen_mods.insert(mod_name.clone(), file_name.clone()) {
            return Err(format!(
                "migrations {} and {} map to the same module name {}",
                other, file_name, mod_name
            )
            .into());
        }

        let migration_file = read_to_string(&file_path)?;
        let mut program = syn::parse_file(&migration_file)?;

        let mut has_up = false;
        let mut has_down = false;
        let mut has_description = false;
        for item in program.items.iter_mut() {
            if let Item::Fn(func) = item {
                func.vis = Visibility::Restricted(VisRestricted {
                    pub_token: Default::default(),
                    paren_token: Default::default(),
                    in_token: None,
                    path: Box::new(syn::Path::from(syn::parse_str::<Super>("super")?)),
                });

                match func.sig.ident.to_string().as_str() {
                    "up" => has_up = true,
                    "down" => has_down = true,
                    "description" => has_description = true,
                    _ => (),
                }
            }
        }

        if !has_up || !has_down {
            return Err(syn::Error::new(
                Span::call_site(),
                format!("migration {} must define both `up` and `down`", file_name),
            )
            .into());
        }

        let mod_ident = format_ident!("{}", mod_name);
        let absolute_path = file_path.to_string_lossy().into_owned();
        migrations_mods.push(quote! {
            #[allow(dead_code)]
            mod #mod_ident {
                // rebuild when the file changes
                const _: &str = include_str!(#absolute_path);

                #program
            }
        });

        migrations.push(QuotedMigration {
            file_name,
            mod_name: mod_ident,
            has_description,
        });
    }

    let token_stream: TokenStream = quote! {
        #pub_token const #source_name: ::creed_migrate::migrate::EmbeddedMigrationSource =
            ::creed_migrate::migrate::EmbeddedMigrationSource::new(
                ::std::borrow::Cow::Borrowed(&[
                    #(#migrations),*
                ]),
            );

        #(#migrations_mods)*
    };

    Ok(token_stream)
}
